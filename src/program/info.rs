//! Program and description metadata for one sequence.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;
use crate::model::frame_range::FrameRangeDef;
use crate::storage::{self, OrderedMap};

/// Annotation attached to one primitive segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramItem {
    pub primitive: String,
    #[serde(default)]
    pub interaction_mode: Option<String>,
    #[serde(default)]
    pub obj_list: Vec<String>,
    #[serde(default)]
    pub obj_list_lh: Option<Vec<String>>,
    #[serde(default)]
    pub obj_list_rh: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescItem {
    pub seg_desc: String,
}

pub type ProgramInfo = OrderedMap<FrameRangeDef, ProgramItem>;
pub type DescInfo = OrderedMap<FrameRangeDef, DescItem>;

pub fn load_program_info(path: &Path) -> Result<ProgramInfo> {
    storage::load_json(path)
}

pub fn load_desc_info(path: &Path) -> Result<DescInfo> {
    storage::load_json(path)
}
