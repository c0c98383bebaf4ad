//! Complex (whole sequence) and primitive (single segment) task records.

use ndarray::Array1;
use std::collections::HashMap;

use crate::model::frame_range::{FrameRange, FrameRangeDef, HandInvolved};
use crate::model::hydration::Hydration;
use crate::model::pdg::ProgramDependencyGraph;
use crate::tensor::{FrameIndex, ParamMap, TransformMap};

/// Full-sequence tensors, stacked in ascending frame-id order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTaskData {
    pub frames: FrameIndex,
    pub smplx_param: ParamMap,
    pub lh_param: ParamMap,
    pub rh_param: ParamMap,
    pub obj_transf: TransformMap,
}

/// One annotated sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTask {
    pub seq_key: String,
    pub seq_token: String,
    /// True when the sequence contains at least one affordance-typed task.
    pub is_complex: bool,
    /// Every task identifier in program order.
    pub exec_path: Vec<String>,
    /// Affordance-typed task identifiers only.
    pub exec_path_affordance: Vec<String>,
    pub exec_range_map: HashMap<String, FrameRangeDef>,
    pub pdg: ProgramDependencyGraph,
    pub task_target: String,
    pub scene_desc: Option<String>,
    pub recipe: Option<serde_json::Value>,
    /// Inclusive `(min, max)` of the recorded frame ids.
    pub frame_range: Option<(i64, i64)>,
    pub scene_obj_list: Option<Vec<String>>,
    pub state: Hydration<ComplexTaskData>,
}

impl ComplexTask {
    pub fn is_instantiated(&self) -> bool {
        self.state.is_hydrated()
    }

    pub fn data(&self) -> Option<&ComplexTaskData> {
        self.state.payload()
    }

    pub fn frame_range_def(&self, task: &str) -> Option<&FrameRangeDef> {
        self.exec_range_map.get(task)
    }
}

/// Tensors of one primitive task aligned to its whole-body range.
///
/// Hand tensors are zero outside the hand's own window; the masks mark the
/// frames that carry real hand data.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveTaskData {
    pub smplx_param: ParamMap,
    pub lh_param: ParamMap,
    pub rh_param: ParamMap,
    pub lh_in_range_mask: Array1<bool>,
    pub rh_in_range_mask: Array1<bool>,
    pub obj_transf: TransformMap,
}

/// One primitive segment of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveTask {
    pub seq_key: String,
    pub seq_token: String,
    pub frame_range_def: FrameRangeDef,
    pub primitive_task: String,
    pub task_desc: String,
    pub transient: bool,
    pub hand_involved: HandInvolved,
    pub interaction_mode: Option<String>,
    pub scene_obj_list: Option<Vec<String>>,
    pub task_obj_list: Vec<String>,
    pub lh_obj_list: Option<Vec<String>>,
    pub rh_obj_list: Option<Vec<String>>,
    pub state: Hydration<PrimitiveTaskData>,
}

impl PrimitiveTask {
    pub fn is_instantiated(&self) -> bool {
        self.state.is_hydrated()
    }

    pub fn data(&self) -> Option<&PrimitiveTaskData> {
        self.state.payload()
    }

    pub fn frame_range(&self) -> FrameRange {
        self.frame_range_def.whole
    }

    pub fn frame_range_lh(&self) -> Option<FrameRange> {
        self.frame_range_def.lh
    }

    pub fn frame_range_rh(&self) -> Option<FrameRange> {
        self.frame_range_def.rh
    }
}
