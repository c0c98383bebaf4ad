//! Per-sequence annotation blob and the frame-id side cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::frame_range::Hand;
use crate::tensor::{self, ParamMap, Transform, TransformMap};
use crate::{Error, Result};

type FrameParams = BTreeMap<i64, BTreeMap<String, Vec<f32>>>;

/// Raw mocap annotation of one sequence.
///
/// Hand parameters share one table; their names carry a `lh__` or `rh__`
/// prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBlob {
    pub mocap_frame_id_list: Vec<i64>,
    #[serde(default)]
    pub obj_list: Vec<String>,
    #[serde(default)]
    pub raw_smplx: FrameParams,
    #[serde(default)]
    pub raw_mano: FrameParams,
    #[serde(default)]
    pub obj_transf: BTreeMap<String, BTreeMap<i64, Transform>>,
}

/// Lightweight copy of a blob's frame list, stored next to the program files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIdCache {
    pub mocap_frame_id_list: Vec<i64>,
}

fn missing_frame(seq_key: &str, frame: i64) -> Error {
    Error::FrameNotRecorded {
        seq_key: seq_key.to_string(),
        frame,
    }
}

/// Stack every parameter accepted by `rename` across `frames`. Parameter
/// names are taken from the first frame.
fn collect_params<F>(seq_key: &str, source: &FrameParams, frames: &[i64], rename: F) -> Result<ParamMap>
where
    F: Fn(&str) -> Option<&str>,
{
    let Some(&first) = frames.first() else {
        return Ok(ParamMap::new());
    };
    let first_params = source.get(&first).ok_or_else(|| missing_frame(seq_key, first))?;

    let mut out = ParamMap::new();
    for raw_name in first_params.keys() {
        let Some(name) = rename(raw_name.as_str()) else {
            continue;
        };
        let rows = frames
            .iter()
            .map(|fid| {
                let params = source.get(fid).ok_or_else(|| missing_frame(seq_key, *fid))?;
                params
                    .get(raw_name)
                    .map(Vec::as_slice)
                    .ok_or_else(|| Error::MissingEntry {
                        kind: "parameter",
                        key: format!("{raw_name} at frame {fid} of {seq_key}"),
                    })
            })
            .collect::<Result<Vec<&[f32]>>>()?;
        out.insert(name.to_string(), tensor::stack_rows(raw_name, &rows)?);
    }
    Ok(out)
}

impl AnnotationBlob {
    /// Recorded frame ids in ascending order, without duplicates.
    pub fn sorted_frame_ids(&self) -> Vec<i64> {
        let mut frames = self.mocap_frame_id_list.clone();
        frames.sort_unstable();
        frames.dedup();
        frames
    }

    pub fn collect_body(&self, seq_key: &str, frames: &[i64]) -> Result<ParamMap> {
        collect_params(seq_key, &self.raw_smplx, frames, |name| Some(name))
    }

    /// Parameters of one hand with the hand prefix stripped.
    pub fn collect_hand(&self, seq_key: &str, hand: Hand, frames: &[i64]) -> Result<ParamMap> {
        let prefix = format!("{}__", hand.prefix());
        collect_params(seq_key, &self.raw_mano, frames, |name| {
            name.strip_prefix(prefix.as_str())
        })
    }

    pub fn collect_obj_transf(&self, seq_key: &str, frames: &[i64]) -> Result<TransformMap> {
        let mut out = TransformMap::new();
        for obj_id in &self.obj_list {
            let per_frame = self.obj_transf.get(obj_id).ok_or_else(|| Error::MissingEntry {
                kind: "object transform",
                key: format!("{obj_id} in {seq_key}"),
            })?;
            let stacked = frames
                .iter()
                .map(|fid| per_frame.get(fid).ok_or_else(|| missing_frame(seq_key, *fid)))
                .collect::<Result<Vec<&Transform>>>()?;
            out.insert(obj_id.clone(), tensor::stack_transforms(&stacked));
        }
        Ok(out)
    }
}
