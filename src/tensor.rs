//! Frame-stacked parameter tensors.
//!
//! Every tensor has frames on axis 0. Parameters are stored flattened per
//! frame (`frames × width`), object transforms as `frames × 4 × 4`.

use ndarray::{s, Array1, Array2, Array3, Axis};
use std::collections::{BTreeMap, HashMap};

use crate::{Error, Result};

pub type ParamMap = BTreeMap<String, Array2<f32>>;
pub type TransformMap = BTreeMap<String, Array3<f32>>;
pub type Transform = [[f32; 4]; 4];

/// Stack per-frame rows into a `frames × width` tensor.
pub fn stack_rows(name: &str, rows: &[&[f32]]) -> Result<Array2<f32>> {
    let width = rows.first().map_or(0, |r| r.len());
    let mismatch = |actual: usize| Error::ShapeMismatch {
        name: name.to_string(),
        expected: width,
        actual,
    };
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
        return Err(mismatch(bad.len()));
    }
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), width), flat).map_err(|_| mismatch(width))
}

pub fn stack_transforms(frames: &[&Transform]) -> Array3<f32> {
    Array3::from_shape_fn((frames.len(), 4, 4), |(i, r, c)| frames[i][r][c])
}

/// Row lookup for the recorded frames of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameIndex {
    frame_ids: Vec<i64>,
    rows: HashMap<i64, usize>,
}

impl FrameIndex {
    /// `frame_ids` must already be in stacking order.
    pub fn new(frame_ids: Vec<i64>) -> Self {
        let rows = frame_ids.iter().enumerate().map(|(i, &f)| (f, i)).collect();
        Self { frame_ids, rows }
    }

    pub fn frame_ids(&self) -> &[i64] {
        &self.frame_ids
    }

    pub fn len(&self) -> usize {
        self.frame_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_ids.is_empty()
    }

    pub fn row(&self, frame: i64) -> Option<usize> {
        self.rows.get(&frame).copied()
    }
}

/// Select `rows` from every tensor and surround them with `l_pad` leading
/// and `r_pad` trailing zero frames. The mask is true on selected frames.
pub fn index_param(
    params: &ParamMap,
    rows: &[usize],
    l_pad: usize,
    r_pad: usize,
) -> (ParamMap, Array1<bool>) {
    let total = l_pad + rows.len() + r_pad;
    let selected_end = l_pad + rows.len();
    let out = params
        .iter()
        .map(|(name, tensor)| {
            let mut padded = Array2::zeros((total, tensor.ncols()));
            padded
                .slice_mut(s![l_pad..selected_end, ..])
                .assign(&select_rows(tensor, rows));
            (name.clone(), padded)
        })
        .collect();
    let mask = Array1::from_shape_fn(total, |i| i >= l_pad && i < selected_end);
    (out, mask)
}

/// All-zero tensors with the widths of `params` and an all-false mask.
pub fn zero_param(params: &ParamMap, frames: usize) -> (ParamMap, Array1<bool>) {
    let out = params
        .iter()
        .map(|(name, tensor)| (name.clone(), Array2::zeros((frames, tensor.ncols()))))
        .collect();
    (out, Array1::from_elem(frames, false))
}

/// Gather `rows` of a 2-D tensor. Row indices must be in bounds.
pub fn select_rows(tensor: &Array2<f32>, rows: &[usize]) -> Array2<f32> {
    if rows.is_empty() {
        return Array2::zeros((0, tensor.ncols()));
    }
    tensor.select(Axis(0), rows)
}

/// Gather `rows` of a frame-stacked transform tensor.
pub fn select_transforms(transform: &Array3<f32>, rows: &[usize]) -> Array3<f32> {
    if rows.is_empty() {
        let (_, h, w) = transform.dim();
        return Array3::zeros((0, h, w));
    }
    transform.select(Axis(0), rows)
}
