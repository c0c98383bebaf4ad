//! Instantiation: hydrating task and affordance records with tensors and
//! meshes.
//!
//! Every entry point is idempotent. Payloads are built completely before
//! they are attached, so a failed hydration leaves the record un-hydrated.

use std::collections::{BTreeMap, HashSet};

use crate::dataset::Dataset;
use crate::mesh::{MeshCache, MeshSource};
use crate::model::affordance::{Affordance, AffordanceMesh};
use crate::model::frame_range::{FrameRange, Hand};
use crate::model::hydration::Hydration;
use crate::model::task::{ComplexTask, ComplexTaskData, PrimitiveTask, PrimitiveTaskData};
use crate::storage::{self, AnnotationBlob};
use crate::tensor::{self, FrameIndex, ParamMap, TransformMap};
use crate::{zlog_debug, zlog_error, zlog_warn, Error, Result};

impl Dataset {
    /// Load the sequence's annotation blob and stack its per-frame
    /// parameters in ascending frame-id order.
    pub fn instantiate_complex_task(&self, task: &mut ComplexTask) -> Result<()> {
        if task.is_instantiated() {
            return Ok(());
        }
        let path = self.layout.anno_path(&task.seq_token);
        let blob: AnnotationBlob = storage::load_cbor(&path)?;

        let frame_ids = blob.sorted_frame_ids();
        let (first, last) = match (frame_ids.first(), frame_ids.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                zlog_error!("Annotation of {} lists no frames", task.seq_key);
                return Err(Error::EmptySequence(task.seq_key.clone()));
            }
        };
        let seq_key = task.seq_key.as_str();
        let data = ComplexTaskData {
            smplx_param: blob.collect_body(seq_key, &frame_ids)?,
            lh_param: blob.collect_hand(seq_key, Hand::Left, &frame_ids)?,
            rh_param: blob.collect_hand(seq_key, Hand::Right, &frame_ids)?,
            obj_transf: blob.collect_obj_transf(seq_key, &frame_ids)?,
            frames: FrameIndex::new(frame_ids),
        };
        zlog_debug!(
            "Hydrated complex task {}: frames [{}, {}], {} objects",
            task.seq_key,
            first,
            last,
            data.obj_transf.len()
        );

        task.frame_range = Some((first, last));
        task.scene_obj_list = Some(blob.obj_list);
        task.state = Hydration::Hydrated(data);
        Ok(())
    }

    /// Slice the owning sequence's tensors down to `task`.
    ///
    /// `parent` is hydrated in place when given and not yet hydrated; when
    /// absent, or when it belongs to another sequence, a hydrated copy is
    /// loaded.
    pub fn instantiate_primitive_task(
        &self,
        task: &mut PrimitiveTask,
        parent: Option<&mut ComplexTask>,
    ) -> Result<()> {
        if task.is_instantiated() {
            return Ok(());
        }
        let parent = match parent {
            Some(p) if p.seq_key != task.seq_key => {
                zlog_warn!(
                    "Parent {} does not own task {} {}, loading its own sequence",
                    p.seq_key,
                    task.seq_key,
                    task.frame_range_def
                );
                None
            }
            other => other,
        };
        let loaded;
        let parent: &ComplexTask = match parent {
            Some(p) => {
                self.instantiate_complex_task(p)?;
                p
            }
            None => {
                loaded = self.load_complex_task(&task.seq_key, true)?;
                &loaded
            }
        };
        slice_primitive_task(task, parent)
    }

    /// Attach meshes to `affordance`, reusing this index's mesh cache.
    pub fn instantiate_affordance(&mut self, affordance: &mut Affordance) -> Result<()> {
        hydrate_affordance(affordance, &self.mesh_source, &mut self.mesh_cache)
    }
}

/// Rows of `frames` covering every frame of `range`.
fn rows_for(frames: &FrameIndex, seq_key: &str, range: FrameRange) -> Result<Vec<usize>> {
    range
        .frames()
        .map(|frame| {
            frames.row(frame).ok_or_else(|| Error::FrameNotRecorded {
                seq_key: seq_key.to_string(),
                frame,
            })
        })
        .collect()
}

/// One hand's tensors over `whole`: the hand's own window (clipped to
/// `whole`) padded with zero frames on both sides, or all zeros when the
/// hand has no window.
fn hand_window(
    params: &ParamMap,
    frames: &FrameIndex,
    seq_key: &str,
    whole: FrameRange,
    sub: Option<FrameRange>,
) -> Result<(ParamMap, ndarray::Array1<bool>)> {
    let Some(sub) = sub else {
        return Ok(tensor::zero_param(params, whole.len()));
    };
    let clipped = whole.clip(&sub);
    let l_pad = clipped.start.abs_diff(whole.start) as usize;
    let r_pad = whole.end.max(whole.start).abs_diff(clipped.end) as usize;
    let rows = rows_for(frames, seq_key, clipped)?;
    Ok(tensor::index_param(params, &rows, l_pad, r_pad))
}

/// Hydrate `task` from an already hydrated `parent`.
///
/// Object transforms are kept for objects present both in the task's
/// object list and in the parent; the task's object lists are pruned to
/// those objects.
pub fn slice_primitive_task(task: &mut PrimitiveTask, parent: &ComplexTask) -> Result<()> {
    if task.is_instantiated() {
        return Ok(());
    }
    let data = parent.data().ok_or_else(|| Error::MissingEntry {
        kind: "hydrated sequence",
        key: parent.seq_key.clone(),
    })?;
    let seq_key = task.seq_key.as_str();
    let whole = task.frame_range();
    let rows = rows_for(&data.frames, seq_key, whole)?;

    let (smplx_param, _) = tensor::index_param(&data.smplx_param, &rows, 0, 0);
    let (lh_param, lh_in_range_mask) =
        hand_window(&data.lh_param, &data.frames, seq_key, whole, task.frame_range_lh())?;
    let (rh_param, rh_in_range_mask) =
        hand_window(&data.rh_param, &data.frames, seq_key, whole, task.frame_range_rh())?;

    let obj_transf: TransformMap = task
        .task_obj_list
        .iter()
        .filter_map(|obj| {
            data.obj_transf
                .get(obj)
                .map(|t| (obj.clone(), tensor::select_transforms(t, &rows)))
        })
        .collect();

    let available: HashSet<&str> = obj_transf.keys().map(String::as_str).collect();
    let prune = |list: &[String]| -> Vec<String> {
        list.iter()
            .filter(|o| available.contains(o.as_str()))
            .cloned()
            .collect()
    };
    let task_obj_list = prune(&task.task_obj_list);
    let lh_obj_list = task.lh_obj_list.as_deref().map(&prune);
    let rh_obj_list = task.rh_obj_list.as_deref().map(&prune);

    zlog_debug!(
        "Hydrated primitive task {} {}: {} frames, {} objects",
        task.seq_key,
        task.frame_range_def,
        whole.len(),
        obj_transf.len()
    );

    task.task_obj_list = task_obj_list;
    task.lh_obj_list = lh_obj_list;
    task.rh_obj_list = rh_obj_list;
    task.scene_obj_list = parent.scene_obj_list.clone();
    task.state = Hydration::Hydrated(PrimitiveTaskData {
        smplx_param,
        lh_param,
        rh_param,
        lh_in_range_mask,
        rh_in_range_mask,
        obj_transf,
    });
    Ok(())
}

/// Attach meshes to `affordance`: its own model when it has one, otherwise
/// one mesh per constituent part. Meshes come from `cache` when present.
pub fn hydrate_affordance(
    affordance: &mut Affordance,
    source: &MeshSource,
    cache: &mut MeshCache,
) -> Result<()> {
    let obj_id = affordance.obj_id.clone();
    let has_model = affordance.has_model;
    let parts = affordance.obj_part_id.clone();
    let hydrated = affordance.state.hydrate_with(|| {
        if has_model {
            let mesh = cache.get_or_load(&obj_id, || source.load(&obj_id))?;
            return Ok::<_, Error>(AffordanceMesh::Single(mesh));
        }
        let mut meshes = BTreeMap::new();
        for part_id in &parts {
            let mesh = cache.get_or_load(part_id, || source.load(part_id))?;
            meshes.insert(part_id.clone(), mesh);
        }
        Ok(AffordanceMesh::Parts(meshes))
    })?;
    if hydrated {
        zlog_debug!("Hydrated affordance {} (cache size {})", obj_id, cache.len());
    }
    Ok(())
}
