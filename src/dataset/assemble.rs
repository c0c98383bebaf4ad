//! Building un-hydrated complex and primitive task records from program
//! metadata.

use serde::Deserialize;

use crate::config::seq_token;
use crate::dataset::Dataset;
use crate::model::frame_range::FrameRangeDef;
use crate::model::hydration::Hydration;
use crate::model::pdg::{ProgramDependencyGraph, RawPdg};
use crate::model::task::{ComplexTask, PrimitiveTask};
use crate::program::info::{self, DescInfo, ProgramInfo};
use crate::program::namemap::TaskNames;
use crate::storage::{self, FrameIdCache};
use crate::{zlog, zlog_debug, zlog_trace, Error, Result};

/// Which primitive tasks of a sequence to load.
#[derive(Debug, Clone, Copy)]
pub enum TaskSelector<'a> {
    /// Every task, in execution path order.
    All,
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Debug, Default, Deserialize)]
struct InitialCondition {
    #[serde(default)]
    initial_condition: Option<String>,
    #[serde(default)]
    recipe: Option<serde_json::Value>,
}

/// Program-level files of one sequence, read once and shared by every task
/// assembled from them.
struct SequenceMeta {
    seq_key: String,
    seq_token: String,
    program_info: ProgramInfo,
    desc_info: DescInfo,
    names: TaskNames,
    scene_obj_list: Option<Vec<String>>,
}

impl Dataset {
    fn load_sequence_meta(&self, seq_key: &str, instantiated: bool) -> Result<SequenceMeta> {
        let token = seq_token(seq_key);
        let program_info = info::load_program_info(&self.layout.program_info_path(&token))?;
        let desc_info = info::load_desc_info(&self.layout.desc_info_path(&token))?;
        let names = TaskNames::build(&program_info, self.classifier.as_ref())?;
        // Hydration replaces this with the parent's list.
        let scene_obj_list = if instantiated {
            None
        } else {
            storage::try_load_json(&self.layout.obj_list_cache_path(&token))?
        };
        Ok(SequenceMeta {
            seq_key: seq_key.to_string(),
            seq_token: token,
            program_info,
            desc_info,
            names,
            scene_obj_list,
        })
    }

    /// Assemble the record for one sequence.
    ///
    /// With `instantiated` the record is hydrated before it is returned and
    /// the side caches are not consulted; otherwise the optional frame-id
    /// and object-list caches fill `frame_range` and `scene_obj_list`.
    pub fn load_complex_task(&self, seq_key: &str, instantiated: bool) -> Result<ComplexTask> {
        zlog!("load_complex_task seq={} instantiated={}", seq_key, instantiated);
        let task_target = self
            .task_target
            .get(seq_key)
            .ok_or_else(|| Error::SequenceNotFound(seq_key.to_string()))?
            .clone();
        let token = seq_token(seq_key);

        let program_info = info::load_program_info(&self.layout.program_info_path(&token))?;
        let names = TaskNames::build(&program_info, self.classifier.as_ref())?;

        let raw_pdg: RawPdg = storage::load_json(&self.layout.pdg_path(&token))?;
        let pdg = ProgramDependencyGraph::build(&raw_pdg, &names.affordance)?;

        let initial: Option<InitialCondition> =
            storage::try_load_json(&self.layout.initial_condition_path(&token))?;
        let (scene_desc, recipe) = match initial {
            Some(i) => (i.initial_condition, i.recipe),
            None => (None, None),
        };

        let (frame_range, scene_obj_list) = if instantiated {
            (None, None)
        } else {
            let frame_cache: Option<FrameIdCache> =
                storage::try_load_cbor(&self.layout.frame_id_cache_path(&token))?;
            let frame_range = frame_cache.and_then(|c| {
                let min = c.mocap_frame_id_list.iter().min()?;
                let max = c.mocap_frame_id_list.iter().max()?;
                Some((*min, *max))
            });
            let obj_list: Option<Vec<String>> =
                storage::try_load_json(&self.layout.obj_list_cache_path(&token))?;
            (frame_range, obj_list)
        };

        let mut task = ComplexTask {
            seq_key: seq_key.to_string(),
            seq_token: token,
            is_complex: !names.affordance.is_empty(),
            exec_path: names.full.names().map(str::to_string).collect(),
            exec_path_affordance: names.affordance.names().map(str::to_string).collect(),
            exec_range_map: names.full.reverse(),
            pdg,
            task_target,
            scene_desc,
            recipe,
            frame_range,
            scene_obj_list,
            state: Hydration::Unhydrated,
        };
        zlog_debug!(
            "Assembled {}: {} tasks, {} affordance tasks, pdg={:?}",
            seq_key,
            task.exec_path.len(),
            task.exec_path_affordance.len(),
            task.pdg
        );

        if instantiated {
            self.instantiate_complex_task(&mut task)?;
        }
        Ok(task)
    }

    /// Load the primitive tasks of `complex` picked by `selector`.
    ///
    /// Program and description metadata are read once for the whole batch.
    /// With `instantiated`, `complex` is hydrated in place first and every
    /// returned task is hydrated from it.
    pub fn load_primitive_tasks(
        &self,
        complex: &mut ComplexTask,
        selector: TaskSelector<'_>,
        instantiated: bool,
    ) -> Result<Vec<PrimitiveTask>> {
        if instantiated {
            self.instantiate_complex_task(complex)?;
        }
        let handles: Vec<String> = match selector {
            TaskSelector::All => complex.exec_path.clone(),
            TaskSelector::One(id) => vec![id.to_string()],
            TaskSelector::Many(ids) => ids.to_vec(),
        };

        let meta = self.load_sequence_meta(&complex.seq_key, instantiated)?;
        let mut out = Vec::with_capacity(handles.len());
        for id in handles {
            let def = meta
                .names
                .full
                .def_of(&id)
                .ok_or_else(|| Error::TaskNotFound {
                    seq_key: meta.seq_key.clone(),
                    task: id.clone(),
                })?;
            let mut task = self.assemble_primitive(&meta, def)?;
            if instantiated {
                self.instantiate_primitive_task(&mut task, Some(&mut *complex))?;
            }
            out.push(task);
        }
        Ok(out)
    }

    /// Load a single primitive task of `complex` by identifier.
    pub fn load_primitive_task(
        &self,
        complex: &mut ComplexTask,
        identifier: &str,
        instantiated: bool,
    ) -> Result<PrimitiveTask> {
        let mut tasks =
            self.load_primitive_tasks(complex, TaskSelector::One(identifier), instantiated)?;
        tasks.pop().ok_or_else(|| Error::TaskNotFound {
            seq_key: complex.seq_key.clone(),
            task: identifier.to_string(),
        })
    }

    /// Load a primitive task straight from its frame range definition,
    /// without going through a complex task record.
    pub fn load_primitive_task_from_def(
        &self,
        seq_key: &str,
        def: &FrameRangeDef,
        instantiated: bool,
    ) -> Result<PrimitiveTask> {
        let meta = self.load_sequence_meta(seq_key, instantiated)?;
        let mut task = self.assemble_primitive(&meta, def)?;
        if instantiated {
            self.instantiate_primitive_task(&mut task, None)?;
        }
        Ok(task)
    }

    fn assemble_primitive(&self, meta: &SequenceMeta, def: &FrameRangeDef) -> Result<PrimitiveTask> {
        let item = meta.program_info.get(def).ok_or_else(|| Error::MissingEntry {
            kind: "program",
            key: format!("{def} in {}", meta.seq_key),
        })?;
        let desc = meta.desc_info.get(def).ok_or_else(|| Error::MissingEntry {
            kind: "description",
            key: format!("{def} in {}", meta.seq_key),
        })?;
        zlog_trace!("assemble_primitive seq={} def={} primitive={}", meta.seq_key, def, item.primitive);

        Ok(PrimitiveTask {
            seq_key: meta.seq_key.clone(),
            seq_token: meta.seq_token.clone(),
            frame_range_def: *def,
            primitive_task: item.primitive.clone(),
            task_desc: desc.seg_desc.clone(),
            transient: self.classifier.is_transient(&item.primitive),
            hand_involved: def.hand_involved(),
            interaction_mode: item.interaction_mode.clone(),
            scene_obj_list: meta.scene_obj_list.clone(),
            task_obj_list: item.obj_list.clone(),
            lh_obj_list: item.obj_list_lh.clone(),
            rh_obj_list: item.obj_list_rh.clone(),
            state: Hydration::Unhydrated,
        })
    }
}
