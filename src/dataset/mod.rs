//! The dataset index: sequence list, object/affordance metadata, and the
//! loaders that turn raw files into task and affordance records.

mod affordance;
mod assemble;
mod instantiate;

pub use assemble::TaskSelector;
pub use instantiate::{hydrate_affordance, slice_primitive_task};

use serde::Deserialize;
use std::collections::HashMap;

use crate::config::{DatasetConfig, DatasetLayout};
use crate::mesh::{MeshCache, MeshDecoder, MeshSource, ModelDecoder};
use crate::model::affordance::PartTree;
use crate::model::task::ComplexTask;
use crate::program::classify::{PrimitiveClassifier, TransientPrimitives};
use crate::storage::{self, OrderedMap};
use crate::{zlog, Error, Result};

#[derive(Debug, Clone, Deserialize)]
struct ObjDesc {
    obj_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ObjectAffordance {
    has_model: bool,
    #[serde(default)]
    affordance: Vec<String>,
    #[serde(default)]
    affordance_instantiation: Vec<String>,
}

/// Index over every sequence of the dataset.
///
/// One index is meant to be owned by one worker. It holds the process-local
/// mesh cache, so affordance hydration takes `&mut self`; task loading and
/// task hydration only read files and take `&self`.
pub struct Dataset {
    config: DatasetConfig,
    layout: DatasetLayout,
    classifier: Box<dyn PrimitiveClassifier>,
    task_target: OrderedMap<String, String>,
    obj_desc: HashMap<String, ObjDesc>,
    part_desc: HashMap<String, ObjDesc>,
    instance_id: Vec<String>,
    part_tree: PartTree,
    object_affordance: HashMap<String, ObjectAffordance>,
    mesh_source: MeshSource,
    mesh_cache: MeshCache,
}

impl Dataset {
    /// Read the dataset-wide metadata files under `config.dataset_prefix`.
    ///
    /// # Errors
    /// Fails if any of the task target, object description, part
    /// description, instance id, part tree or object affordance files is
    /// missing or malformed.
    pub fn open(config: DatasetConfig) -> Result<Self> {
        let layout = config.layout();
        zlog!("Dataset::open prefix={}", config.dataset_prefix.display());

        let task_target: OrderedMap<String, String> = storage::load_json(&layout.task_target_path())?;
        let obj_desc = storage::load_json(&layout.obj_desc_path())?;
        let part_desc = storage::load_json(&layout.part_desc_path())?;
        let instance_id = storage::load_json(&layout.instance_id_path())?;
        let part_tree = PartTree::new(storage::load_json(&layout.part_tree_path())?);
        let object_affordance = storage::load_json(&layout.object_affordance_path())?;

        let classifier = Box::new(TransientPrimitives::new(config.transient_primitives.clone()));
        let mesh_source = MeshSource::new(
            vec![layout.obj_model_dir.clone(), layout.affordance_part_dir.clone()],
            config.mesh_extensions.clone(),
            Box::new(ModelDecoder),
        );

        zlog!("Dataset opened: {} sequences", task_target.len());
        Ok(Self {
            config,
            layout,
            classifier,
            task_target,
            obj_desc,
            part_desc,
            instance_id,
            part_tree,
            object_affordance,
            mesh_source,
            mesh_cache: MeshCache::new(),
        })
    }

    /// Replace the transient/affordance primitive classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn PrimitiveClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the mesh decoder (the default reads Wavefront OBJ and PLY).
    pub fn with_mesh_decoder(mut self, decoder: Box<dyn MeshDecoder>) -> Self {
        self.mesh_source.set_decoder(decoder);
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.task_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_target.is_empty()
    }

    /// Sequence keys in task target file order.
    pub fn seq_keys(&self) -> impl Iterator<Item = &str> {
        self.task_target.keys().map(String::as_str)
    }

    pub fn instance_ids(&self) -> &[String] {
        &self.instance_id
    }

    pub fn part_tree(&self) -> &PartTree {
        &self.part_tree
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.mesh_cache
    }

    pub fn mesh_cache_mut(&mut self) -> &mut MeshCache {
        &mut self.mesh_cache
    }

    /// Load the `index`-th sequence, hydrated according to
    /// `config.return_instantiated`.
    pub fn get(&self, index: usize) -> Result<ComplexTask> {
        let (seq_key, _) = self
            .task_target
            .get_index(index)
            .ok_or_else(|| Error::SequenceNotFound(format!("#{index}")))?;
        self.load_complex_task(seq_key, self.config.return_instantiated)
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("prefix", &self.config.dataset_prefix)
            .field("sequences", &self.len())
            .field("cached_meshes", &self.mesh_cache.len())
            .finish()
    }
}
