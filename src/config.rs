use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{zlog_debug, Error, Result};

fn default_anno_offset() -> String {
    "anno_preview".to_string()
}

fn default_obj_offset() -> String {
    "object_raw".to_string()
}

fn default_affordance_offset() -> String {
    "object_affordance".to_string()
}

fn default_transient_primitives() -> Vec<String> {
    ["approach", "retreat", "reach", "release"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_mesh_extensions() -> Vec<String> {
    vec!["obj".to_string(), "ply".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub dataset_prefix: PathBuf,
    #[serde(default = "default_anno_offset")]
    pub anno_offset: String,
    #[serde(default = "default_obj_offset")]
    pub obj_offset: String,
    #[serde(default = "default_affordance_offset")]
    pub affordance_offset: String,
    /// Hydrate records as soon as they are loaded.
    #[serde(default)]
    pub return_instantiated: bool,
    /// Primitive types classified as transient; everything else is
    /// affordance-typed.
    #[serde(default = "default_transient_primitives")]
    pub transient_primitives: Vec<String>,
    #[serde(default = "default_mesh_extensions")]
    pub mesh_extensions: Vec<String>,
}

impl DatasetConfig {
    pub fn new(dataset_prefix: impl Into<PathBuf>) -> Self {
        Self {
            dataset_prefix: dataset_prefix.into(),
            anno_offset: default_anno_offset(),
            obj_offset: default_obj_offset(),
            affordance_offset: default_affordance_offset(),
            return_instantiated: false,
            transient_primitives: default_transient_primitives(),
            mesh_extensions: default_mesh_extensions(),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".oakink2"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("oakink2.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        zlog_debug!("DatasetConfig::load path={}", path.display());
        let text = fs::read_to_string(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        zlog_debug!(
            "Config loaded: prefix={} instantiated={} transient={:?}",
            config.dataset_prefix.display(),
            config.return_instantiated,
            config.transient_primitives
        );
        Ok(config)
    }

    /// Load `~/.oakink2/oakink2.toml`, or fall back to defaults rooted at
    /// `fallback_prefix` when the file does not exist.
    pub fn load_default(fallback_prefix: impl Into<PathBuf>) -> Result<Self> {
        Self::load_or_default(&Self::config_path()?, fallback_prefix)
    }

    /// Load `path`, or fall back to defaults rooted at `fallback_prefix`
    /// when it does not exist.
    pub fn load_or_default(path: &Path, fallback_prefix: impl Into<PathBuf>) -> Result<Self> {
        if !path.exists() {
            zlog_debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::new(fallback_prefix));
        }
        Self::load(path)
    }

    pub fn with_instantiated(mut self, return_instantiated: bool) -> Self {
        self.return_instantiated = return_instantiated;
        self
    }

    pub fn layout(&self) -> DatasetLayout {
        DatasetLayout::new(self)
    }
}

/// Every directory and file location derived from a [`DatasetConfig`].
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub anno_dir: PathBuf,
    pub obj_dir: PathBuf,
    pub obj_model_dir: PathBuf,
    pub program_dir: PathBuf,
    pub program_extension_dir: PathBuf,
    pub affordance_dir: PathBuf,
    pub affordance_part_dir: PathBuf,
}

impl DatasetLayout {
    fn new(config: &DatasetConfig) -> Self {
        let prefix = &config.dataset_prefix;
        let obj_dir = prefix.join(&config.obj_offset);
        let affordance_dir = prefix.join(&config.affordance_offset);
        Self {
            anno_dir: prefix.join(&config.anno_offset),
            obj_model_dir: obj_dir.join("align_ds"),
            obj_dir,
            program_dir: prefix.join("program"),
            program_extension_dir: prefix.join("program_extension"),
            affordance_part_dir: affordance_dir.join("affordance_part"),
            affordance_dir,
        }
    }

    pub fn task_target_path(&self) -> PathBuf {
        self.program_dir.join("task_target.json")
    }

    pub fn program_info_path(&self, seq_token: &str) -> PathBuf {
        self.program_dir
            .join("program_info")
            .join(format!("{seq_token}.json"))
    }

    pub fn desc_info_path(&self, seq_token: &str) -> PathBuf {
        self.program_dir
            .join("desc_info")
            .join(format!("{seq_token}.json"))
    }

    pub fn pdg_path(&self, seq_token: &str) -> PathBuf {
        self.program_dir
            .join("pdg")
            .join(format!("{seq_token}.json"))
    }

    pub fn initial_condition_path(&self, seq_token: &str) -> PathBuf {
        self.program_dir
            .join("initial_condition_info")
            .join(format!("{seq_token}.json"))
    }

    pub fn frame_id_cache_path(&self, seq_token: &str) -> PathBuf {
        self.program_extension_dir
            .join("frame_id")
            .join(format!("{seq_token}.cbor"))
    }

    pub fn obj_list_cache_path(&self, seq_token: &str) -> PathBuf {
        self.program_extension_dir
            .join("obj_list")
            .join(format!("{seq_token}.json"))
    }

    pub fn anno_path(&self, seq_token: &str) -> PathBuf {
        self.anno_dir.join(format!("{seq_token}.cbor"))
    }

    pub fn obj_desc_path(&self) -> PathBuf {
        self.obj_dir.join("obj_desc.json")
    }

    pub fn part_desc_path(&self) -> PathBuf {
        self.affordance_dir.join("part_desc.json")
    }

    pub fn instance_id_path(&self) -> PathBuf {
        self.affordance_dir.join("instance_id.json")
    }

    pub fn part_tree_path(&self) -> PathBuf {
        self.affordance_dir.join("object_part_tree.json")
    }

    pub fn object_affordance_path(&self) -> PathBuf {
        self.affordance_dir.join("object_affordance.json")
    }
}

/// Sequence keys contain `/`; on-disk names use `++` instead.
pub fn seq_token(seq_key: &str) -> String {
    seq_key.replace('/', "++")
}
