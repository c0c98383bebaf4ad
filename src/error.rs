use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CBOR error in {path}: {message}")]
    Cbor { path: PathBuf, message: String },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Malformed frame range definition: {0}")]
    FrameRangeParse(String),

    #[error("Sequence not found: {0}")]
    SequenceNotFound(String),

    #[error("Task '{task}' not found in sequence {seq_key}")]
    TaskNotFound { seq_key: String, task: String },

    #[error("No {kind} entry for {key}")]
    MissingEntry { kind: &'static str, key: String },

    #[error("Program dependency graph has a cycle at task: {0}")]
    PdgCycle(String),

    #[error("Object or part not found: {0}")]
    ObjectNotFound(String),

    #[error("Frame {frame} is not recorded in sequence {seq_key}")]
    FrameNotRecorded { seq_key: String, frame: i64 },

    #[error("Sequence {0} has no recorded frames")]
    EmptySequence(String),

    #[error("Shape mismatch for '{name}': expected {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Expected exactly one model file in {dir}, found {found}")]
    MeshSource { dir: PathBuf, found: usize },

    #[error("Mesh decode error in {path}: {message}")]
    MeshDecode { path: PathBuf, message: String },

    #[error("Unsupported mesh format: {0}")]
    UnsupportedMesh(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
