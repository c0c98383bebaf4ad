//! Index and lazy loader for the OakInk2 bimanual manipulation dataset.
//!
//! A [`Dataset`] lists the annotated sequences and resolves each one into a
//! [`ComplexTask`] (the whole sequence, with its program dependency graph)
//! and its [`PrimitiveTask`]s (single annotated segments). Objects and
//! object parts resolve into [`Affordance`] records. All records start
//! un-hydrated; the `instantiate_*` methods attach the heavy per-frame
//! tensors and meshes on demand.

pub mod config;
pub mod dataset;
pub mod error;
pub mod log;
pub mod mesh;
pub mod model;
pub mod program;
pub mod storage;
pub mod tensor;

pub use config::{DatasetConfig, DatasetLayout};
pub use dataset::{Dataset, TaskSelector};
pub use error::{Error, Result};
pub use mesh::{Mesh, MeshCache, MeshDecoder};
pub use model::{
    Affordance, AffordanceMesh, ComplexTask, FrameRange, FrameRangeDef, Hand, HandInvolved,
    Hydration, PrimitiveTask, ProgramDependencyGraph,
};
pub use program::{PrimitiveClassifier, TaskNameMap, TaskNames, TransientPrimitives};
