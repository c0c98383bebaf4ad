//! Program metadata: per-segment annotations and the task identifiers
//! derived from them.

pub mod classify;
pub mod info;
pub mod namemap;

pub use classify::{PrimitiveClassifier, TransientPrimitives};
pub use info::{DescInfo, DescItem, ProgramInfo, ProgramItem};
pub use namemap::{TaskNameMap, TaskNames};
