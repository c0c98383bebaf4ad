//! Record types: frame range keys, task and affordance records, and
//! the program dependency graph.

pub mod affordance;
pub mod frame_range;
pub mod hydration;
pub mod pdg;
pub mod task;

pub use affordance::{Affordance, AffordanceMesh, PartTree};
pub use frame_range::{FrameRange, FrameRangeDef, Hand, HandInvolved};
pub use hydration::Hydration;
pub use pdg::{ProgramDependencyGraph, RawPdg};
pub use task::{ComplexTask, ComplexTaskData, PrimitiveTask, PrimitiveTaskData};
