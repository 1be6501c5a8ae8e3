//! Request routing and query-generation workflows.

pub mod events;
mod generation;
mod router;

pub use events::{step, StepStatus, WorkflowEvent, WorkflowKind};
pub use generation::GenerationWorkflow;
pub use router::Router;
