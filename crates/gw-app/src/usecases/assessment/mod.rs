//! Assessment flow: composition, credit decision, payment and watching.

pub mod context;
pub mod orchestrator;

pub use context::AssessmentContext;
pub use orchestrator::{AssessmentError, AssessmentOrchestrator};
