//! Assessment orchestration domain module.
//!
//! This module defines the assessment flow state machine types.

mod action;
mod event;
mod state;
pub mod state_machine;

pub use action::OrchestrationAction;
pub use event::OrchestrationEvent;
pub use state::{
    ComposeError, ComposeStep, Journey, JourneyKind, OrchestrationState, ResumeSnapshot,
};
pub use state_machine::OrchestrationStateMachine;
