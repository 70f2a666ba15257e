//! Port interfaces for the application layer
//!
//! Server ports mirror the HTTP surface of the assessment service and return
//! [`ApiError`](crate::error::ApiError). Host ports stand in for what the page
//! provides: session storage, the address bar, the auth session and the
//! state-change sink.

mod auth;
mod handoff_store;
mod location;
mod orchestration_event;
mod server;

pub use auth::AuthSessionPort;
pub use handoff_store::HandoffStorePort;
pub use location::PageLocationPort;
pub use orchestration_event::OrchestrationEventPort;
pub use server::{DashboardPort, EvaluationsPort, GrantsPort, PaymentsPort, ProjectsPort};
