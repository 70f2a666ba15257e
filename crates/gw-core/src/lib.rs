//! # gw-core
//!
//! Core domain models and business logic for the Grantwise client.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod assessment;
pub mod config;
pub mod credits;
pub mod dashboard;
pub mod error;
pub mod evaluation;
pub mod grant;
pub mod handoff;
pub mod ids;
pub mod orchestration;
pub mod payment;
pub mod ports;
pub mod project;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use credits::{CreditDecision, CreditPolicy, CreditStatus, RequestKind};
pub use error::{ApiError, ApiErrorKind, ExtractionCategory, FailureKind};
pub use evaluation::{Evaluation, EvaluationRequest};
pub use grant::GrantContext;
pub use ids::{EvaluationId, GrantId, PaymentReference, ProjectId};
pub use payment::PaymentType;
