//! Grantwise Application Orchestration Layer
//!
//! This crate contains the use cases and the assessment orchestrator. It
//! depends on ports only; adapters live in `gw-infra`.

pub mod app;
pub mod deps;
pub mod usecases;

pub use app::{App, AppSettings};
pub use deps::AppDeps;
