//! Grantwise client
//!
//! Bootstrap for the assessment client: configuration, logging and wiring of
//! the `gw-infra` adapters into the `gw-app` runtime.

pub mod bootstrap;
pub mod cli;

pub use bootstrap::{build_runtime, load_settings, AppRuntime, ClientSettings};
