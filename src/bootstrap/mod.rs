pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{load_settings, ClientSettings, ConfigError, HandoffBacking};
pub use wiring::{build_runtime, AppRuntime, WiringError};
