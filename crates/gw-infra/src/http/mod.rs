//! HTTP adapter for the assessment service.

mod client;
mod decode;

pub use client::HttpApiClient;
pub use decode::error_from_status;
