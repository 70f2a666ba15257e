//! Tracing subscriber initialization.
//!
//! Output goes to stderr so stdout stays free for whatever the host prints.
//! `RUST_LOG` wins over everything; otherwise the configured filter, then the
//! build-dependent defaults.

use std::io;

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives.
///
/// Debug builds log everything at `debug`; release builds at `info`. HTTP
/// internals are kept at `warn` either way.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        level.to_string(),
        format!("gw_app={level}"),
        format!("gw_infra={level}"),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
        "rustls=warn".to_string(),
    ]
}

fn build_env_filter(configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if let Some(directives) = configured.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(err) => eprintln!("Invalid log filter `{directives}`, using defaults: {err}"),
        }
    }
    EnvFilter::new(build_filter_directives(is_development()).join(","))
}

/// Register the global subscriber. Call once, before anything logs.
///
/// # Errors
///
/// Fails if a global subscriber is already registered.
pub fn init_tracing_subscriber(configured_filter: Option<&str>) -> anyhow::Result<()> {
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(io::stderr);

    registry()
        .with(build_env_filter(configured_filter))
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}
