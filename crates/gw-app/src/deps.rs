//! # Application Dependencies
//!
//! Dependency grouping for [`App`](crate::App) construction.
//!
//! This is NOT a builder: no build steps, no defaults, no hidden logic. It
//! only groups the ports the application needs.

use std::sync::Arc;
use gw_core::ports::*;

/// Every port the application talks to. All fields are required.
pub struct AppDeps {
    // Server
    pub projects: Arc<dyn ProjectsPort>,
    pub grants: Arc<dyn GrantsPort>,
    pub evaluations: Arc<dyn EvaluationsPort>,
    pub payments: Arc<dyn PaymentsPort>,
    pub dashboard: Arc<dyn DashboardPort>,

    // Host page
    pub handoff_store: Arc<dyn HandoffStorePort>,
    pub location: Arc<dyn PageLocationPort>,
    pub auth: Arc<dyn AuthSessionPort>,
    pub events: Arc<dyn OrchestrationEventPort>,
}
