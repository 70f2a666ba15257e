//! # Dependency Injection
//!
//! The only place that knows about gw-infra, gw-app and the settings at the
//! same time. Assembly only: no decisions about what the user sees.

use std::sync::Arc;

use gw_app::{App, AppDeps};
use gw_core::ports::{AuthSessionPort, HandoffStorePort};
use gw_infra::{
    BroadcastEvents, FileHandoffStore, HttpApiClient, MemoryHandoffStore, SessionLocation,
    StaticAuthSession,
};
use tracing::info;
use url::Url;

use super::config::{ClientSettings, HandoffBacking};

pub type WiringResult<T> = Result<T, WiringError>;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}

/// Everything a host needs to drive one page session.
pub struct AppRuntime {
    pub app: App,
    pub location: Arc<SessionLocation>,
    pub auth: Arc<StaticAuthSession>,
    pub events: Arc<BroadcastEvents>,
}

/// Wire adapters into an [`App`] for a page loaded at `page_url`.
pub fn build_runtime(
    settings: &ClientSettings,
    page_url: Url,
    token: Option<String>,
) -> WiringResult<AppRuntime> {
    let auth = Arc::new(StaticAuthSession::new(token));
    let client = Arc::new(
        HttpApiClient::new(
            &settings.api_base_url,
            settings.request_timeout,
            auth.clone() as Arc<dyn AuthSessionPort>,
        )
        .map_err(|err| WiringError::HttpClient(format!("{err:#}")))?,
    );

    let handoff_store: Arc<dyn HandoffStorePort> = match &settings.handoff {
        HandoffBacking::Memory => Arc::new(MemoryHandoffStore::new()),
        HandoffBacking::File(path) => Arc::new(FileHandoffStore::new(path.clone())),
    };
    let location = Arc::new(SessionLocation::new(page_url));
    let events = Arc::new(BroadcastEvents::new());

    let deps = AppDeps {
        projects: client.clone(),
        grants: client.clone(),
        evaluations: client.clone(),
        payments: client.clone(),
        dashboard: client,
        handoff_store,
        location: location.clone(),
        auth: auth.clone(),
        events: events.clone(),
    };

    info!(
        api = %settings.api_base_url,
        handoff = ?settings.handoff,
        "client wired"
    );

    Ok(AppRuntime {
        app: App::new(deps, settings.app.clone()),
        location,
        auth,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::config::resolve_settings;
    use gw_core::config::AppConfig;
    use gw_core::handoff::ResumeTicket;
    use gw_core::orchestration::{ComposeStep, OrchestrationState};
    use std::path::PathBuf;

    fn settings(handoff_path: PathBuf) -> ClientSettings {
        resolve_settings(&AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            handoff_path,
            ..AppConfig::empty()
        })
        .unwrap()
    }

    fn page() -> Url {
        Url::parse("https://app.grantwise.test/dashboard").unwrap()
    }

    #[tokio::test]
    async fn fresh_page_mounts_at_start() {
        let runtime = build_runtime(&settings(PathBuf::new()), page(), None).unwrap();

        let state = runtime.app.orchestrator.mount().await.unwrap();

        assert_eq!(state, OrchestrationState::Start);
        assert!(runtime.location.navigations().is_empty());
    }

    #[tokio::test]
    async fn file_backed_tickets_survive_a_new_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path().join("handoff.json"));

        let first = build_runtime(&settings, page(), Some("token".to_string())).unwrap();
        first
            .app
            .handoff
            .stash(&ResumeTicket::PendingLandingGrant {
                grant_url: "https://foo.test/grant".to_string(),
                grant_name: Some("Foo".to_string()),
            })
            .await
            .unwrap();
        drop(first);

        let second = build_runtime(&settings, page(), None).unwrap();
        let state = second.app.orchestrator.mount().await.unwrap();

        let OrchestrationState::Composing {
            from_landing, step, ..
        } = state
        else {
            panic!("expected composer, got {state:?}");
        };
        assert!(from_landing);
        assert!(matches!(step, ComposeStep::EnteringUrl { .. }));
    }
}
