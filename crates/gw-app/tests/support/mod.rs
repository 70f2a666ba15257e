//! Fake ports and a wired application for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gw_app::usecases::WatchSettings;
use gw_app::{App, AppDeps, AppSettings};
use gw_core::credits::CreditStatus;
use gw_core::dashboard::DashboardSummary;
use gw_core::error::ApiError;
use gw_core::evaluation::{Evaluation, EvaluationRequest, RefineEvaluationRequest};
use gw_core::grant::{ExtractGrantRequest, GrantContext, IndexedGrant};
use gw_core::ids::EvaluationId;
use gw_core::orchestration::OrchestrationState;
use gw_core::payment::{
    InitializePaymentRequest, InitializedPayment, PaymentRecord, PaymentStatus, PaymentType,
    PriceQuote, Pricing,
};
use gw_core::ports::{
    AuthSessionPort, DashboardPort, EvaluationsPort, GrantsPort, HandoffStorePort,
    OrchestrationEventPort, PaymentsPort, ProjectsPort,
};
use gw_core::project::{NewProject, Project};
use gw_infra::{MemoryHandoffStore, SessionLocation, StaticAuthSession};
use tracing_subscriber::EnvFilter;
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const APP_URL: &str = "https://app.test/dashboard";
pub const AUTHORIZATION_URL: &str = "https://checkout.test/pay/abc123";

pub fn pending(id: i64) -> Evaluation {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "created_at": "2026-03-01T10:00:00Z",
    }))
    .unwrap()
}

pub fn terminal(id: i64, composite_score: f64) -> Evaluation {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "created_at": "2026-03-01T10:00:00Z",
        "composite_score": composite_score,
        "recommendation": "APPLY",
    }))
    .unwrap()
}

pub fn succeeded(reference: &str, payment_type: PaymentType) -> PaymentRecord {
    PaymentRecord {
        reference: reference.into(),
        paystack_reference: None,
        status: PaymentStatus::Succeeded,
        payment_type,
    }
}

pub fn status(free_available: bool, bundle_credits: u32) -> CreditStatus {
    CreditStatus {
        free_available,
        bundle_credits,
        has_converted_refinement: false,
    }
}

/// Scripted stand-in for every server port.
pub struct FakeServer {
    pub credit_status: Mutex<CreditStatus>,
    pub extraction: Mutex<Result<GrantContext, ApiError>>,
    pub create_results: Mutex<VecDeque<Result<Evaluation, ApiError>>>,
    pub create_delay: Mutex<Duration>,
    pub refine_results: Mutex<VecDeque<Result<Evaluation, ApiError>>>,
    /// Served by `get_evaluation` in order; `poll_fallback` once exhausted.
    pub polls: Mutex<VecDeque<Result<Evaluation, ApiError>>>,
    pub poll_fallback: Mutex<Option<Evaluation>>,
    pub history: Mutex<Vec<PaymentRecord>>,
    /// Returned by `payment_history` instead of `history` while set.
    pub history_error: Mutex<Option<ApiError>>,
    pub initialized: Mutex<Result<InitializedPayment, ApiError>>,

    pub create_requests: Mutex<Vec<EvaluationRequest>>,
    pub refine_requests: Mutex<Vec<RefineEvaluationRequest>>,
    pub init_requests: Mutex<Vec<InitializePaymentRequest>>,
    pub credit_status_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self {
            credit_status: Mutex::new(status(true, 0)),
            extraction: Mutex::new(Ok(GrantContext::default())),
            create_results: Mutex::new(VecDeque::new()),
            create_delay: Mutex::new(Duration::ZERO),
            refine_results: Mutex::new(VecDeque::new()),
            polls: Mutex::new(VecDeque::new()),
            poll_fallback: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            history_error: Mutex::new(None),
            initialized: Mutex::new(Ok(InitializedPayment {
                authorization_url: AUTHORIZATION_URL.to_string(),
                reference: "abc123".into(),
            })),
            create_requests: Mutex::new(Vec::new()),
            refine_requests: Mutex::new(Vec::new()),
            init_requests: Mutex::new(Vec::new()),
            credit_status_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeServer {
    pub fn with_status(status: CreditStatus) -> Self {
        let server = Self::default();
        *server.credit_status.lock().unwrap() = status;
        server
    }

    pub fn push_create(&self, result: Result<Evaluation, ApiError>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    pub fn push_refine(&self, result: Result<Evaluation, ApiError>) {
        self.refine_results.lock().unwrap().push_back(result);
    }

    pub fn push_poll(&self, result: Result<Evaluation, ApiError>) {
        self.polls.lock().unwrap().push_back(result);
    }

    pub fn create_requests(&self) -> Vec<EvaluationRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    pub fn refine_requests(&self) -> Vec<RefineEvaluationRequest> {
        self.refine_requests.lock().unwrap().clone()
    }

    pub fn credit_status_calls(&self) -> usize {
        self.credit_status_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectsPort for FakeServer {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        Ok(serde_json::from_value(serde_json::json!({"id": 1, "name": project.name})).unwrap())
    }
}

#[async_trait]
impl GrantsPort for FakeServer {
    async fn list_grants(&self) -> Result<Vec<IndexedGrant>, ApiError> {
        Ok(Vec::new())
    }

    async fn extract_grant(&self, _request: &ExtractGrantRequest) -> Result<GrantContext, ApiError> {
        self.extraction.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvaluationsPort for FakeServer {
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>, ApiError> {
        Ok(Vec::new())
    }

    async fn get_evaluation(&self, id: EvaluationId) -> Result<Evaluation, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.polls.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => self
                .poll_fallback
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ApiError::http(404, format!("evaluation {id} not scripted"))),
        }
    }

    async fn create_evaluation(&self, request: &EvaluationRequest) -> Result<Evaluation, ApiError> {
        self.create_requests.lock().unwrap().push(request.clone());
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.create_results.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(terminal(11, 7.0)))
    }

    async fn refine_evaluation(
        &self,
        request: &RefineEvaluationRequest,
    ) -> Result<Evaluation, ApiError> {
        self.refine_requests.lock().unwrap().push(request.clone());
        let scripted = self.refine_results.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(terminal(12, 8.0)))
    }
}

#[async_trait]
impl PaymentsPort for FakeServer {
    async fn credit_status(&self) -> Result<CreditStatus, ApiError> {
        self.credit_status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credit_status.lock().unwrap().clone())
    }

    async fn pricing(&self) -> Result<Pricing, ApiError> {
        let quote = |usd_equivalent| PriceQuote {
            usd_equivalent,
            amount_minor: None,
            currency: None,
        };
        Ok(Pricing {
            standard: quote(5.0),
            bundle: quote(20.0),
            refinement: quote(3.0),
        })
    }

    async fn initialize_payment(
        &self,
        request: &InitializePaymentRequest,
    ) -> Result<InitializedPayment, ApiError> {
        self.init_requests.lock().unwrap().push(request.clone());
        self.initialized.lock().unwrap().clone()
    }

    async fn payment_history(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        if let Some(error) = self.history_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.history.lock().unwrap().clone())
    }
}

#[async_trait]
impl DashboardPort for FakeServer {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        Ok(DashboardSummary::default())
    }
}

/// Collects every emitted state.
#[derive(Default)]
pub struct RecordingEvents {
    states: Mutex<Vec<OrchestrationState>>,
}

impl RecordingEvents {
    pub fn states(&self) -> Vec<OrchestrationState> {
        self.states.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrchestrationEventPort for RecordingEvents {
    async fn emit_state_changed(&self, state: OrchestrationState) {
        self.states.lock().unwrap().push(state);
    }
}

/// One page load of the application.
pub struct Harness {
    pub server: Arc<FakeServer>,
    pub store: Arc<dyn HandoffStorePort>,
    pub location: Arc<SessionLocation>,
    pub events: Arc<RecordingEvents>,
    pub app: App,
}

impl Harness {
    pub fn new(server: FakeServer) -> Self {
        init_tracing();
        Self::load(
            Arc::new(server),
            Arc::new(MemoryHandoffStore::new()),
            APP_URL,
        )
    }

    /// Loads the page at `url` over existing server and handoff storage, the
    /// way a browser comes back from the payment processor.
    pub fn load(server: Arc<FakeServer>, store: Arc<dyn HandoffStorePort>, url: &str) -> Self {
        Self::load_with_auth(
            server,
            store,
            url,
            Arc::new(StaticAuthSession::new(Some("token".to_string()))),
        )
    }

    pub fn load_with_auth(
        server: Arc<FakeServer>,
        store: Arc<dyn HandoffStorePort>,
        url: &str,
        auth: Arc<dyn AuthSessionPort>,
    ) -> Self {
        let location = Arc::new(SessionLocation::new(Url::parse(url).unwrap()));
        let events = Arc::new(RecordingEvents::default());
        let deps = AppDeps {
            projects: server.clone(),
            grants: server.clone(),
            evaluations: server.clone(),
            payments: server.clone(),
            dashboard: server.clone(),
            handoff_store: store.clone(),
            location: location.clone(),
            auth,
            events: events.clone(),
        };
        let settings = AppSettings {
            watch: WatchSettings {
                poll_interval: Duration::from_secs(2),
                overlay_ceiling: Duration::from_secs(30),
            },
            country_code: Some("NG".to_string()),
        };
        Self {
            server,
            store,
            location,
            events,
            app: App::new(deps, settings),
        }
    }

    /// Returns to the app after the processor redirect.
    pub fn reload(&self, url: &str) -> Self {
        Self::load(self.server.clone(), self.store.clone(), url)
    }
}

/// Whether any of `keys` is present in the handoff store.
pub async fn has_any(store: &Arc<dyn HandoffStorePort>, keys: &[&str]) -> bool {
    for key in keys {
        if store.peek(key).await.unwrap().is_some() {
            return true;
        }
    }
    false
}
