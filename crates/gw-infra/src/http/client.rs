use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use gw_core::credits::CreditStatus;
use gw_core::dashboard::DashboardSummary;
use gw_core::error::ApiError;
use gw_core::evaluation::{Evaluation, EvaluationRequest, RefineEvaluationRequest};
use gw_core::grant::{ExtractGrantRequest, GrantContext, IndexedGrant};
use gw_core::ids::EvaluationId;
use gw_core::payment::{InitializePaymentRequest, InitializedPayment, PaymentRecord, Pricing};
use gw_core::ports::{
    AuthSessionPort, DashboardPort, EvaluationsPort, GrantsPort, PaymentsPort, ProjectsPort,
};
use gw_core::project::{NewProject, Project};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::decode::decode_response;

/// JSON client for the assessment service. Implements every server port.
///
/// Requests are never retried; a failed call surfaces as an [`ApiError`].
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthSessionPort>,
}

impl HttpApiClient {
    pub fn new(
        base_url: &Url,
        timeout: Duration,
        auth: Arc<dyn AuthSessionPort>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.auth.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "api request");
        let response = request.send().await.map_err(|err| {
            warn!(%method, path, error = %err, "api request failed");
            if err.is_timeout() {
                ApiError::transport("request timed out")
            } else {
                ApiError::transport(err.to_string())
            }
        })?;

        let result = decode_response(response).await;
        if let Err(err) = &result {
            debug!(%method, path, kind = %err.kind, status = ?err.http_status, "api error response");
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl ProjectsPort for HttpApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects").await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.post("/projects", project).await
    }
}

#[async_trait]
impl GrantsPort for HttpApiClient {
    async fn list_grants(&self) -> Result<Vec<IndexedGrant>, ApiError> {
        self.get("/grants").await
    }

    async fn extract_grant(&self, request: &ExtractGrantRequest) -> Result<GrantContext, ApiError> {
        self.post("/grants/extract", request).await
    }
}

#[async_trait]
impl EvaluationsPort for HttpApiClient {
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>, ApiError> {
        self.get("/evaluations").await
    }

    async fn get_evaluation(&self, id: EvaluationId) -> Result<Evaluation, ApiError> {
        self.get(&format!("/evaluations/{id}")).await
    }

    async fn create_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Evaluation, ApiError> {
        self.post("/evaluations", request).await
    }

    async fn refine_evaluation(
        &self,
        request: &RefineEvaluationRequest,
    ) -> Result<Evaluation, ApiError> {
        self.post("/evaluations/refine", request).await
    }
}

#[async_trait]
impl PaymentsPort for HttpApiClient {
    async fn credit_status(&self) -> Result<CreditStatus, ApiError> {
        self.get("/payments/status").await
    }

    async fn pricing(&self) -> Result<Pricing, ApiError> {
        self.get("/payments/pricing").await
    }

    async fn initialize_payment(
        &self,
        request: &InitializePaymentRequest,
    ) -> Result<InitializedPayment, ApiError> {
        self.post("/payments/initialize", request).await
    }

    async fn payment_history(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        self.get("/payments/history").await
    }
}

#[async_trait]
impl DashboardPort for HttpApiClient {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.get("/users/me/dashboard").await
    }
}
