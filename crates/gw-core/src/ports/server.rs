use async_trait::async_trait;

use crate::credits::CreditStatus;
use crate::dashboard::DashboardSummary;
use crate::error::ApiError;
use crate::evaluation::{Evaluation, EvaluationRequest, RefineEvaluationRequest};
use crate::grant::{ExtractGrantRequest, GrantContext, IndexedGrant};
use crate::ids::EvaluationId;
use crate::payment::{InitializePaymentRequest, InitializedPayment, PaymentRecord, Pricing};
use crate::project::{NewProject, Project};

#[async_trait]
pub trait ProjectsPort: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
}

#[async_trait]
pub trait GrantsPort: Send + Sync {
    async fn list_grants(&self) -> Result<Vec<IndexedGrant>, ApiError>;

    /// Parses a grant page. Never mutates the server's grant index.
    async fn extract_grant(&self, request: &ExtractGrantRequest) -> Result<GrantContext, ApiError>;
}

#[async_trait]
pub trait EvaluationsPort: Send + Sync {
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>, ApiError>;
    async fn get_evaluation(&self, id: EvaluationId) -> Result<Evaluation, ApiError>;

    /// Fails with `payment-required` when the server refuses to consume a
    /// credit for this request.
    async fn create_evaluation(&self, request: &EvaluationRequest)
        -> Result<Evaluation, ApiError>;

    async fn refine_evaluation(
        &self,
        request: &RefineEvaluationRequest,
    ) -> Result<Evaluation, ApiError>;
}

#[async_trait]
pub trait PaymentsPort: Send + Sync {
    async fn credit_status(&self) -> Result<CreditStatus, ApiError>;
    async fn pricing(&self) -> Result<Pricing, ApiError>;
    async fn initialize_payment(
        &self,
        request: &InitializePaymentRequest,
    ) -> Result<InitializedPayment, ApiError>;
    async fn payment_history(&self) -> Result<Vec<PaymentRecord>, ApiError>;
}

#[async_trait]
pub trait DashboardPort: Send + Sync {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError>;
}
