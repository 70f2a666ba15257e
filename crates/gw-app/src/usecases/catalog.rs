//! Read-mostly server data behind the composer and the dashboard.

use std::sync::Arc;

use gw_core::dashboard::DashboardSummary;
use gw_core::error::ApiError;
use gw_core::grant::IndexedGrant;
use gw_core::payment::Pricing;
use gw_core::ports::{DashboardPort, GrantsPort, PaymentsPort, ProjectsPort};
use gw_core::project::{NewProject, Project, ProjectError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid project: {0}")]
    Invalid(#[from] ProjectError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Catalog {
    projects: Arc<dyn ProjectsPort>,
    grants: Arc<dyn GrantsPort>,
    payments: Arc<dyn PaymentsPort>,
    dashboard: Arc<dyn DashboardPort>,
}

impl Catalog {
    pub fn new(
        projects: Arc<dyn ProjectsPort>,
        grants: Arc<dyn GrantsPort>,
        payments: Arc<dyn PaymentsPort>,
        dashboard: Arc<dyn DashboardPort>,
    ) -> Self {
        Self {
            projects,
            grants,
            payments,
            dashboard,
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.projects.list_projects().await
    }

    pub async fn create_project(&self, project: NewProject) -> Result<Project, CatalogError> {
        project.validate()?;
        let created = self.projects.create_project(&project).await?;
        info!(project_id = %created.id, "project created");
        Ok(created)
    }

    pub async fn list_indexed_grants(&self) -> Result<Vec<IndexedGrant>, ApiError> {
        self.grants.list_grants().await
    }

    pub async fn pricing(&self) -> Result<Pricing, ApiError> {
        self.payments.pricing().await
    }

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.dashboard.dashboard_summary().await
    }
}
