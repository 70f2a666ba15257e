use std::sync::Arc;

use gw_core::assessment::AssessmentView;
use gw_core::error::ApiError;
use gw_core::ids::EvaluationId;
use gw_core::ports::ProjectsPort;
use tracing::warn;

use crate::usecases::evaluations::EvaluationStore;

/// Builds the view model of one evaluation, pending or terminal.
pub struct ShowAssessment {
    evaluations: Arc<EvaluationStore>,
    projects: Arc<dyn ProjectsPort>,
}

impl ShowAssessment {
    pub fn new(evaluations: Arc<EvaluationStore>, projects: Arc<dyn ProjectsPort>) -> Self {
        Self {
            evaluations,
            projects,
        }
    }

    /// Uses the cached snapshot when there is one.
    pub async fn execute(&self, id: EvaluationId) -> Result<AssessmentView, ApiError> {
        let evaluation = match self.evaluations.cached(id).await {
            Some(evaluation) => evaluation,
            None => self.evaluations.get(id).await?,
        };

        let project = match evaluation.project_id {
            Some(project_id) => match self.projects.list_projects().await {
                Ok(projects) => projects.into_iter().find(|project| project.id == project_id),
                Err(err) => {
                    warn!(error = %err, "project lookup failed; rendering without project name");
                    None
                }
            },
            None => None,
        };

        Ok(AssessmentView::build(&evaluation, project.as_ref(), None))
    }
}
