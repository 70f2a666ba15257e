use serde::{Deserialize, Serialize};

use crate::credits::CreditStatus;
use crate::error::{ApiError, ExtractionCategory};
use crate::grant::GrantContext;
use crate::ids::{EvaluationId, GrantId, ProjectId};
use crate::payment::PaymentEvent;

use super::ResumeSnapshot;

/// Events that drive the assessment flow.
///
/// User events come from the public orchestrator methods; the others are
/// follow-ups produced while executing actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestrationEvent {
    Resumed { snapshot: ResumeSnapshot },
    BeginAssessment { project_id: Option<ProjectId> },
    BeginRefinement { evaluation_id: EvaluationId },
    SelectProject { project_id: Option<ProjectId> },
    ChooseIndexed,
    ChooseUrlEntry,
    SubmitUrl { url: String, name: Option<String> },
    /// Skips extraction and opens the form with whatever the user typed.
    EnterManually,
    ExtractionSucceeded { context: GrantContext },
    ExtractionFailed { category: ExtractionCategory },
    ExtractionCancelled,
    /// Replaces the form record with the user's edited copy.
    EditGrant { context: GrantContext },
    SubmitGrant,
    /// Landing handoff only: free evaluation of the URL with no project.
    SkipWithDefaults,
    PickGrant { grant_id: GrantId },
    CloseComposer,
    CreditStatusLoaded { status: CreditStatus },
    CreditStatusFailed { error: ApiError },
    Payment(PaymentEvent),
    EvaluationCreated {
        evaluation_id: EvaluationId,
        terminal: bool,
    },
    SubmissionFailed { error: ApiError },
    EvaluationCompleted { evaluation_id: EvaluationId },
    OverlayCeilingElapsed { evaluation_id: EvaluationId },
    WatchFailed {
        evaluation_id: EvaluationId,
        error: ApiError,
    },
    WatchDetached { evaluation_id: EvaluationId },
    /// An action could not run because of an internal inconsistency.
    Fault { message: String },
    Restart,
}

impl OrchestrationEvent {
    /// Whether the event would start a second submission-like transition if
    /// it raced with one already in flight.
    pub fn is_conflicting(&self) -> bool {
        matches!(
            self,
            OrchestrationEvent::SubmitUrl { .. }
                | OrchestrationEvent::SubmitGrant
                | OrchestrationEvent::SkipWithDefaults
                | OrchestrationEvent::PickGrant { .. }
                | OrchestrationEvent::BeginAssessment { .. }
                | OrchestrationEvent::BeginRefinement { .. }
                | OrchestrationEvent::Payment(PaymentEvent::Confirm)
                | OrchestrationEvent::Payment(PaymentEvent::RetryVerification)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrchestrationEvent::Resumed { .. } => "resumed",
            OrchestrationEvent::BeginAssessment { .. } => "begin_assessment",
            OrchestrationEvent::BeginRefinement { .. } => "begin_refinement",
            OrchestrationEvent::SelectProject { .. } => "select_project",
            OrchestrationEvent::ChooseIndexed => "choose_indexed",
            OrchestrationEvent::ChooseUrlEntry => "choose_url_entry",
            OrchestrationEvent::SubmitUrl { .. } => "submit_url",
            OrchestrationEvent::EnterManually => "enter_manually",
            OrchestrationEvent::ExtractionSucceeded { .. } => "extraction_succeeded",
            OrchestrationEvent::ExtractionFailed { .. } => "extraction_failed",
            OrchestrationEvent::ExtractionCancelled => "extraction_cancelled",
            OrchestrationEvent::EditGrant { .. } => "edit_grant",
            OrchestrationEvent::SubmitGrant => "submit_grant",
            OrchestrationEvent::SkipWithDefaults => "skip_with_defaults",
            OrchestrationEvent::PickGrant { .. } => "pick_grant",
            OrchestrationEvent::CloseComposer => "close_composer",
            OrchestrationEvent::CreditStatusLoaded { .. } => "credit_status_loaded",
            OrchestrationEvent::CreditStatusFailed { .. } => "credit_status_failed",
            OrchestrationEvent::Payment(_) => "payment",
            OrchestrationEvent::EvaluationCreated { .. } => "evaluation_created",
            OrchestrationEvent::SubmissionFailed { .. } => "submission_failed",
            OrchestrationEvent::EvaluationCompleted { .. } => "evaluation_completed",
            OrchestrationEvent::OverlayCeilingElapsed { .. } => "overlay_ceiling_elapsed",
            OrchestrationEvent::WatchFailed { .. } => "watch_failed",
            OrchestrationEvent::WatchDetached { .. } => "watch_detached",
            OrchestrationEvent::Fault { .. } => "fault",
            OrchestrationEvent::Restart => "restart",
        }
    }
}

impl From<PaymentEvent> for OrchestrationEvent {
    fn from(event: PaymentEvent) -> Self {
        OrchestrationEvent::Payment(event)
    }
}
