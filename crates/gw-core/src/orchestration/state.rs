use serde::{Deserialize, Serialize};

use crate::error::{ExtractionCategory, FailureKind};
use crate::evaluation::EvaluationRequest;
use crate::grant::GrantContext;
use crate::handoff::TicketKind;
use crate::ids::{EvaluationId, PaymentReference, ProjectId};
use crate::payment::{PaymentFlowState, PaymentType};

/// Top-level assessment flow state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrchestrationState {
    /// No pending request.
    #[default]
    Start,
    /// The composition form is open.
    Composing {
        project_id: Option<ProjectId>,
        /// Opened from a grant handed over by the landing page.
        from_landing: bool,
        step: ComposeStep,
    },
    /// Credit status is being loaded so the credit policy can decide.
    Deciding { journey: Journey },
    AwaitingPayment {
        journey: Journey,
        payment: PaymentFlowState,
    },
    /// Create or refine is in flight.
    Submitting {
        journey: Journey,
        payment_reference: Option<PaymentReference>,
        /// Tickets to clear once the server accepted the request.
        release: Vec<TicketKind>,
    },
    Watching { evaluation_id: EvaluationId },
    Terminal { evaluation_id: EvaluationId },
    /// The overlay ceiling elapsed while the evaluation was still pending.
    OverlayReleased { evaluation_id: EvaluationId },
    Failed {
        kind: FailureKind,
        evaluation_id: Option<EvaluationId>,
    },
}

impl OrchestrationState {
    /// Evaluation the user is looking at, if any.
    pub fn evaluation_id(&self) -> Option<EvaluationId> {
        match self {
            OrchestrationState::Watching { evaluation_id }
            | OrchestrationState::Terminal { evaluation_id }
            | OrchestrationState::OverlayReleased { evaluation_id } => Some(*evaluation_id),
            OrchestrationState::Failed { evaluation_id, .. } => *evaluation_id,
            _ => None,
        }
    }

    pub fn is_watching(&self) -> bool {
        matches!(self, OrchestrationState::Watching { .. })
    }
}

/// Sub-state of the composition form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ComposeStep {
    EnteringUrl {
        url: String,
        name: Option<String>,
        error: Option<ComposeError>,
    },
    Extracting {
        url: String,
        name: Option<String>,
    },
    ReviewingExtracted {
        url: String,
        context: GrantContext,
        error: Option<ComposeError>,
    },
    PickingIndexed { error: Option<ComposeError> },
}

impl ComposeStep {
    pub fn entering(url: impl Into<String>, name: Option<String>) -> Self {
        ComposeStep::EnteringUrl {
            url: url.into(),
            name,
            error: None,
        }
    }
}

/// Inline error shown on the composition form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ComposeError {
    Extraction { category: ExtractionCategory },
    InvalidUrl,
    MissingGrantName,
    /// First validation message returned by the server.
    Validation { message: String },
}

/// What the user asked for, carried from composition to submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub kind: JourneyKind,
    pub from_landing: bool,
}

impl Journey {
    pub fn evaluation(request: EvaluationRequest, from_landing: bool) -> Self {
        Self {
            kind: JourneyKind::Evaluation(request),
            from_landing,
        }
    }

    pub fn refinement(evaluation_id: EvaluationId) -> Self {
        Self {
            kind: JourneyKind::Refinement { evaluation_id },
            from_landing: false,
        }
    }

    /// Ticket kind that carries this journey across a payment redirect.
    pub fn ticket_kind(&self) -> TicketKind {
        match self.kind {
            JourneyKind::Evaluation(_) => TicketKind::Evaluation,
            JourneyKind::Refinement { .. } => TicketKind::Refinement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "journey", rename_all = "snake_case")]
pub enum JourneyKind {
    Evaluation(EvaluationRequest),
    Refinement { evaluation_id: EvaluationId },
}

/// What the page found on mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resume", rename_all = "snake_case")]
pub enum ResumeSnapshot {
    Fresh,
    /// A payment ticket plus a reference from the URL or the fallback key.
    PaymentReturn {
        journey: Journey,
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    LandingGrant {
        grant_url: String,
        grant_name: Option<String>,
    },
}
