use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationRequest;
use crate::handoff::{ResumeTicket, TicketKind};
use crate::ids::{EvaluationId, PaymentReference};
use crate::payment::PaymentType;

/// Side-effects produced by orchestration transitions, executed in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrchestrationAction {
    ExtractGrant { url: String, name: Option<String> },
    /// Abandon the in-flight extraction; a late result is discarded.
    CancelExtraction,
    LoadCreditStatus,
    PersistTicket(ResumeTicket),
    InitializePayment { payment_type: PaymentType },
    PersistFallbackReference {
        ticket: TicketKind,
        reference: PaymentReference,
    },
    /// Leave the page for the processor.
    Redirect { authorization_url: String },
    VerifyPayment {
        payment_type: PaymentType,
        reference: PaymentReference,
    },
    CreateEvaluation(EvaluationRequest),
    RefineEvaluation {
        evaluation_id: EvaluationId,
        payment_reference: PaymentReference,
    },
    ClearTickets { kinds: Vec<TicketKind> },
    RefreshCredits,
    /// Follow the evaluation until terminal, detach or the overlay ceiling.
    WatchEvaluation { evaluation_id: EvaluationId },
    ReportSessionExpired,
}
