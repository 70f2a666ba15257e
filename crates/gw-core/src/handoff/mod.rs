//! Resume tickets: records that let a journey finish after a full-page
//! redirect.
//!
//! Each ticket kind owns a fixed set of storage keys. The key names are a
//! stable contract with previously stored sessions and must not change.

use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationRequest;
use crate::ids::EvaluationId;
use crate::payment::PaymentType;

pub const PENDING_EVALUATION_KEY: &str = "pending_evaluation";
pub const PENDING_PAYMENT_REFERENCE_KEY: &str = "pending_payment_reference";
/// Payment type bought for the pending evaluation. Absent means standard.
pub const PENDING_PAYMENT_TYPE_KEY: &str = "pending_payment_type";
pub const PENDING_REFINEMENT_EVALUATION_ID_KEY: &str = "pending_refinement_evaluation_id";
pub const PENDING_REFINEMENT_REFERENCE_KEY: &str = "pending_refinement_reference";
pub const PENDING_GRANT_URL_KEY: &str = "pending_grant_url";
pub const PENDING_GRANT_NAME_KEY: &str = "pending_grant_name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ticket", rename_all = "snake_case")]
pub enum ResumeTicket {
    /// A new evaluation waiting for its payment to be verified.
    PendingEvaluation {
        request: EvaluationRequest,
        payment_type: PaymentType,
    },
    PendingRefinement { evaluation_id: EvaluationId },
    /// A grant URL supplied before sign-in.
    PendingLandingGrant {
        grant_url: String,
        grant_name: Option<String>,
    },
}

impl ResumeTicket {
    pub fn kind(&self) -> TicketKind {
        match self {
            ResumeTicket::PendingEvaluation { .. } => TicketKind::Evaluation,
            ResumeTicket::PendingRefinement { .. } => TicketKind::Refinement,
            ResumeTicket::PendingLandingGrant { .. } => TicketKind::Landing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    Evaluation,
    Refinement,
    Landing,
}

impl TicketKind {
    /// Every storage key belonging to this ticket kind.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            TicketKind::Evaluation => &[
                PENDING_EVALUATION_KEY,
                PENDING_PAYMENT_TYPE_KEY,
                PENDING_PAYMENT_REFERENCE_KEY,
            ],
            TicketKind::Refinement => &[
                PENDING_REFINEMENT_EVALUATION_ID_KEY,
                PENDING_REFINEMENT_REFERENCE_KEY,
            ],
            TicketKind::Landing => &[PENDING_GRANT_URL_KEY, PENDING_GRANT_NAME_KEY],
        }
    }

    /// Key of the fallback payment reference, for payment-bearing tickets.
    pub fn reference_key(&self) -> Option<&'static str> {
        match self {
            TicketKind::Evaluation => Some(PENDING_PAYMENT_REFERENCE_KEY),
            TicketKind::Refinement => Some(PENDING_REFINEMENT_REFERENCE_KEY),
            TicketKind::Landing => None,
        }
    }
}

/// A pending evaluation as read back from storage.
///
/// The request is stored as its flat wire form under
/// [`PENDING_EVALUATION_KEY`]; the payment type lives under
/// [`PENDING_PAYMENT_TYPE_KEY`] so the return leg is verified against the
/// type actually purchased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvaluation {
    pub request: EvaluationRequest,
    pub payment_type: PaymentType,
}
