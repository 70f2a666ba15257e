//! Credit status and the pure credit policy.
//!
//! The policy never performs IO and holds no state: for a fixed status and
//! request kind it always returns the same decision. The server remains
//! authoritative on credit consumption.

use serde::{Deserialize, Serialize};

use crate::payment::PaymentType;

/// Response of `GET /payments/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditStatus {
    #[serde(default)]
    pub free_available: bool,
    #[serde(default)]
    pub bundle_credits: u32,
    /// Set by the server when a refinement purchase was converted into a
    /// bundle credit. The client only displays it.
    #[serde(default)]
    pub has_converted_refinement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// The user's very first standard assessment.
    FirstStandard,
    Standard,
    Refinement,
}

impl RequestKind {
    /// Kind of a new standard evaluation request given the current status.
    ///
    /// The free credit exists only until the first assessment, so its
    /// availability marks the request as the first one.
    pub fn for_evaluation(status: &CreditStatus) -> Self {
        if status.free_available {
            RequestKind::FirstStandard
        } else {
            RequestKind::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "payment_type", rename_all = "snake_case")]
pub enum CreditDecision {
    UseFree,
    UseBundleCredit,
    RequirePayment(PaymentType),
}

impl CreditDecision {
    pub fn requires_payment(&self) -> bool {
        matches!(self, CreditDecision::RequirePayment(_))
    }
}

pub struct CreditPolicy;

impl CreditPolicy {
    pub fn decide(status: &CreditStatus, kind: RequestKind) -> CreditDecision {
        match kind {
            RequestKind::Refinement => CreditDecision::RequirePayment(PaymentType::Refinement),
            RequestKind::FirstStandard if status.free_available => CreditDecision::UseFree,
            RequestKind::FirstStandard | RequestKind::Standard => {
                if status.bundle_credits > 0 {
                    CreditDecision::UseBundleCredit
                } else {
                    CreditDecision::RequirePayment(PaymentType::Standard)
                }
            }
        }
    }
}
