//! Payment domain: intents, history records, pricing, the redirect return
//! leg and the payment broker state machine.

pub mod return_url;
pub mod state_machine;

pub use return_url::{PaymentOutcomeHint, PaymentReturn};
pub use state_machine::{PaymentAction, PaymentEvent, PaymentFlowState, PaymentStateMachine};

use serde::{Deserialize, Serialize};

use crate::ids::PaymentReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Standard,
    Bundle,
    Refinement,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Standard => "standard",
            PaymentType::Bundle => "bundle",
            PaymentType::Refinement => "refinement",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "standard" => Some(PaymentType::Standard),
            "bundle" => Some(PaymentType::Bundle),
            "refinement" => Some(PaymentType::Refinement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Initialized,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Body of `POST /payments/initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitializePaymentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub payment_type: PaymentType,
}

/// Response of `POST /payments/initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializedPayment {
    pub authorization_url: String,
    pub reference: PaymentReference,
}

/// A payment as tracked by the broker between initialization and redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub payment_type: PaymentType,
    pub reference: PaymentReference,
    pub authorization_url: String,
    pub status: PaymentStatus,
}

/// One entry of `GET /payments/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub reference: PaymentReference,
    #[serde(default)]
    pub paystack_reference: Option<String>,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
}

impl PaymentRecord {
    fn matches_reference(&self, reference: &PaymentReference) -> bool {
        self.reference == *reference
            || self.paystack_reference.as_deref() == Some(reference.as_str())
    }
}

/// Finds the history entry proving that `reference` was paid for
/// `payment_type`.
///
/// The processor may echo either the server reference or its own reference
/// on the return URL, so both are accepted.
pub fn find_succeeded<'a>(
    history: &'a [PaymentRecord],
    reference: &PaymentReference,
    payment_type: PaymentType,
) -> Option<&'a PaymentRecord> {
    history.iter().find(|record| {
        record.matches_reference(reference)
            && record.status == PaymentStatus::Succeeded
            && record.payment_type == payment_type
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd_equivalent: f64,
    #[serde(default)]
    pub amount_minor: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response of `GET /payments/pricing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub standard: PriceQuote,
    pub bundle: PriceQuote,
    pub refinement: PriceQuote,
}

impl Pricing {
    pub fn quote(&self, payment_type: PaymentType) -> &PriceQuote {
        match payment_type {
            PaymentType::Standard => &self.standard,
            PaymentType::Bundle => &self.bundle,
            PaymentType::Refinement => &self.refinement,
        }
    }
}
