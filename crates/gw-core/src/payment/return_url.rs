//! Parsing of the URL the processor redirects back to.
//!
//! The processor appends `?payment=success|failed|error` and the reference
//! under one of `reference`, `ref` or `trxref`. `payment=success` is a hint
//! only; the payment history is authoritative.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::PaymentReference;

pub const PAYMENT_PARAM: &str = "payment";

/// Reference parameter names in lookup order.
pub const REFERENCE_PARAMS: [&str; 3] = ["reference", "ref", "trxref"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcomeHint {
    Success,
    Failed,
    Error,
}

impl PaymentOutcomeHint {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentReturn {
    pub hint: Option<PaymentOutcomeHint>,
    pub reference: Option<PaymentReference>,
}

impl PaymentReturn {
    pub fn parse(url: &Url) -> Self {
        let mut hint = None;
        let mut found: [Option<String>; 3] = [None, None, None];

        for (key, value) in url.query_pairs() {
            if key == PAYMENT_PARAM {
                hint = hint.or_else(|| PaymentOutcomeHint::parse(&value));
                continue;
            }
            if let Some(slot) = REFERENCE_PARAMS.iter().position(|name| key == *name) {
                let value = value.trim();
                if found[slot].is_none() && !value.is_empty() {
                    found[slot] = Some(value.to_string());
                }
            }
        }

        let reference = found.into_iter().flatten().next().map(PaymentReference::from);
        Self { hint, reference }
    }

    /// Whether the URL carried any payment parameter at all.
    pub fn is_present(&self) -> bool {
        self.hint.is_some() || self.reference.is_some()
    }
}

/// Returns `url` with every payment parameter removed, preserving the order
/// of the remaining query pairs.
pub fn strip_payment_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAYMENT_PARAM && !REFERENCE_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

pub fn has_payment_params(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, _)| key == PAYMENT_PARAM || REFERENCE_PARAMS.contains(&key.as_ref()))
}
