//! ID type wrappers for type safety.

mod id_macro;

use id_macro::impl_numeric_id;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Server-assigned evaluation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(i64);

/// Server-assigned project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

/// Identifier of a grant in the server-side index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantId(i64);

impl_numeric_id!(EvaluationId, ProjectId, GrantId);

/// Opaque payment reference issued by the server when a payment is initialized.
///
/// It is the only identity carried across the processor redirect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PaymentReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PaymentReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_id_parses_from_handoff_string() {
        let id: EvaluationId = " 7 ".parse().unwrap();
        assert_eq!(id, EvaluationId::new(7));
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn numeric_ids_serialize_transparently() {
        let json = serde_json::to_string(&GrantId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn payment_reference_from_str() {
        let reference: PaymentReference = "abc123".into();
        assert_eq!(reference.as_str(), "abc123");
    }
}
