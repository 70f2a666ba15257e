use serde::{Deserialize, Serialize};

use crate::grant::GrantContext;
use crate::ids::{GrantId, PaymentReference, ProjectId};

/// What is being evaluated: an indexed grant, or a URL plus its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantTarget {
    Indexed { grant_id: GrantId },
    Url { grant_url: String, context: GrantContext },
}

/// Submission envelope for `POST /evaluations`.
///
/// The wire form is flat: `grant_id`, or `grant_url` plus `grant_*` context
/// fields, followed by the optional `project_id` and `payment_reference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EvaluationRequestWire", try_from = "EvaluationRequestWire")]
pub struct EvaluationRequest {
    pub target: GrantTarget,
    pub project_id: Option<ProjectId>,
    pub payment_reference: Option<PaymentReference>,
}

impl EvaluationRequest {
    pub fn for_url(
        grant_url: impl Into<String>,
        context: GrantContext,
        project_id: Option<ProjectId>,
    ) -> Self {
        Self {
            target: GrantTarget::Url {
                grant_url: grant_url.into(),
                context: context.normalized(),
            },
            project_id,
            payment_reference: None,
        }
    }

    pub fn for_indexed(grant_id: GrantId, project_id: Option<ProjectId>) -> Self {
        Self {
            target: GrantTarget::Indexed { grant_id },
            project_id,
            payment_reference: None,
        }
    }

    pub fn with_payment_reference(mut self, reference: PaymentReference) -> Self {
        self.payment_reference = Some(reference);
        self
    }

    pub fn grant_id(&self) -> Option<GrantId> {
        match &self.target {
            GrantTarget::Indexed { grant_id } => Some(*grant_id),
            GrantTarget::Url { .. } => None,
        }
    }

    pub fn grant_url(&self) -> Option<&str> {
        match &self.target {
            GrantTarget::Url { grant_url, .. } => Some(grant_url.as_str()),
            GrantTarget::Indexed { .. } => None,
        }
    }
}

/// Grant context fields under their `grant_`-prefixed wire names, as they
/// appear in evaluation requests and evaluation responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    #[serde(rename = "grant_name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "grant_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "grant_deadline", default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(rename = "grant_decision_date", default, skip_serializing_if = "Option::is_none")]
    pub decision_date: Option<String>,
    #[serde(rename = "grant_award_amount", default, skip_serializing_if = "Option::is_none")]
    pub award_amount: Option<String>,
    #[serde(rename = "grant_award_structure", default, skip_serializing_if = "Option::is_none")]
    pub award_structure: Option<String>,
    #[serde(rename = "grant_eligibility", default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(
        rename = "grant_preferred_applicants",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_applicants: Option<String>,
    #[serde(
        rename = "grant_application_requirements",
        default,
        deserialize_with = "super::nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub application_requirements: Vec<String>,
    #[serde(
        rename = "grant_reporting_requirements",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reporting_requirements: Option<String>,
    #[serde(
        rename = "grant_restrictions",
        default,
        deserialize_with = "super::nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub restrictions: Vec<String>,
    #[serde(rename = "grant_mission", default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
}

impl From<GrantContext> for GrantSnapshot {
    fn from(context: GrantContext) -> Self {
        Self {
            name: context.name,
            description: context.description,
            deadline: context.deadline,
            decision_date: context.decision_date,
            award_amount: context.award_amount,
            award_structure: context.award_structure,
            eligibility: context.eligibility,
            preferred_applicants: context.preferred_applicants,
            application_requirements: context.application_requirements,
            reporting_requirements: context.reporting_requirements,
            restrictions: context.restrictions,
            mission: context.mission,
        }
    }
}

impl From<GrantSnapshot> for GrantContext {
    fn from(snapshot: GrantSnapshot) -> Self {
        Self {
            name: snapshot.name,
            description: snapshot.description,
            deadline: snapshot.deadline,
            decision_date: snapshot.decision_date,
            award_amount: snapshot.award_amount,
            award_structure: snapshot.award_structure,
            eligibility: snapshot.eligibility,
            preferred_applicants: snapshot.preferred_applicants,
            application_requirements: snapshot.application_requirements,
            reporting_requirements: snapshot.reporting_requirements,
            restrictions: snapshot.restrictions,
            mission: snapshot.mission,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestShapeError {
    #[error("evaluation request names neither grant_id nor grant_url")]
    MissingTarget,
    #[error("evaluation request names both grant_id and grant_url")]
    AmbiguousTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EvaluationRequestWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grant_id: Option<GrantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grant_url: Option<String>,
    #[serde(flatten)]
    grant: GrantSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_reference: Option<PaymentReference>,
}

impl From<EvaluationRequest> for EvaluationRequestWire {
    fn from(request: EvaluationRequest) -> Self {
        let (grant_id, grant_url, grant) = match request.target {
            GrantTarget::Indexed { grant_id } => (Some(grant_id), None, GrantSnapshot::default()),
            GrantTarget::Url { grant_url, context } => (None, Some(grant_url), context.into()),
        };
        Self {
            grant_id,
            grant_url,
            grant,
            project_id: request.project_id,
            payment_reference: request.payment_reference,
        }
    }
}

impl TryFrom<EvaluationRequestWire> for EvaluationRequest {
    type Error = RequestShapeError;

    fn try_from(wire: EvaluationRequestWire) -> Result<Self, Self::Error> {
        let target = match (wire.grant_id, wire.grant_url) {
            (Some(grant_id), None) => GrantTarget::Indexed { grant_id },
            (None, Some(grant_url)) => GrantTarget::Url {
                grant_url,
                context: wire.grant.into(),
            },
            (None, None) => return Err(RequestShapeError::MissingTarget),
            (Some(_), Some(_)) => return Err(RequestShapeError::AmbiguousTarget),
        };
        Ok(Self {
            target,
            project_id: wire.project_id,
            payment_reference: wire.payment_reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_request_serializes_flat_prefixed_fields() {
        let context = GrantContext {
            name: Some("G1 (edited)".to_string()),
            award_amount: Some("$50,000".to_string()),
            ..GrantContext::default()
        };
        let request = EvaluationRequest::for_url("https://example.org/g1", context, None);

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "grant_url": "https://example.org/g1",
                "grant_name": "G1 (edited)",
                "grant_award_amount": "$50,000"
            })
        );
    }

    #[test]
    fn indexed_request_with_payment_reference() {
        let request = EvaluationRequest::for_indexed(GrantId::new(42), None)
            .with_payment_reference("abc123".into());

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value, json!({"grant_id": 42, "payment_reference": "abc123"}));
    }

    #[test]
    fn deserialize_rejects_both_targets() {
        let result: Result<EvaluationRequest, _> =
            serde_json::from_value(json!({"grant_id": 1, "grant_url": "https://x.org"}));
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_missing_target() {
        let result: Result<EvaluationRequest, _> =
            serde_json::from_value(json!({"project_id": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn lists_serialize_as_arrays() {
        let context = GrantContext {
            name: Some("G".to_string()),
            restrictions: vec!["no overhead".to_string()],
            ..GrantContext::default()
        };
        let request = EvaluationRequest::for_url("https://x.org/g", context, None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["grant_restrictions"], json!(["no overhead"]));
    }
}
