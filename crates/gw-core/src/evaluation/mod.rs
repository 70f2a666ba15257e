//! Evaluation requests and server-produced evaluations.

mod model;
mod request;

pub use model::{
    AssessmentType, Evaluation, QualityIndicator, Reasoning, Recommendation, SubScores,
};
pub use request::{EvaluationRequest, GrantSnapshot, GrantTarget, RequestShapeError};

use serde::{Deserialize, Deserializer};

use crate::ids::{EvaluationId, PaymentReference};

/// Body of `POST /evaluations/refine`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct RefineEvaluationRequest {
    pub evaluation_id: EvaluationId,
    pub payment_reference: PaymentReference,
}

/// Treats an explicit JSON `null` list as empty.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
