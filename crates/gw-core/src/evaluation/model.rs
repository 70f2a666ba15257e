use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::request::GrantSnapshot;
use crate::grant::GrantContext;
use crate::ids::{EvaluationId, GrantId, ProjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Apply,
    Conditional,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Free,
    Paid,
    Legacy,
}

/// Numeric sub-scores on the 0-10 scale.
///
/// `readiness_score` belongs to the free tier; the other five are the
/// project-aware dimensions of a paid assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_alignment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_pattern_match: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_fit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_reward: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_probability: Option<f64>,
}

impl SubScores {
    pub fn has_paid_dimensions(&self) -> bool {
        self.mission_alignment.is_some()
            || self.recipient_pattern_match.is_some()
            || self.funding_fit.is_some()
            || self.effort_reward.is_some()
            || self.success_probability.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIndicator {
    pub label: String,
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// Structured reasoning payload.
///
/// Free assessments fill `quality_indicators`; paid assessments fill
/// `fit_details` keyed by dimension name. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "super::nullable_vec")]
    pub quality_indicators: Vec<QualityIndicator>,
    #[serde(default)]
    pub fit_details: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Server-produced assessment of a (project, grant) pair.
///
/// An evaluation is terminal once `composite_score` is numeric; until then it
/// is pending and must be polled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub grant_id: Option<GrantId>,
    #[serde(default)]
    pub grant_url: Option<String>,
    #[serde(flatten)]
    pub grant: GrantSnapshot,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub assessment_type: Option<AssessmentType>,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub composite_score: Option<f64>,
    #[serde(flatten)]
    pub scores: SubScores,
    #[serde(default)]
    pub reasoning: Option<Reasoning>,
    #[serde(default, deserialize_with = "super::nullable_vec")]
    pub red_flags: Vec<String>,
    #[serde(default, deserialize_with = "super::nullable_vec")]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub confidence_notes: Option<String>,
}

impl Evaluation {
    pub fn is_terminal(&self) -> bool {
        self.composite_score.is_some()
    }

    /// The declared assessment type, or one inferred from the populated
    /// scores for records created before the server sent it.
    pub fn effective_assessment_type(&self) -> AssessmentType {
        if let Some(kind) = self.assessment_type {
            return kind;
        }
        if self.scores.has_paid_dimensions() {
            AssessmentType::Paid
        } else if self.scores.readiness_score.is_some() {
            AssessmentType::Free
        } else {
            AssessmentType::Legacy
        }
    }

    pub fn grant_context(&self) -> GrantContext {
        self.grant.clone().into()
    }
}

/// Accepts RFC 3339 timestamps as well as naive ones, which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
