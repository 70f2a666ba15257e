//! View model of a single evaluation.
//!
//! Derivation only: nothing here mutates orchestration state or talks to the
//! server. Pending evaluations are rendered too, with a non-blocking notice.

use serde::Serialize;

use crate::evaluation::{AssessmentType, Evaluation, QualityIndicator, Recommendation};
use crate::grant::GrantContext;
use crate::project::Project;

pub const PENDING_NOTICE: &str =
    "This assessment is still being prepared. Refresh in a moment to see the final result.";

/// Readiness at or above this is a clear go.
pub const READY_THRESHOLD: f64 = 7.0;
/// Readiness at or above this (and below ready) needs a closer look.
pub const VERIFY_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub header: ViewHeader,
    pub variant: AssessmentVariant,
    pub summary: Option<String>,
    pub red_flags: Vec<String>,
    pub key_insights: Vec<String>,
    pub confidence_notes: Option<String>,
    pub pending_notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewHeader {
    pub grant_name: String,
    pub project_name: Option<String>,
    pub recommendation: Option<Recommendation>,
    pub recommendation_label: Option<&'static str>,
    /// Composite score rounded to one decimal.
    pub composite_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum AssessmentVariant {
    Free {
        readiness_score: Option<f64>,
        verdict: Option<ReadinessVerdict>,
        quality_indicators: Vec<QualityIndicator>,
    },
    Paid { dimensions: Vec<DimensionScore> },
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub key: &'static str,
    pub label: &'static str,
    pub score: Option<f64>,
    pub detail: Option<String>,
}

/// Answer to "Should You Apply?" on a free assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessVerdict {
    Ready,
    VerifyDetails,
    InsufficientData,
}

impl ReadinessVerdict {
    pub fn from_score(score: f64) -> Self {
        if score >= READY_THRESHOLD {
            ReadinessVerdict::Ready
        } else if score >= VERIFY_THRESHOLD {
            ReadinessVerdict::VerifyDetails
        } else {
            ReadinessVerdict::InsufficientData
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            ReadinessVerdict::Ready => "Ready to apply",
            ReadinessVerdict::VerifyDetails => "Verify details first",
            ReadinessVerdict::InsufficientData => "Insufficient data",
        }
    }
}

const PAID_DIMENSIONS: [(&str, &str); 5] = [
    ("mission_alignment", "Mission Alignment"),
    ("recipient_pattern_match", "Recipient Pattern Match"),
    ("funding_fit", "Funding Fit"),
    ("effort_reward", "Effort vs. Reward"),
    ("success_probability", "Success Probability"),
];

pub fn recommendation_label(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Apply => "Apply",
        Recommendation::Conditional => "Apply with conditions",
        Recommendation::Pass => "Pass",
    }
}

pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

impl AssessmentView {
    pub fn build(
        evaluation: &Evaluation,
        project: Option<&Project>,
        grant: Option<&GrantContext>,
    ) -> Self {
        let reasoning = evaluation.reasoning.clone().unwrap_or_default();

        let variant = match evaluation.effective_assessment_type() {
            AssessmentType::Free => {
                let readiness_score = evaluation.scores.readiness_score.map(round_score);
                AssessmentVariant::Free {
                    readiness_score,
                    verdict: readiness_score.map(ReadinessVerdict::from_score),
                    quality_indicators: reasoning.quality_indicators.clone(),
                }
            }
            AssessmentType::Paid => {
                let scores = &evaluation.scores;
                let values = [
                    scores.mission_alignment,
                    scores.recipient_pattern_match,
                    scores.funding_fit,
                    scores.effort_reward,
                    scores.success_probability,
                ];
                let dimensions = PAID_DIMENSIONS
                    .iter()
                    .zip(values)
                    .map(|(&(key, label), score)| DimensionScore {
                        key,
                        label,
                        score: score.map(round_score),
                        detail: reasoning.fit_details.get(key).cloned(),
                    })
                    .collect();
                AssessmentVariant::Paid { dimensions }
            }
            AssessmentType::Legacy => AssessmentVariant::Legacy,
        };

        Self {
            header: ViewHeader {
                grant_name: grant_name(evaluation, grant),
                project_name: project.map(|project| project.name.clone()),
                recommendation: evaluation.recommendation,
                recommendation_label: evaluation.recommendation.map(recommendation_label),
                composite_score: evaluation.composite_score.map(round_score),
            },
            variant,
            summary: reasoning.summary,
            red_flags: evaluation.red_flags.clone(),
            key_insights: evaluation.key_insights.clone(),
            confidence_notes: evaluation.confidence_notes.clone(),
            pending_notice: (!evaluation.is_terminal()).then_some(PENDING_NOTICE),
        }
    }
}

fn grant_name(evaluation: &Evaluation, grant: Option<&GrantContext>) -> String {
    let named = |name: &Option<String>| {
        name.as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };
    named(&evaluation.grant.name)
        .or_else(|| grant.and_then(|grant| named(&grant.name)))
        .or_else(|| evaluation.grant_url.clone())
        .or_else(|| evaluation.grant_id.map(|id| format!("Grant #{id}")))
        .unwrap_or_else(|| "Untitled grant".to_string())
}
