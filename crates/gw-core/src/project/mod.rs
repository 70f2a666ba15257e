//! User-owned project profile.

use serde::{Deserialize, Serialize};

use crate::ids::ProjectId;

/// Maximum number of words accepted in a project description.
pub const MAX_DESCRIPTION_WORDS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Idea,
    Prototype,
    EarlyRevenue,
    Growth,
    Established,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Moderate,
    High,
    Critical,
}

/// Funding need, either free text or an amount in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FundingNeed {
    Amount { amount_minor: i64, currency: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stage: Option<ProjectStage>,
    #[serde(default)]
    pub funding_need: Option<FundingNeed>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub organization_country: Option<String>,
    #[serde(default)]
    pub organization_type: Option<String>,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<ProjectStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_need: Option<FundingNeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error("project name is required")]
    NameMissing,
    #[error("description has {words} words; at most {max} are allowed")]
    DescriptionTooLong { words: usize, max: usize },
}

impl NewProject {
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.name.trim().is_empty() {
            return Err(ProjectError::NameMissing);
        }
        if let Some(description) = &self.description {
            let words = word_count(description);
            if words > MAX_DESCRIPTION_WORDS {
                return Err(ProjectError::DescriptionTooLong {
                    words,
                    max: MAX_DESCRIPTION_WORDS,
                });
            }
        }
        Ok(())
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_project(description: &str) -> NewProject {
        NewProject {
            name: "Clinic".to_string(),
            description: Some(description.to_string()),
            stage: Some(ProjectStage::Growth),
            funding_need: None,
            urgency: Some(Urgency::High),
            organization_country: Some("KE".to_string()),
            organization_type: None,
        }
    }

    #[test]
    fn validate_accepts_fifty_words() {
        let description = vec!["word"; 50].join(" ");
        assert!(new_project(&description).validate().is_ok());
    }

    #[test]
    fn validate_rejects_fifty_one_words() {
        let description = vec!["word"; 51].join(" ");
        assert_eq!(
            new_project(&description).validate(),
            Err(ProjectError::DescriptionTooLong { words: 51, max: 50 })
        );
    }

    #[test]
    fn funding_need_accepts_text_or_amount() {
        let text: FundingNeed = serde_json::from_str("\"about 20k\"").unwrap();
        assert_eq!(text, FundingNeed::Text("about 20k".to_string()));

        let amount: FundingNeed =
            serde_json::from_str(r#"{"amount_minor": 2000000, "currency": "USD"}"#).unwrap();
        assert_eq!(
            amount,
            FundingNeed::Amount {
                amount_minor: 2_000_000,
                currency: "USD".to_string()
            }
        );
    }

    #[test]
    fn unknown_stage_is_preserved_as_other() {
        let stage: ProjectStage = serde_json::from_str("\"scale_up\"").unwrap();
        assert_eq!(stage, ProjectStage::Other);
    }
}
