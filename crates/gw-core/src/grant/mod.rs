//! Grant context: the evaluable description of a grant opportunity.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::GrantId;

/// Structured description of a grant.
///
/// Every field is optional. Blank strings carry no information and are
/// dropped by [`GrantContext::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_applicants: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
}

impl GrantContext {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Trims every text field, turning blanks into `None` and dropping blank
    /// list entries.
    pub fn normalized(self) -> Self {
        Self {
            name: clean(self.name),
            description: clean(self.description),
            deadline: clean(self.deadline),
            decision_date: clean(self.decision_date),
            award_amount: clean(self.award_amount),
            award_structure: clean(self.award_structure),
            eligibility: clean(self.eligibility),
            preferred_applicants: clean(self.preferred_applicants),
            application_requirements: clean_list(self.application_requirements),
            reporting_requirements: clean(self.reporting_requirements),
            restrictions: clean_list(self.restrictions),
            mission: clean(self.mission),
        }
    }

    pub fn has_name(&self) -> bool {
        self.name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }

    /// Overlays the non-empty fields of `edits` on top of `self`.
    pub fn merged_with(self, edits: GrantContext) -> Self {
        let edits = edits.normalized();
        let base = self.normalized();
        Self {
            name: edits.name.or(base.name),
            description: edits.description.or(base.description),
            deadline: edits.deadline.or(base.deadline),
            decision_date: edits.decision_date.or(base.decision_date),
            award_amount: edits.award_amount.or(base.award_amount),
            award_structure: edits.award_structure.or(base.award_structure),
            eligibility: edits.eligibility.or(base.eligibility),
            preferred_applicants: edits.preferred_applicants.or(base.preferred_applicants),
            application_requirements: if edits.application_requirements.is_empty() {
                base.application_requirements
            } else {
                edits.application_requirements
            },
            reporting_requirements: edits.reporting_requirements.or(base.reporting_requirements),
            restrictions: if edits.restrictions.is_empty() {
                base.restrictions
            } else {
                edits.restrictions
            },
            mission: edits.mission.or(base.mission),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Splits the newline-separated text of a list form field into entries.
pub fn lines_to_list(text: &str) -> Vec<String> {
    clean_list(text.lines().map(str::to_string).collect())
}

/// Renders a list field back into its newline-separated form text.
pub fn list_to_lines(values: &[String]) -> String {
    values.join("\n")
}

/// Parses a user-supplied grant URL. Only absolute http(s) URLs are accepted.
pub fn parse_source_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// Summary row of the server-side grant index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedGrant {
    pub id: GrantId,
    pub name: String,
    #[serde(default)]
    pub funder: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub award_amount: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Body of `POST /grants/extract`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractGrantRequest {
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
