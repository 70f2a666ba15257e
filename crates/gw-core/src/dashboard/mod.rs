use serde::{Deserialize, Serialize};

/// Response of `GET /users/me/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub projects_count: u32,
    #[serde(default)]
    pub evaluations_count: u32,
    #[serde(default)]
    pub apply_count: u32,
    #[serde(default)]
    pub pass_count: u32,
    #[serde(default)]
    pub conditional_count: u32,
}
