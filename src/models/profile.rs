use crate::utils::validation::time_format;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Self-reported level for a living habit; empty when not answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Intensity {
    #[default]
    #[serde(rename = "")]
    #[sqlx(rename = "")]
    Unset,
    Low,
    Medium,
    High,
}

/// Database living-preferences record, one per user per group
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub cleaning_habits: Intensity,
    pub noise_level: Intensity,
    pub sleep_start: Option<String>,
    pub sleep_end: Option<String>,
    pub allergies: Option<String>,
    pub user_id: i64,
    pub group_id: i64,
}

/// Profile upsert; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub cleaning_habits: Option<Intensity>,
    pub noise_level: Option<Intensity>,
    #[validate(custom(function = "time_format"))]
    pub sleep_start: Option<String>,
    #[validate(custom(function = "time_format"))]
    pub sleep_end: Option<String>,
    pub allergies: Option<String>,
}
