use crate::{models::UserContact, utils::validation::datetime_format};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database chore record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    pub id: i64,
    pub chore_name: String,
    pub room: String,
    pub assigned_to: Option<i64>,
    pub completed: bool,
    pub banner_image: Option<String>,
    pub due_date: NaiveDateTime,
    pub group_id: i64,
    pub created_at: NaiveDateTime,
}

/// Chore with its assignee's contact card
#[derive(Debug, Serialize)]
pub struct ChoreView {
    #[serde(flatten)]
    pub chore: Chore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserContact>,
}

/// Chore listing filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoreFilter {
    pub assigned_to: Option<i64>,
}

/// Chore creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateChoreRequest {
    #[validate(
        required(message = "Chore name is required"),
        length(min = 1, message = "Chore name cannot be empty")
    )]
    pub chore_name: Option<String>,
    #[validate(
        required(message = "Room is required"),
        length(min = 1, message = "Room cannot be empty")
    )]
    pub room: Option<String>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
    #[validate(required(message = "Due date is required"), custom(function = "datetime_format"))]
    pub due_date: Option<String>,
    pub assigned_to: Option<i64>,
    pub banner_image: Option<String>,
}

/// Chore update; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateChoreRequest {
    #[validate(length(min = 1, message = "Chore name cannot be empty"))]
    pub chore_name: Option<String>,
    #[validate(length(min = 1, message = "Room cannot be empty"))]
    pub room: Option<String>,
    pub assigned_to: Option<i64>,
    pub completed: Option<bool>,
    pub banner_image: Option<String>,
    #[validate(custom(function = "datetime_format"))]
    pub due_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_reports_all_missing_fields() {
        let request = CreateChoreRequest {
            chore_name: Some(String::new()),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
    }

    #[test]
    fn bad_due_date_is_rejected() {
        let request = UpdateChoreRequest {
            due_date: Some("someday".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
