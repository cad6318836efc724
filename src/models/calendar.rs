use crate::{
    models::UserContact,
    utils::validation::{date_format, time_format},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database calendar event record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub user_id: i64,
    pub group_id: i64,
    pub created_at: NaiveDateTime,
}

/// Event with its creator's contact card
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: CalendarEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserContact>,
}

/// Event creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEventRequest {
    #[validate(
        required(message = "Title is required."),
        length(min = 1, message = "Title is required.")
    )]
    pub title: Option<String>,
    #[validate(required(message = "Event date is required."), custom(function = "date_format"))]
    pub event_date: Option<String>,
    #[validate(custom(function = "time_format"))]
    pub start_time: Option<String>,
    #[validate(custom(function = "time_format"))]
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[validate(required(message = "User ID is required."))]
    pub user_id: Option<i64>,
    #[validate(required(message = "Group ID is required."))]
    pub group_id: Option<i64>,
}

/// Event update; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "date_format"))]
    pub event_date: Option<String>,
    #[validate(custom(function = "time_format"))]
    pub start_time: Option<String>,
    #[validate(custom(function = "time_format"))]
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_title_date_user_and_group_all_reported() {
        let errors = CreateEventRequest::default().validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);
    }

    #[test]
    fn malformed_times_are_rejected() {
        let request = UpdateEventRequest {
            start_time: Some("quarter past".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
