use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// What a review is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReviewType {
    User,
    Property,
}

/// Database review record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: i64,
    pub review_type: ReviewType,
    pub reviewed_item_id: i64,
    pub reviewer_id: i64,
    pub score: i64,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewFilter {
    pub review_type: Option<ReviewType>,
    pub reviewed_item_id: Option<i64>,
    pub reviewer_id: Option<i64>,
}

/// Review creation request; the reviewer is always the caller
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReviewRequest {
    #[validate(required(message = "reviewType is required"))]
    pub review_type: Option<ReviewType>,
    #[validate(required(message = "reviewedItemId is required"))]
    pub reviewed_item_id: Option<i64>,
    #[validate(
        required(message = "score is required"),
        range(min = 1, max = 5, message = "score must be between 1 and 5")
    )]
    pub score: Option<i64>,
    pub description: Option<String>,
}
