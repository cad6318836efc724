use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database shopping list record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub list_id: i64,
    pub user_id: i64,
    pub list_name: String,
    pub group_id: i64,
    pub created_at: NaiveDateTime,
}

/// Database list item record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub item_id: i64,
    pub list_id: i64,
    pub item: String,
    pub assigned_to: Option<String>,
    pub purchased: bool,
    pub created_at: NaiveDateTime,
}

/// Acknowledgement payload for deletions
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFilter {
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemFilter {
    pub list_id: Option<i64>,
    pub assigned_to: Option<String>,
    pub purchased: Option<bool>,
}

/// List creation request; the owner defaults to the caller
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateListRequest {
    pub user_id: Option<i64>,
    #[validate(
        required(message = "listName is required"),
        length(min = 1, message = "listName is required")
    )]
    pub list_name: Option<String>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ListIdRequest {
    #[validate(required(message = "listId is required"))]
    pub list_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateItemRequest {
    #[validate(required(message = "listId is required"))]
    pub list_id: Option<i64>,
    #[validate(
        required(message = "item is required"),
        length(min = 1, message = "item is required")
    )]
    pub item: Option<String>,
    pub assigned_to: Option<String>,
}

/// Item update; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateItemRequest {
    #[validate(required(message = "itemId is required"))]
    pub item_id: Option<i64>,
    #[validate(length(min = 1, message = "item cannot be empty"))]
    pub item: Option<String>,
    pub assigned_to: Option<String>,
    pub purchased: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemIdRequest {
    #[validate(required(message = "itemId is required"))]
    pub item_id: Option<i64>,
}
