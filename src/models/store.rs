use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database price-tracking record: where an item can be bought
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    pub item_id: i64,
    pub item_name: String,
    pub store: String,
    pub price: String,
    pub store_link: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreFilter {
    pub item_name: Option<String>,
    pub store: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStoreEntryRequest {
    #[validate(
        required(message = "itemName is required"),
        length(min = 1, message = "itemName is required")
    )]
    pub item_name: Option<String>,
    #[validate(
        required(message = "store is required"),
        length(min = 1, message = "store is required")
    )]
    pub store: Option<String>,
    #[validate(required(message = "price is required"))]
    pub price: Option<String>,
    #[validate(
        required(message = "storeLink is required"),
        url(message = "storeLink must be a valid URL")
    )]
    pub store_link: Option<String>,
}
