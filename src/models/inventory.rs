use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Items at or below this quantity count as running low
pub const LOW_STOCK_THRESHOLD: i64 = 1;

/// Database inventory record; names are stored lower-cased
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    pub group_id: i64,
    pub created_at: NaiveDateTime,
}

impl InventoryItem {
    /// Quantity left after taking `amount` away, never below zero
    pub fn quantity_after_removing(&self, amount: i64) -> i64 {
        (self.quantity - amount).max(0)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInventoryRequest {
    #[validate(
        required(message = "itemName is required"),
        length(min = 1, message = "itemName is required")
    )]
    pub item_name: Option<String>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemRequest {
    #[validate(required(message = "itemId is required"))]
    pub item_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveQuantityRequest {
    #[validate(required(message = "itemId is required"))]
    pub item_id: Option<i64>,
    /// Defaults to one
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64) -> InventoryItem {
        InventoryItem {
            item_id: 1,
            item_name: "milk".into(),
            quantity,
            group_id: 1,
            created_at: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn removal_clamps_at_zero() {
        assert_eq!(item(3).quantity_after_removing(1), 2);
        assert_eq!(item(3).quantity_after_removing(3), 0);
        assert_eq!(item(2).quantity_after_removing(10), 0);
    }

    #[test]
    fn removal_of_zero_or_less_is_invalid() {
        let request = RemoveQuantityRequest {
            item_id: Some(1),
            quantity: Some(0),
        };
        assert!(request.validate().is_err());
    }
}
