use crate::models::{InventoryItem, LOW_STOCK_THRESHOLD};
use sqlx::SqliteConnection;

const COLUMNS: &str = "item_id, item_name, quantity, group_id, created_at";

/// Household inventory queries
pub struct InventoryRepository;

impl InventoryRepository {
    pub async fn find_by_id(conn: &mut SqliteConnection, item_id: i64) -> Result<Option<InventoryItem>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM inventory WHERE item_id = ?"))
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Looks an item up by its lower-cased name
    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        group_id: i64,
        item_name: &str,
    ) -> Result<Option<InventoryItem>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM inventory WHERE group_id = ? AND item_name = ?"
        ))
        .bind(group_id)
        .bind(item_name)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Adds a new item with a quantity of one
    pub async fn insert(conn: &mut SqliteConnection, group_id: i64, item_name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO inventory (item_name, quantity, group_id) VALUES (?, 1, ?)")
            .bind(item_name)
            .bind(group_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn set_quantity(conn: &mut SqliteConnection, item_id: i64, quantity: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE inventory SET quantity = ? WHERE item_id = ?")
            .bind(quantity)
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn list_for_group(
        conn: &mut SqliteConnection,
        group_id: i64,
    ) -> Result<Vec<InventoryItem>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM inventory WHERE group_id = ? ORDER BY item_name"
        ))
        .bind(group_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Items at or below the low-stock threshold
    pub async fn low_stock(conn: &mut SqliteConnection, group_id: i64) -> Result<Vec<InventoryItem>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM inventory WHERE group_id = ? AND quantity <= ? ORDER BY item_name"
        ))
        .bind(group_id)
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn delete(conn: &mut SqliteConnection, item_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM inventory WHERE item_id = ?")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
