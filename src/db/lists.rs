use crate::models::{ItemFilter, ListItem, ShoppingList};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const LIST_COLUMNS: &str = "list_id, user_id, list_name, group_id, created_at";
const ITEM_COLUMNS: &str = "item_id, list_id, item, assigned_to, purchased, created_at";

/// Shopping list and list item queries
pub struct ListRepository;

impl ListRepository {
    pub async fn insert_list(
        conn: &mut SqliteConnection,
        user_id: i64,
        list_name: &str,
        group_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO shopping_lists (user_id, list_name, group_id) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(list_name)
                .bind(group_id)
                .execute(&mut *conn)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_list(conn: &mut SqliteConnection, list_id: i64) -> Result<Option<ShoppingList>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {LIST_COLUMNS} FROM shopping_lists WHERE list_id = ?"))
            .bind(list_id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn lists_for_group(
        conn: &mut SqliteConnection,
        group_id: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<ShoppingList>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE group_id = "
        ));
        query.push_bind(group_id);
        if let Some(user_id) = user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        query.push(" ORDER BY list_id");

        query.build_query_as::<ShoppingList>().fetch_all(&mut *conn).await
    }

    /// Deletes a list and every item on it
    pub async fn delete_list(conn: &mut SqliteConnection, list_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM list_items WHERE list_id = ?")
            .bind(list_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM shopping_lists WHERE list_id = ?")
            .bind(list_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn insert_item(
        conn: &mut SqliteConnection,
        list_id: i64,
        item: &str,
        assigned_to: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO list_items (list_id, item, assigned_to) VALUES (?, ?, ?)")
            .bind(list_id)
            .bind(item)
            .bind(assigned_to)
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_item(conn: &mut SqliteConnection, item_id: i64) -> Result<Option<ListItem>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE item_id = ?"))
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Item with the same name already on the list
    pub async fn find_item_by_name(
        conn: &mut SqliteConnection,
        list_id: i64,
        item: &str,
    ) -> Result<Option<ListItem>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = ? AND item = ?"
        ))
        .bind(list_id)
        .bind(item)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn search_items(
        conn: &mut SqliteConnection,
        filter: &ItemFilter,
    ) -> Result<Vec<ListItem>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE 1 = 1"));
        if let Some(list_id) = filter.list_id {
            query.push(" AND list_id = ").push_bind(list_id);
        }
        if let Some(assigned_to) = &filter.assigned_to {
            query.push(" AND assigned_to = ").push_bind(assigned_to.clone());
        }
        if let Some(purchased) = filter.purchased {
            query.push(" AND purchased = ").push_bind(purchased);
        }
        query.push(" ORDER BY item_id");

        query.build_query_as::<ListItem>().fetch_all(&mut *conn).await
    }

    pub async fn update_item(conn: &mut SqliteConnection, item: &ListItem) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE list_items SET item = ?, assigned_to = ?, purchased = ? WHERE item_id = ?")
            .bind(&item.item)
            .bind(&item.assigned_to)
            .bind(item.purchased)
            .bind(item.item_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn delete_item(conn: &mut SqliteConnection, item_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM list_items WHERE item_id = ?")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
