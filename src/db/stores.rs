use crate::models::{StoreEntry, StoreFilter};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str = "item_id, item_name, store, price, store_link";

/// Store price entry queries
pub struct StoreRepository;

impl StoreRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        item_name: &str,
        store: &str,
        price: &str,
        store_link: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO store_entries (item_name, store, price, store_link) VALUES (?, ?, ?, ?)",
        )
        .bind(item_name)
        .bind(store)
        .bind(price)
        .bind(store_link)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, item_id: i64) -> Result<Option<StoreEntry>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM store_entries WHERE item_id = ?"))
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn search(conn: &mut SqliteConnection, filter: &StoreFilter) -> Result<Vec<StoreEntry>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM store_entries WHERE 1 = 1"));
        if let Some(item_name) = &filter.item_name {
            query.push(" AND item_name = ").push_bind(item_name.clone());
        }
        if let Some(store) = &filter.store {
            query.push(" AND store = ").push_bind(store.clone());
        }
        query.push(" ORDER BY item_id");

        query.build_query_as::<StoreEntry>().fetch_all(&mut *conn).await
    }
}
