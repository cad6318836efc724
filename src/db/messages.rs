use crate::models::Message;
use sqlx::{types::Json, SqliteConnection};

const COLUMNS: &str = "id, conversation_id, sender_id, content, read_by, created_at, updated_at";

/// Chat message queries
pub struct MessageRepository;

impl MessageRepository {
    /// Stores a message already read by its sender
    pub async fn insert(
        conn: &mut SqliteConnection,
        conversation_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, content, read_by) VALUES (?, ?, ?, ?)",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(Json(vec![sender_id]))
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Message>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM messages WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Messages of a conversation, oldest first
    pub async fn list_for_conversation(
        conn: &mut SqliteConnection,
        conversation_id: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM messages WHERE conversation_id = ? ORDER BY created_at, id"
        ))
        .bind(conversation_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn set_read_by(conn: &mut SqliteConnection, id: i64, read_by: &[i64]) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE messages SET read_by = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(Json(read_by))
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
