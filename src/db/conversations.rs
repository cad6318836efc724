use crate::models::{Conversation, ConversationKind, Participant, ParticipantRole};
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, group_id, kind, name, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str = "id, conversation_id, user_id, role, created_at, updated_at";

/// Conversation and participant queries
pub struct ConversationRepository;

impl ConversationRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        group_id: i64,
        kind: ConversationKind,
        name: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO conversations (group_id, kind, name) VALUES (?, ?, ?)")
            .bind(group_id)
            .bind(kind)
            .bind(name)
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM conversations WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Conversations of a group that `user_id` takes part in
    pub async fn list_for_member(
        conn: &mut SqliteConnection,
        group_id: i64,
        user_id: i64,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT c.id, c.group_id, c.kind, c.name, c.created_at, c.updated_at
               FROM conversations c
               JOIN participants p ON p.conversation_id = c.id
               WHERE c.group_id = ? AND p.user_id = ?
               ORDER BY c.id"#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Existing direct conversation between two users within a group
    pub async fn find_dm(
        conn: &mut SqliteConnection,
        group_id: i64,
        first: i64,
        second: i64,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT c.id, c.group_id, c.kind, c.name, c.created_at, c.updated_at
               FROM conversations c
               WHERE c.group_id = ? AND c.kind = 'dm'
                 AND EXISTS (SELECT 1 FROM participants p WHERE p.conversation_id = c.id AND p.user_id = ?)
                 AND EXISTS (SELECT 1 FROM participants p WHERE p.conversation_id = c.id AND p.user_id = ?)
               LIMIT 1"#,
        )
        .bind(group_id)
        .bind(first)
        .bind(second)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn add_participant(
        conn: &mut SqliteConnection,
        conversation_id: i64,
        user_id: i64,
        role: ParticipantRole,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO participants (conversation_id, user_id, role) VALUES (?, ?, ?)")
                .bind(conversation_id)
                .bind(user_id)
                .bind(role)
                .execute(&mut *conn)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_participant(
        conn: &mut SqliteConnection,
        conversation_id: i64,
        user_id: i64,
    ) -> Result<Option<Participant>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE conversation_id = ? AND user_id = ?"
        ))
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn participants(
        conn: &mut SqliteConnection,
        conversation_id: i64,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE conversation_id = ? ORDER BY id"
        ))
        .bind(conversation_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn remove_participant(conn: &mut SqliteConnection, participant_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM participants WHERE id = ?")
            .bind(participant_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}
