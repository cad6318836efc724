use crate::models::{Chore, ChoreFilter};
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str =
    "id, chore_name, room, assigned_to, completed, banner_image, due_date, group_id, created_at";

#[derive(Debug)]
pub struct NewChore<'a> {
    pub chore_name: &'a str,
    pub room: &'a str,
    pub group_id: i64,
    pub due_date: NaiveDateTime,
    pub assigned_to: Option<i64>,
    pub banner_image: Option<&'a str>,
}

/// Chore queries
pub struct ChoreRepository;

impl ChoreRepository {
    pub async fn insert(conn: &mut SqliteConnection, chore: &NewChore<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO chores (chore_name, room, group_id, due_date, assigned_to, banner_image)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(chore.chore_name)
        .bind(chore.room)
        .bind(chore.group_id)
        .bind(chore.due_date)
        .bind(chore.assigned_to)
        .bind(chore.banner_image)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Chore>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM chores WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Chores of a group, newest first
    pub async fn list_for_group(
        conn: &mut SqliteConnection,
        group_id: i64,
        filter: &ChoreFilter,
    ) -> Result<Vec<Chore>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM chores WHERE group_id = "));
        query.push_bind(group_id);
        if let Some(assigned_to) = filter.assigned_to {
            query.push(" AND assigned_to = ").push_bind(assigned_to);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        query.build_query_as::<Chore>().fetch_all(&mut *conn).await
    }

    pub async fn update(conn: &mut SqliteConnection, chore: &Chore) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE chores
               SET chore_name = ?, room = ?, assigned_to = ?, completed = ?, banner_image = ?,
                   due_date = ?
               WHERE id = ?"#,
        )
        .bind(&chore.chore_name)
        .bind(&chore.room)
        .bind(chore.assigned_to)
        .bind(chore.completed)
        .bind(&chore.banner_image)
        .bind(chore.due_date)
        .bind(chore.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM chores WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
