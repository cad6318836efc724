use crate::models::CalendarEvent;
use chrono::{NaiveDate, NaiveTime};
use sqlx::SqliteConnection;

const COLUMNS: &str =
    "id, title, event_date, start_time, end_time, location, description, user_id, group_id, created_at";

#[derive(Debug)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<&'a str>,
    pub description: Option<&'a str>,
    pub user_id: i64,
    pub group_id: i64,
}

/// Calendar event queries
pub struct CalendarRepository;

impl CalendarRepository {
    pub async fn insert(conn: &mut SqliteConnection, event: &NewEvent<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO calendar_events
                   (title, event_date, start_time, end_time, location, description, user_id, group_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(event.title)
        .bind(event.event_date)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.location)
        .bind(event.description)
        .bind(event.user_id)
        .bind(event.group_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<CalendarEvent>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM calendar_events WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list_for_group(
        conn: &mut SqliteConnection,
        group_id: i64,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM calendar_events WHERE group_id = ? ORDER BY event_date, start_time, id"
        ))
        .bind(group_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Events of a group dated within `[from, until]`
    pub async fn list_between(
        conn: &mut SqliteConnection,
        group_id: i64,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"SELECT {COLUMNS} FROM calendar_events
               WHERE group_id = ? AND event_date >= ? AND event_date <= ?
               ORDER BY event_date, start_time, id"#
        ))
        .bind(group_id)
        .bind(from)
        .bind(until)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn update(conn: &mut SqliteConnection, event: &CalendarEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE calendar_events
               SET title = ?, event_date = ?, start_time = ?, end_time = ?, location = ?,
                   description = ?
               WHERE id = ?"#,
        )
        .bind(&event.title)
        .bind(event.event_date)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM calendar_events WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
