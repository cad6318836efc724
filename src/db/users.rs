use crate::models::{NewUser, User, UserFilter};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str =
    "id, first_name, last_name, username, email, password, role, verified, created_at, updated_at";

/// User account queries
pub struct UserRepository;

impl UserRepository {
    /// Insert a user and return its id
    pub async fn insert(conn: &mut SqliteConnection, user: &NewUser<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO users (first_name, last_name, username, email, password, role)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Users matching every supplied filter
    pub async fn search(conn: &mut SqliteConnection, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM users WHERE 1 = 1"));

        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id);
        }
        if let Some(first_name) = &filter.first_name {
            query.push(" AND first_name = ").push_bind(first_name.clone());
        }
        if let Some(last_name) = &filter.last_name {
            query.push(" AND last_name = ").push_bind(last_name.clone());
        }
        if let Some(username) = &filter.username {
            query.push(" AND username = ").push_bind(username.clone());
        }
        if let Some(role) = filter.role {
            query.push(" AND role = ").push_bind(role);
        }
        if let Some(verified) = filter.verified {
            query.push(" AND verified = ").push_bind(verified);
        }
        query.push(" ORDER BY id");

        query.build_query_as::<User>().fetch_all(&mut *conn).await
    }

    /// Returns whether a row was updated
    pub async fn mark_verified(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET verified = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }
}
