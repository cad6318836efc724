use crate::models::{Group, User};
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, name, landlord_id, property_id, created_at, updated_at";

/// Household group and membership queries
pub struct GroupRepository;

impl GroupRepository {
    pub async fn insert(
        conn: &mut SqliteConnection,
        name: &str,
        landlord_id: i64,
        property_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO house_groups (name, landlord_id, property_id) VALUES (?, ?, ?)")
                .bind(name)
                .bind(landlord_id)
                .bind(property_id)
                .execute(&mut *conn)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM house_groups WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Group `id` if `landlord_id` owns it
    pub async fn find_owned(
        conn: &mut SqliteConnection,
        id: i64,
        landlord_id: i64,
    ) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM house_groups WHERE id = ? AND landlord_id = ?"
        ))
        .bind(id)
        .bind(landlord_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn list_by_landlord(
        conn: &mut SqliteConnection,
        landlord_id: i64,
    ) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM house_groups WHERE landlord_id = ? ORDER BY id"
        ))
        .bind(landlord_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Groups the tenant participates in
    pub async fn list_for_tenant(
        conn: &mut SqliteConnection,
        tenant_id: i64,
    ) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT g.id, g.name, g.landlord_id, g.property_id, g.created_at, g.updated_at
               FROM house_groups g
               JOIN group_participants gp ON gp.group_id = g.id
               WHERE gp.tenant_id = ?
               ORDER BY g.id"#,
        )
        .bind(tenant_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn add_participant(
        conn: &mut SqliteConnection,
        group_id: i64,
        tenant_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO group_participants (group_id, tenant_id) VALUES (?, ?)")
            .bind(group_id)
            .bind(tenant_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Tenants of a group, in joining order
    pub async fn participants(conn: &mut SqliteConnection, group_id: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT u.id, u.first_name, u.last_name, u.username, u.email, u.password, u.role,
                      u.verified, u.created_at, u.updated_at
               FROM users u
               JOIN group_participants gp ON gp.tenant_id = u.id
               WHERE gp.group_id = ?
               ORDER BY gp.id"#,
        )
        .bind(group_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Whether the user is the group's landlord or one of its tenants
    pub async fn is_member(conn: &mut SqliteConnection, group_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"SELECT g.id FROM house_groups g
               WHERE g.id = ?
                 AND (g.landlord_id = ?
                      OR EXISTS (SELECT 1 FROM group_participants gp
                                 WHERE gp.group_id = g.id AND gp.tenant_id = ?))"#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.is_some())
    }

    pub async fn rename(conn: &mut SqliteConnection, id: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE house_groups SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Deletes the group; dependent rows go with it through foreign-key cascades
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM house_groups WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
