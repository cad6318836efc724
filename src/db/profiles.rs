use crate::models::Profile;
use sqlx::SqliteConnection;

const COLUMNS: &str =
    "id, cleaning_habits, noise_level, sleep_start, sleep_end, allergies, user_id, group_id";

/// Living-preference profile queries
pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn find(
        conn: &mut SqliteConnection,
        user_id: i64,
        group_id: i64,
    ) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE user_id = ? AND group_id = ?"
        ))
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Inserts or replaces the profile for its user and group
    pub async fn upsert(conn: &mut SqliteConnection, profile: &Profile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO profiles
                   (cleaning_habits, noise_level, sleep_start, sleep_end, allergies, user_id, group_id)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (user_id, group_id) DO UPDATE SET
                   cleaning_habits = excluded.cleaning_habits,
                   noise_level = excluded.noise_level,
                   sleep_start = excluded.sleep_start,
                   sleep_end = excluded.sleep_end,
                   allergies = excluded.allergies"#,
        )
        .bind(profile.cleaning_habits)
        .bind(profile.noise_level)
        .bind(&profile.sleep_start)
        .bind(&profile.sleep_end)
        .bind(&profile.allergies)
        .bind(profile.user_id)
        .bind(profile.group_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
