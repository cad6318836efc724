pub mod calendar;
pub mod chores;
pub mod conversations;
pub mod expenses;
pub mod groups;
pub mod inventory;
pub mod lists;
pub mod messages;
pub mod profiles;
pub mod properties;
pub mod reviews;
pub mod stores;
pub mod users;

use crate::{
    db::{groups::GroupRepository, users::UserRepository},
    models::{Group, User},
    utils::{ApiError, ApiResult},
};
use sqlx::SqliteConnection;

/// Value of a field the request validator has already marked as required
pub(crate) fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::validation_error(format!("{field} is required")))
}

/// Turns an empty listing into a 404 carrying `message`
pub(crate) fn non_empty<T>(items: Vec<T>, message: impl Into<String>) -> ApiResult<Vec<T>> {
    if items.is_empty() {
        Err(ApiError::not_found_error(message))
    } else {
        Ok(items)
    }
}

pub(crate) async fn existing_group(conn: &mut SqliteConnection, id: i64) -> ApiResult<Group> {
    GroupRepository::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Group {id} not found")))
}

pub(crate) async fn existing_user(conn: &mut SqliteConnection, id: i64) -> ApiResult<User> {
    UserRepository::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("User {id} not found")))
}
