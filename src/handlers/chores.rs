use crate::{
    db::{
        chores::{ChoreRepository, NewChore},
        users::UserRepository,
    },
    handlers::{existing_group, existing_user, required},
    models::{Chore, ChoreFilter, ChoreView, CreateChoreRequest, UpdateChoreRequest, UserContact},
    state::AppState,
    utils::{
        db_error, validate_request, validation::parse_datetime, ApiError, ApiJson, ApiPath, ApiQuery,
        ApiResult, Empty, Envelope,
    },
};
use axum::extract::State;
use chrono::NaiveDateTime;
use sqlx::SqliteConnection;

fn due_date(value: &str) -> ApiResult<NaiveDateTime> {
    parse_datetime(value).ok_or_else(|| {
        ApiError::validation_error("Invalid due date").with_error(format!("Unrecognised date: {value}"))
    })
}

async fn view(conn: &mut SqliteConnection, chore: Chore) -> ApiResult<ChoreView> {
    let assignee = match chore.assigned_to {
        Some(user_id) => UserRepository::find_by_id(conn, user_id).await?,
        None => None,
    };
    Ok(ChoreView {
        chore,
        assignee: assignee.as_ref().map(UserContact::from),
    })
}

/// Chores of a group, newest first; an empty list is still a success
pub async fn list_chores(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<ChoreFilter>,
) -> ApiResult<Envelope<Vec<ChoreView>>> {
    let mut conn = state.db.acquire().await?;
    let chores = ChoreRepository::list_for_group(&mut conn, group_id, &filter)
        .await
        .map_err(db_error("Unable to list chores"))?;

    let mut views = Vec::with_capacity(chores.len());
    for chore in chores {
        views.push(view(&mut conn, chore).await?);
    }

    let message = if views.is_empty() {
        "No chores found".to_string()
    } else {
        format!("{} chore(s) found", views.len())
    };
    Ok(Envelope::ok(message, views))
}

pub async fn get_chore(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<ChoreView>>> {
    let mut conn = state.db.acquire().await?;
    let chore = ChoreRepository::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("No chore found with ID: {id}")))?;

    Ok(Envelope::ok("Chore found", vec![view(&mut conn, chore).await?]))
}

pub async fn create_chore(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateChoreRequest>,
) -> ApiResult<Envelope<Vec<ChoreView>>> {
    validate_request(&request, "Unable to create chore due to validation error(s)")?;
    let chore_name = required(request.chore_name, "Chore name")?;
    let room = required(request.room, "Room")?;
    let group_id = required(request.group_id, "groupId")?;
    let due = due_date(&required(request.due_date, "Due date")?)?;

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;
    if let Some(user_id) = request.assigned_to {
        existing_user(&mut tx, user_id).await?;
    }

    let id = ChoreRepository::insert(
        &mut tx,
        &NewChore {
            chore_name: &chore_name,
            room: &room,
            group_id,
            due_date: due,
            assigned_to: request.assigned_to,
            banner_image: request.banner_image.as_deref(),
        },
    )
    .await
    .map_err(db_error("Unable to create chore"))?;

    let chore = ChoreRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create chore"))?;
    let created = view(&mut tx, chore).await?;
    tx.commit().await.map_err(db_error("Unable to create chore"))?;

    Ok(Envelope::created("Chore added successfully", vec![created]))
}

pub async fn update_chore(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateChoreRequest>,
) -> ApiResult<Envelope<Vec<ChoreView>>> {
    validate_request(&request, "Unable to update chore due to validation error(s)")?;

    let mut tx = state.db.begin().await?;
    let mut chore = ChoreRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("No chore found with ID: {id}")))?;

    if let Some(name) = request.chore_name {
        chore.chore_name = name;
    }
    if let Some(room) = request.room {
        chore.room = room;
    }
    if let Some(user_id) = request.assigned_to {
        existing_user(&mut tx, user_id).await?;
        chore.assigned_to = Some(user_id);
    }
    if let Some(completed) = request.completed {
        chore.completed = completed;
    }
    if let Some(banner) = request.banner_image {
        chore.banner_image = Some(banner);
    }
    if let Some(value) = request.due_date {
        chore.due_date = due_date(&value)?;
    }

    ChoreRepository::update(&mut tx, &chore)
        .await
        .map_err(db_error("Unable to update chore"))?;
    let updated = view(&mut tx, chore).await?;
    tx.commit().await.map_err(db_error("Unable to update chore"))?;

    Ok(Envelope::ok("Chore updated successfully", vec![updated]))
}

pub async fn delete_chore(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Empty> {
    let mut tx = state.db.begin().await?;
    ChoreRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("No chore found with ID: {id}")))?;
    ChoreRepository::delete(&mut tx, id)
        .await
        .map_err(db_error("Unable to delete chore"))?;
    tx.commit().await.map_err(db_error("Unable to delete chore"))?;

    Ok(Empty::done("Chore deleted successfully"))
}
