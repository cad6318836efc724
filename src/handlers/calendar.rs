use crate::{
    db::{
        calendar::{CalendarRepository, NewEvent},
        users::UserRepository,
    },
    handlers::{existing_group, existing_user, non_empty, required},
    models::{CalendarEvent, CreateEventRequest, EventView, UpdateEventRequest, UserContact},
    state::AppState,
    utils::{
        db_error, validate_request,
        validation::{parse_date, parse_time},
        ApiError, ApiJson, ApiPath, ApiResult, Empty, Envelope,
    },
};
use axum::extract::State;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqliteConnection;

/// How far ahead the upcoming-events view looks
const UPCOMING_WINDOW_HOURS: i64 = 48;

fn date(value: &str) -> ApiResult<NaiveDate> {
    parse_date(value)
        .ok_or_else(|| ApiError::validation_error("Invalid event date").with_error(format!("Unrecognised date: {value}")))
}

fn time(value: Option<&str>) -> ApiResult<Option<NaiveTime>> {
    value
        .map(|value| {
            parse_time(value).ok_or_else(|| {
                ApiError::validation_error("Invalid event time").with_error(format!("Unrecognised time: {value}"))
            })
        })
        .transpose()
}

fn not_found(id: i64) -> ApiError {
    ApiError::not_found_error(format!("Event with id {id} not found"))
}

async fn views(conn: &mut SqliteConnection, events: Vec<CalendarEvent>) -> ApiResult<Vec<EventView>> {
    let mut views = Vec::with_capacity(events.len());
    for event in events {
        let user = UserRepository::find_by_id(&mut *conn, event.user_id).await?;
        views.push(EventView {
            event,
            user: user.as_ref().map(UserContact::from),
        });
    }
    Ok(views)
}

pub async fn list_events(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<EventView>>> {
    let mut conn = state.db.acquire().await?;
    let events = CalendarRepository::list_for_group(&mut conn, group_id)
        .await
        .map_err(db_error("Unable to list events"))?;
    let events = non_empty(events, format!("No events found for group {group_id}"))?;
    let views = views(&mut conn, events).await?;

    Ok(Envelope::ok(format!("{} event(s) found", views.len()), views))
}

/// Events dated from today through the next two days
pub async fn upcoming_events(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<EventView>>> {
    let now = Utc::now();
    let from = now.date_naive();
    let until = (now + Duration::hours(UPCOMING_WINDOW_HOURS)).date_naive();

    let mut conn = state.db.acquire().await?;
    let events = CalendarRepository::list_between(&mut conn, group_id, from, until)
        .await
        .map_err(db_error("Unable to list events"))?;
    let views = views(&mut conn, events).await?;

    Ok(Envelope::ok(format!("{} upcoming event(s) found", views.len()), views))
}

pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<EventView>>> {
    let mut conn = state.db.acquire().await?;
    let event = CalendarRepository::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Envelope::ok("Event found", views(&mut conn, vec![event]).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateEventRequest>,
) -> ApiResult<Envelope<Vec<EventView>>> {
    validate_request(&request, "Unable to create event due to validation error(s)")?;
    let title = required(request.title, "Title")?;
    let event_date = date(&required(request.event_date, "Event date")?)?;
    let start_time = time(request.start_time.as_deref())?;
    let end_time = time(request.end_time.as_deref())?;
    let user_id = required(request.user_id, "User ID")?;
    let group_id = required(request.group_id, "Group ID")?;

    let mut tx = state.db.begin().await?;
    existing_user(&mut tx, user_id).await?;
    existing_group(&mut tx, group_id).await?;

    let id = CalendarRepository::insert(
        &mut tx,
        &NewEvent {
            title: &title,
            event_date,
            start_time,
            end_time,
            location: request.location.as_deref(),
            description: request.description.as_deref(),
            user_id,
            group_id,
        },
    )
    .await
    .map_err(db_error("Unable to create event"))?;

    let event = CalendarRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create event"))?;
    let created = views(&mut tx, vec![event]).await?;
    tx.commit().await.map_err(db_error("Unable to create event"))?;

    Ok(Envelope::created("Event created successfully", created))
}

pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateEventRequest>,
) -> ApiResult<Envelope<Vec<EventView>>> {
    validate_request(&request, "Unable to update event due to validation error(s)")?;

    let mut tx = state.db.begin().await?;
    let mut event = CalendarRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(title) = request.title {
        event.title = title;
    }
    if let Some(value) = request.event_date {
        event.event_date = date(&value)?;
    }
    if request.start_time.is_some() {
        event.start_time = time(request.start_time.as_deref())?;
    }
    if request.end_time.is_some() {
        event.end_time = time(request.end_time.as_deref())?;
    }
    if let Some(location) = request.location {
        event.location = Some(location);
    }
    if let Some(description) = request.description {
        event.description = Some(description);
    }

    CalendarRepository::update(&mut tx, &event)
        .await
        .map_err(db_error("Unable to update event"))?;
    let updated = views(&mut tx, vec![event]).await?;
    tx.commit().await.map_err(db_error("Unable to update event"))?;

    Ok(Envelope::ok("Event updated successfully", updated))
}

pub async fn delete_event(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Empty> {
    let mut tx = state.db.begin().await?;
    CalendarRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    CalendarRepository::delete(&mut tx, id)
        .await
        .map_err(db_error("Unable to delete event"))?;
    tx.commit().await.map_err(db_error("Unable to delete event"))?;

    Ok(Empty::done("Event deleted successfully"))
}
