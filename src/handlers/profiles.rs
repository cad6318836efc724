use crate::{
    auth::AuthUser,
    db::profiles::ProfileRepository,
    handlers::existing_group,
    models::{Profile, UpdateProfileRequest},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiResult, Envelope},
};
use axum::{extract::State, Extension};

/// The caller's living preferences within a group
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<Profile>>> {
    let mut conn = state.db.acquire().await?;
    let profile = ProfileRepository::find(&mut conn, auth_user.user_id, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Profile not found"))?;

    Ok(Envelope::ok("Profile found", vec![profile]))
}

/// Create or amend the caller's profile; absent fields keep their value
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Envelope<Vec<Profile>>> {
    validate_request(&request, "Unable to update profile due to validation error(s)")?;

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;

    let mut profile = ProfileRepository::find(&mut tx, auth_user.user_id, group_id)
        .await?
        .unwrap_or_else(|| Profile {
            id: 0,
            cleaning_habits: Default::default(),
            noise_level: Default::default(),
            sleep_start: None,
            sleep_end: None,
            allergies: None,
            user_id: auth_user.user_id,
            group_id,
        });

    if let Some(habits) = request.cleaning_habits {
        profile.cleaning_habits = habits;
    }
    if let Some(noise) = request.noise_level {
        profile.noise_level = noise;
    }
    if let Some(start) = request.sleep_start {
        profile.sleep_start = Some(start);
    }
    if let Some(end) = request.sleep_end {
        profile.sleep_end = Some(end);
    }
    if let Some(allergies) = request.allergies {
        profile.allergies = Some(allergies);
    }

    ProfileRepository::upsert(&mut tx, &profile)
        .await
        .map_err(db_error("Unable to update profile"))?;
    let profile = ProfileRepository::find(&mut tx, auth_user.user_id, group_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to update profile"))?;
    tx.commit().await.map_err(db_error("Unable to update profile"))?;

    Ok(Envelope::ok("Profile updated successfully", vec![profile]))
}
