use crate::{
    auth::AuthUser,
    db::reviews::{NewReview, ReviewRepository},
    handlers::{non_empty, required},
    models::{CreateReviewRequest, Review, ReviewFilter},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiQuery, ApiResult, Envelope},
};
use axum::{extract::State, Extension};

pub async fn list_reviews(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ReviewFilter>,
) -> ApiResult<Envelope<Vec<Review>>> {
    let mut conn = state.db.acquire().await?;
    let reviews = ReviewRepository::search(&mut conn, &filter)
        .await
        .map_err(db_error("Unable to fetch reviews"))?;
    let reviews = non_empty(reviews, "No reviews found")?;

    Ok(Envelope::ok(format!("{} review(s) found", reviews.len()), reviews))
}

/// Review a user or property as the calling tenant
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateReviewRequest>,
) -> ApiResult<Envelope<Vec<Review>>> {
    validate_request(&request, "Unable to create review due to validation error(s)")?;
    let review_type = required(request.review_type, "reviewType")?;
    let reviewed_item_id = required(request.reviewed_item_id, "reviewedItemId")?;
    let score = required(request.score, "score")?;

    let mut tx = state.db.begin().await?;
    if ReviewRepository::exists(&mut tx, review_type, reviewed_item_id, auth_user.user_id).await? {
        return Err(ApiError::conflict_error("The user has already created a review for this item"));
    }

    let id = ReviewRepository::insert(
        &mut tx,
        &NewReview {
            review_type,
            reviewed_item_id,
            reviewer_id: auth_user.user_id,
            score,
            description: request.description.as_deref(),
        },
    )
    .await
    .map_err(db_error("Unable to create review"))?;
    let review = ReviewRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create review"))?;
    tx.commit().await.map_err(db_error("Unable to create review"))?;

    Ok(Envelope::created("Review created", vec![review]))
}
