use crate::{
    db::stores::StoreRepository,
    handlers::{non_empty, required},
    models::{CreateStoreEntryRequest, StoreEntry, StoreFilter},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiQuery, ApiResult, Envelope},
};
use axum::extract::State;

pub async fn list_entries(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> ApiResult<Envelope<Vec<StoreEntry>>> {
    let mut conn = state.db.acquire().await?;
    let entries = StoreRepository::search(&mut conn, &filter)
        .await
        .map_err(db_error("Unable to fetch store entries"))?;
    let entries = non_empty(entries, "No store entries found")?;

    Ok(Envelope::ok(format!("{} store entry(ies) found", entries.len()), entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStoreEntryRequest>,
) -> ApiResult<Envelope<Vec<StoreEntry>>> {
    validate_request(&request, "Unable to create store entry due to validation error(s)")?;
    let item_name = required(request.item_name, "itemName")?;
    let store = required(request.store, "store")?;
    let price = required(request.price, "price")?;
    let store_link = required(request.store_link, "storeLink")?;

    let mut tx = state.db.begin().await?;
    let id = StoreRepository::insert(&mut tx, &item_name, &store, &price, &store_link)
        .await
        .map_err(db_error("Unable to create store entry"))?;
    let entry = StoreRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create store entry"))?;
    tx.commit().await.map_err(db_error("Unable to create store entry"))?;

    Ok(Envelope::created("New Store Created", vec![entry]))
}
