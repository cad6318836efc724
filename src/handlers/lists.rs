use crate::{
    auth::AuthUser,
    db::lists::ListRepository,
    handlers::{existing_group, non_empty, required},
    models::{
        CreateItemRequest, CreateListRequest, Deleted, ItemFilter, ItemIdRequest, ListFilter,
        ListIdRequest, ListItem, ShoppingList, UpdateItemRequest,
    },
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, Envelope},
};
use axum::{extract::State, Extension};

pub async fn list_lists(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> ApiResult<Envelope<Vec<ShoppingList>>> {
    let mut conn = state.db.acquire().await?;
    let lists = ListRepository::lists_for_group(&mut conn, group_id, filter.user_id)
        .await
        .map_err(db_error("Unable to fetch lists"))?;
    let lists = non_empty(lists, "No lists found")?;

    Ok(Envelope::ok(format!("{} list(s) found", lists.len()), lists))
}

pub async fn list_items(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ItemFilter>,
) -> ApiResult<Envelope<Vec<ListItem>>> {
    let mut conn = state.db.acquire().await?;
    let items = ListRepository::search_items(&mut conn, &filter)
        .await
        .map_err(db_error("Unable to fetch items"))?;
    let items = non_empty(items, "No items found")?;

    Ok(Envelope::ok(format!("{} item(s) found", items.len()), items))
}

/// Create a list; it belongs to the caller unless another owner is named
pub async fn create_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateListRequest>,
) -> ApiResult<Envelope<Vec<ShoppingList>>> {
    validate_request(&request, "Unable to create list due to validation error(s)")?;
    let list_name = required(request.list_name, "listName")?;
    let group_id = required(request.group_id, "groupId")?;
    let user_id = request.user_id.unwrap_or(auth_user.user_id);

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;
    let id = ListRepository::insert_list(&mut tx, user_id, &list_name, group_id)
        .await
        .map_err(db_error("Unable to create list"))?;
    let list = ListRepository::find_list(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create list"))?;
    tx.commit().await.map_err(db_error("Unable to create list"))?;

    Ok(Envelope::created("List created", vec![list]))
}

/// Delete a list together with its items
pub async fn delete_list(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ListIdRequest>,
) -> ApiResult<Envelope<Vec<Deleted>>> {
    validate_request(&request, "Unable to delete list due to validation error(s)")?;
    let list_id = required(request.list_id, "listId")?;

    let mut tx = state.db.begin().await?;
    ListRepository::find_list(&mut tx, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("List {list_id} not found")))?;
    ListRepository::delete_list(&mut tx, list_id)
        .await
        .map_err(db_error("Unable to delete list"))?;
    tx.commit().await.map_err(db_error("Unable to delete list"))?;

    Ok(Envelope::ok("List deleted", vec![Deleted { deleted: true }]))
}

pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> ApiResult<Envelope<Vec<ListItem>>> {
    validate_request(&request, "Unable to create item due to validation error(s)")?;
    let list_id = required(request.list_id, "listId")?;
    let item = required(request.item, "item")?;

    let mut tx = state.db.begin().await?;
    ListRepository::find_list(&mut tx, list_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("List {list_id} not found")))?;
    if ListRepository::find_item_by_name(&mut tx, list_id, &item).await?.is_some() {
        return Err(ApiError::conflict_error("The item already exists in the list"));
    }

    let item_id = ListRepository::insert_item(&mut tx, list_id, &item, request.assigned_to.as_deref())
        .await
        .map_err(db_error("Unable to create item"))?;
    let created = ListRepository::find_item(&mut tx, item_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create item"))?;
    tx.commit().await.map_err(db_error("Unable to create item"))?;

    Ok(Envelope::created("Item added to list", vec![created]))
}

pub async fn update_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> ApiResult<Envelope<Vec<ListItem>>> {
    validate_request(&request, "Unable to update item due to validation error(s)")?;
    let item_id = required(request.item_id, "itemId")?;

    let mut tx = state.db.begin().await?;
    let mut item = ListRepository::find_item(&mut tx, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Item {item_id} not found")))?;

    if let Some(name) = request.item {
        item.item = name;
    }
    if let Some(assigned_to) = request.assigned_to {
        item.assigned_to = Some(assigned_to);
    }
    if let Some(purchased) = request.purchased {
        item.purchased = purchased;
    }

    ListRepository::update_item(&mut tx, &item)
        .await
        .map_err(db_error("Unable to update item"))?;
    tx.commit().await.map_err(db_error("Unable to update item"))?;

    Ok(Envelope::ok("Item updated", vec![item]))
}

pub async fn delete_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ItemIdRequest>,
) -> ApiResult<Envelope<Vec<Deleted>>> {
    validate_request(&request, "Unable to delete item due to validation error(s)")?;
    let item_id = required(request.item_id, "itemId")?;

    let mut tx = state.db.begin().await?;
    ListRepository::find_item(&mut tx, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Item {item_id} not found")))?;
    ListRepository::delete_item(&mut tx, item_id)
        .await
        .map_err(db_error("Unable to delete item"))?;
    tx.commit().await.map_err(db_error("Unable to delete item"))?;

    Ok(Envelope::ok("Item deleted", vec![Deleted { deleted: true }]))
}
