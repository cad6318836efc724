use crate::{
    db::inventory::InventoryRepository,
    handlers::{existing_group, required},
    models::{CreateInventoryRequest, InventoryItem, InventoryItemRequest, RemoveQuantityRequest},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiResult, Empty, Envelope},
};
use axum::extract::State;

fn item_not_found(item_id: i64) -> ApiError {
    ApiError::not_found_error(format!("Inventory item {item_id} not found"))
}

fn listing(items: Vec<InventoryItem>, empty: &str) -> Envelope<Vec<InventoryItem>> {
    if items.is_empty() {
        Envelope::ok(empty, items)
    } else {
        Envelope::ok(format!("{} item(s) found", items.len()), items)
    }
}

/// Whole inventory of a group; empty inventories are a success with no items
pub async fn list_inventory(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<InventoryItem>>> {
    let mut conn = state.db.acquire().await?;
    let items = InventoryRepository::list_for_group(&mut conn, group_id)
        .await
        .map_err(db_error("Unable to fetch inventory"))?;

    Ok(listing(items, "Inventory is empty"))
}

pub async fn low_stock(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<InventoryItem>>> {
    let mut conn = state.db.acquire().await?;
    let items = InventoryRepository::low_stock(&mut conn, group_id)
        .await
        .map_err(db_error("Unable to fetch inventory"))?;

    Ok(listing(items, "No items are running low"))
}

/// Add one unit of an item, creating it when the group has none yet
pub async fn add_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateInventoryRequest>,
) -> ApiResult<Envelope<Vec<InventoryItem>>> {
    validate_request(&request, "Unable to add item due to validation error(s)")?;
    let item_name = required(request.item_name, "itemName")?.trim().to_lowercase();
    let group_id = required(request.group_id, "groupId")?;

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;

    let (item_id, created) = match InventoryRepository::find_by_name(&mut tx, group_id, &item_name).await? {
        Some(existing) => {
            InventoryRepository::set_quantity(&mut tx, existing.item_id, existing.quantity + 1)
                .await
                .map_err(db_error("Unable to update inventory"))?;
            (existing.item_id, false)
        }
        None => {
            let id = InventoryRepository::insert(&mut tx, group_id, &item_name)
                .await
                .map_err(db_error("Unable to add item"))?;
            (id, true)
        }
    };

    let item = InventoryRepository::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| item_not_found(item_id))?;
    tx.commit().await.map_err(db_error("Unable to update inventory"))?;

    Ok(if created {
        Envelope::created("Item added to inventory", vec![item])
    } else {
        Envelope::ok("Item quantity updated in inventory", vec![item])
    })
}

pub async fn delete_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<InventoryItemRequest>,
) -> ApiResult<Empty> {
    validate_request(&request, "Unable to delete item due to validation error(s)")?;
    let item_id = required(request.item_id, "itemId")?;

    let mut tx = state.db.begin().await?;
    InventoryRepository::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| item_not_found(item_id))?;
    InventoryRepository::delete(&mut tx, item_id)
        .await
        .map_err(db_error("Unable to delete item"))?;
    tx.commit().await.map_err(db_error("Unable to delete item"))?;

    Ok(Empty::done("Item deleted from inventory"))
}

/// Take units away from an item; the quantity never drops below zero
pub async fn remove_quantity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RemoveQuantityRequest>,
) -> ApiResult<Envelope<Vec<InventoryItem>>> {
    validate_request(&request, "Unable to remove quantity due to validation error(s)")?;
    let item_id = required(request.item_id, "itemId")?;
    let amount = request.quantity.unwrap_or(1);

    let mut tx = state.db.begin().await?;
    let mut item = InventoryRepository::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| item_not_found(item_id))?;

    if item.quantity == 0 {
        return Err(ApiError::validation_error("Cannot remove quantity from an item with zero quantity")
            .with_error("Item quantity is already at zero"));
    }

    item.quantity = item.quantity_after_removing(amount);
    InventoryRepository::set_quantity(&mut tx, item_id, item.quantity)
        .await
        .map_err(db_error("Unable to update inventory"))?;
    tx.commit().await.map_err(db_error("Unable to update inventory"))?;

    Ok(Envelope::ok(
        format!("Quantity removed. New quantity: {}", item.quantity),
        vec![item],
    ))
}
