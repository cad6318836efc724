mod common;

use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use common::{assert_error_envelope, TestApp};
use homey_api::{auth::Role, db::conversations::ConversationRepository};
use serde_json::json;

struct Household {
    app: TestApp,
    landlord: i64,
    tenant: i64,
    roommate: i64,
    group: i64,
    landlord_token: String,
    tenant_token: String,
}

async fn household() -> Household {
    let app = TestApp::new().await;
    let landlord = app.seed_user("landlord01", Role::Landlord).await;
    let tenant = app.seed_user("tenant01", Role::Tenant).await;
    let roommate = app.seed_user("tenant02", Role::Tenant).await;
    let group = app.seed_group(landlord, &[tenant, roommate]).await;
    let landlord_token = app.token_for(landlord, Role::Landlord);
    let tenant_token = app.token_for(tenant, Role::Tenant);

    Household {
        app,
        landlord,
        tenant,
        roommate,
        group,
        landlord_token,
        tenant_token,
    }
}

#[tokio::test]
async fn creating_a_group_opens_its_group_chat() {
    let app = TestApp::new().await;
    let landlord = app.seed_user("landlord01", Role::Landlord).await;
    let tenant = app.seed_user("tenant01", Role::Tenant).await;
    let outsider = app.seed_user("tenant09", Role::Tenant).await;
    let landlord_token = app.token_for(landlord, Role::Landlord);

    let (status, body) = app
        .post(
            "/api/properties",
            &landlord_token,
            json!({
                "name": "Birch Flats",
                "address": "4 Birch Road",
                "city": "Halifax",
                "bedrooms": 2,
                "price": 1500,
                "propertyType": "Apartment",
                "exteriorImage": STANDARD.encode(b"front-door"),
                "images": [{"label": "Kitchen", "image": STANDARD.encode(b"kitchen")}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Property created successfully");
    assert_eq!(body["data"][0]["exteriorImage"], STANDARD.encode(b"front-door"));
    assert_eq!(body["data"][0]["images"][0]["label"], "Kitchen");
    let property = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            "/api/groups",
            &landlord_token,
            json!({"name": "Birch Flats", "propertyId": property, "tenantIds": [tenant]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Group created successfully");
    let group = body["data"][0]["id"].as_i64().unwrap();

    let tenant_token = app.token_for(tenant, Role::Tenant);
    let (status, body) = app.get("/api/groups/tenant", &tenant_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], group);

    let (status, body) = app.get(&format!("/api/conversations/{group}"), &tenant_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Birch Flats - Group Chat");
    assert_eq!(body["data"][0]["type"], "group");
    assert_eq!(body["data"][0]["participants"].as_array().unwrap().len(), 2);

    let outsider_token = app.token_for(outsider, Role::Tenant);
    let (status, body) = app
        .get(&format!("/api/groups/{group}/participants"), &outsider_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body, "Access denied");
}

#[tokio::test]
async fn group_needs_existing_tenants() {
    let app = TestApp::new().await;
    let landlord = app.seed_user("landlord01", Role::Landlord).await;
    let seeded = app.seed_group(landlord, &[]).await;
    let token = app.token_for(landlord, Role::Landlord);

    let (status, body) = app
        .post(
            "/api/groups",
            &token,
            json!({"name": "Second", "propertyId": 1, "tenantIds": [404]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "One or more tenants do not exist");
    assert_eq!(body["errors"][0], "Tenant 404 not found");
    assert_eq!(app.count("house_groups").await, 1);
    assert_eq!(seeded, 1);
}

#[tokio::test]
async fn dm_with_yourself_is_rejected_without_side_effects() {
    let h = household().await;
    let before = {
        let mut conn = h.app.state.db.acquire().await.unwrap();
        ConversationRepository::count(&mut conn).await.unwrap()
    };

    let (status, body) = h
        .app
        .post(
            "/api/conversations/dm",
            &h.tenant_token,
            json!({"userId": h.tenant, "groupId": h.group}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Cannot create DM with yourself");

    let mut conn = h.app.state.db.acquire().await.unwrap();
    assert_eq!(ConversationRepository::count(&mut conn).await.unwrap(), before);
}

#[tokio::test]
async fn dm_is_created_once() {
    let h = household().await;
    let request = json!({"userId": h.roommate, "groupId": h.group});

    let (status, body) = h.app.post("/api/conversations/dm", &h.tenant_token, request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["type"], "dm");
    assert_eq!(body["data"][0]["name"], format!("DM-{}-{}", h.tenant, h.roommate));
    assert_eq!(body["data"][0]["participants"].as_array().unwrap().len(), 2);

    let (status, body) = h.app.post("/api/conversations/dm", &h.tenant_token, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "DM conversation already exists");

    // Same pair from the other side is the same conversation
    let roommate_token = h.app.token_for(h.roommate, Role::Tenant);
    let (status, _) = h
        .app
        .post(
            "/api/conversations/dm",
            &roommate_token,
            json!({"userId": h.tenant, "groupId": h.group}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messages_track_readers_once() {
    let h = household().await;
    let (_, body) = h
        .app
        .post(
            "/api/conversations/dm",
            &h.tenant_token,
            json!({"userId": h.roommate, "groupId": h.group}),
        )
        .await;
    let conversation = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = h
        .app
        .post(
            "/api/messages/send",
            &h.tenant_token,
            json!({"conversationId": conversation, "content": "Bins go out tonight"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["readBy"], json!([h.tenant]));
    let message = body["data"][0]["id"].as_i64().unwrap();

    let roommate_token = h.app.token_for(h.roommate, Role::Tenant);
    for _ in 0..2 {
        let (status, body) = h
            .app
            .request(
                Method::PATCH,
                "/api/messages/read",
                Some(&roommate_token),
                Some(json!({"messageId": message})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["readBy"], json!([h.tenant, h.roommate]));
    }

    let (status, body) = h
        .app
        .get(&format!("/api/messages/conversation/{conversation}"), &roommate_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 messages found");
    assert_eq!(body["data"][0]["sender"]["username"], "tenant01");
}

#[tokio::test]
async fn inventory_quantity_never_goes_negative() {
    let h = household().await;
    let add = json!({"itemName": "  Milk ", "groupId": h.group});

    let (status, body) = h.app.post("/api/inventory/createInventory", &h.tenant_token, add.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["itemName"], "milk");
    assert_eq!(body["data"][0]["quantity"], 1);

    let (status, body) = h.app.post("/api/inventory/createInventory", &h.tenant_token, add).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item quantity updated in inventory");
    assert_eq!(body["data"][0]["quantity"], 2);
    let item = body["data"][0]["itemId"].as_i64().unwrap();

    let (status, body) = h
        .app
        .post(
            "/api/inventory/removeQuantity",
            &h.tenant_token,
            json!({"itemId": item, "quantity": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Quantity removed. New quantity: 0");
    assert_eq!(body["data"][0]["quantity"], 0);

    let (status, body) = h
        .app
        .post("/api/inventory/removeQuantity", &h.tenant_token, json!({"itemId": item}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Cannot remove quantity from an item with zero quantity");

    let (status, body) = h.app.get(&format!("/api/inventory/{}", h.group), &h.tenant_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["quantity"], 0);

    let (status, body) = h
        .app
        .get(&format!("/api/inventory/getLowItem/{}", h.group), &h.tenant_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["itemId"], item);
}

#[tokio::test]
async fn empty_collections_still_succeed() {
    let h = household().await;

    let (status, body) = h.app.get(&format!("/api/inventory/{}", h.group), &h.tenant_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Inventory is empty");
    assert_eq!(body["data"], json!([]));

    let (status, body) = h.app.get(&format!("/api/chores/{}", h.group), &h.tenant_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No chores found");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn chores_are_validated_and_listed() {
    let h = household().await;

    let (status, body) = h.app.post("/api/chores", &h.tenant_token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);

    let (status, body) = h
        .app
        .post(
            "/api/chores",
            &h.tenant_token,
            json!({
                "choreName": "Vacuum",
                "room": "Living room",
                "groupId": h.group,
                "dueDate": "2030-01-15T10:00:00",
                "assignedTo": h.roommate
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Chore added successfully");
    assert_eq!(body["data"][0]["completed"], false);
    assert_eq!(body["data"][0]["assignee"]["username"], "tenant02");

    let (status, body) = h
        .app
        .get(
            &format!("/api/chores/{}?assignedTo={}", h.group, h.roommate),
            &h.tenant_token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 chore(s) found");

    let (status, body) = h.app.get("/api/chores/chore/99", &h.tenant_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "No chore found with ID: 99");
}

#[tokio::test]
async fn list_items_are_unique_per_list() {
    let h = household().await;

    let (status, body) = h
        .app
        .post(
            "/api/lists/createList",
            &h.tenant_token,
            json!({"listName": "Groceries", "groupId": h.group}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["userId"], h.tenant);
    let list = body["data"][0]["listId"].as_i64().unwrap();

    let item = json!({"listId": list, "item": "Eggs"});
    let (status, _) = h.app.post("/api/lists/createItem", &h.tenant_token, item.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = h.app.post("/api/lists/createItem", &h.tenant_token, item).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "The item already exists in the list");

    let (status, body) = h
        .app
        .get(&format!("/api/lists/items?listId={list}"), &h.tenant_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn a_tenant_reviews_an_item_once() {
    let h = household().await;
    let review = json!({"reviewType": "user", "reviewedItemId": h.landlord, "score": 4});

    let (status, body) = h.app.post("/api/reviews", &h.tenant_token, review.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["reviewerId"], h.tenant);

    let (status, body) = h.app.post("/api/reviews", &h.tenant_token, review).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "The user has already created a review for this item");

    let (status, body) = h
        .app
        .get(
            &format!("/api/reviews?reviewType=user&reviewedItemId={}", h.landlord),
            &h.landlord_token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_property_type_is_reported_with_other_violations() {
    let app = TestApp::new().await;
    let landlord = app.seed_user("landlord01", Role::Landlord).await;
    let token = app.token_for(landlord, Role::Landlord);

    let (status, body) = app
        .post("/api/properties", &token, json!({"propertyType": "Castle"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Unable to create property due to validation error(s)");
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert_eq!(errors.len(), 7);
    assert!(errors.iter().any(|e| e.starts_with("Property type must be one of: House")));
    assert!(errors.contains(&"Name is required"));
    assert!(errors.contains(&"Exterior image is required"));
    assert_eq!(app.count("properties").await, 0);

    let (status, body) = app
        .post(
            "/api/properties",
            &token,
            json!({
                "name": "Lakeside",
                "address": "1 Shore Lane",
                "city": "Dartmouth",
                "bedrooms": 1,
                "price": 900,
                "propertyType": "Mobile Home",
                "exteriorImage": STANDARD.encode(b"trailer")
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["propertyType"], "Mobile Home");
}

#[tokio::test]
async fn city_search_treats_wildcards_literally() {
    let h = household().await;

    let (status, body) = h
        .app
        .get("/api/properties/search?city=FAX", &h.tenant_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["city"], "Halifax");

    for pattern in ["%25", "_", "H_lifax"] {
        let (status, body) = h
            .app
            .get(&format!("/api/properties/search?city={pattern}"), &h.tenant_token)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "city={pattern}");
        assert_error_envelope(&body, "No properties found matching your criteria");
    }
}

#[tokio::test]
async fn messages_are_limited_to_participants() {
    let h = household().await;
    let (_, body) = h
        .app
        .post(
            "/api/conversations/dm",
            &h.tenant_token,
            json!({"userId": h.roommate, "groupId": h.group}),
        )
        .await;
    let conversation = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = h
        .app
        .post(
            "/api/messages/send",
            &h.tenant_token,
            json!({"conversationId": conversation, "content": "Rent is due Friday"}),
        )
        .await;
    let message = body["data"][0]["id"].as_i64().unwrap();

    // The landlord is in the group but not in this DM
    let (status, body) = h
        .app
        .post(
            "/api/messages/send",
            &h.landlord_token,
            json!({"conversationId": conversation, "content": "Hello"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body, "Access denied");

    let (status, _) = h
        .app
        .get(&format!("/api/messages/conversation/{conversation}"), &h.landlord_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .app
        .request(
            Method::PATCH,
            "/api/messages/read",
            Some(&h.landlord_token),
            Some(json!({"messageId": message})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = h
        .app
        .get(&format!("/api/messages/conversation/{conversation}"), &h.tenant_token)
        .await;
    assert_eq!(body["data"][0]["readBy"], json!([h.tenant]));
    assert_eq!(h.app.count("messages").await, 1);
}
