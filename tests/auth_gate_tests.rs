mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{assert_error_envelope, TestApp, TEST_SECRET};
use homey_api::auth::{Role, TokenService};
use serde_json::json;

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let app = TestApp::new().await;

    for (method, uri) in [
        (Method::GET, "/api/users"),
        (Method::GET, "/api/users/me"),
        (Method::GET, "/api/properties"),
        (Method::POST, "/api/groups"),
        (Method::GET, "/api/chores/1"),
        (Method::POST, "/api/inventory/removeQuantity"),
        (Method::PATCH, "/api/messages/read"),
        (Method::GET, "/api/stores/getEntries"),
    ] {
        let (status, body) = app.request(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_error_envelope(&body, "Invalid token");
        assert_eq!(
            body["errors"][0],
            "Token is invalid or expired, please login to get a new token"
        );
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/users/me", "not.a.token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body, "Invalid token. Please log in or provide a valid token");
}

#[tokio::test]
async fn expired_token_gets_expiry_message() {
    let app = TestApp::new().await;
    let user = app.seed_user("tenant01", Role::Tenant).await;

    let tokens = TokenService::new(TEST_SECRET, Duration::minutes(60));
    let mut claims = tokens.session_claims(user, Role::Tenant, true);
    claims.exp = Utc::now().timestamp() - 30;
    let expired = tokens.issue(&claims).unwrap();

    let (status, body) = app.get("/api/users/me", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body, "The token has expired. Please log in again");
}

#[tokio::test]
async fn tokens_expire_independently() {
    let app = TestApp::new().await;
    let first = app.seed_user("tenant01", Role::Tenant).await;
    let second = app.seed_user("tenant02", Role::Tenant).await;

    let tokens = TokenService::new(TEST_SECRET, Duration::minutes(60));
    let live = tokens.issue(&tokens.session_claims(first, Role::Tenant, true)).unwrap();
    let mut stale = tokens.session_claims(second, Role::Tenant, true);
    stale.exp = Utc::now().timestamp() - 1;
    let stale = tokens.issue(&stale).unwrap();

    let (status, _) = app.get("/api/users/me", &stale).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/users/me", &live).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["username"], "tenant01");
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let app = TestApp::new().await;
    let tenant = app.seed_user("tenant01", Role::Tenant).await;
    let landlord = app.seed_user("landlord01", Role::Landlord).await;
    let tenant_token = app.token_for(tenant, Role::Tenant);
    let landlord_token = app.token_for(landlord, Role::Landlord);

    let (status, body) = app.get("/api/properties", &tenant_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body, "Access denied");
    assert_eq!(
        body["errors"][0],
        "User role must be one of [landlord] and you are tenant"
    );

    let (status, _) = app.get("/api/groups/tenant", &landlord_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Role check runs before the body is read
    let (status, _) = app.post("/api/groups", &tenant_token, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/reviews",
            &landlord_token,
            json!({"reviewType": "user", "reviewedItemId": tenant, "score": 4}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_passes_every_role_gate() {
    let app = TestApp::new().await;
    let admin = app.seed_user("admin001", Role::Admin).await;
    let token = app.token_for(admin, Role::Admin);

    let (status, body) = app.get("/api/properties", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No properties found");

    let (status, body) = app.get("/api/groups/tenant", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No groups found");

    let (status, body) = app
        .post(
            "/api/reviews",
            &token,
            json!({"reviewType": "user", "reviewedItemId": admin, "score": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["reviewerId"], admin);
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Backend is running");

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"][0]["database"], "ok");

    let (status, body) = app
        .request(Method::POST, "/api/users/login", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Missing required field(s)");
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "GET /api/nope Not found");
}

#[tokio::test]
async fn token_not_yet_active_is_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("tenant01", Role::Tenant).await;

    let tokens = TokenService::new(TEST_SECRET, Duration::minutes(60));
    let mut claims = tokens.session_claims(user, Role::Tenant, true);
    claims.nbf = Some(Utc::now().timestamp() + 600);
    let early = tokens.issue(&claims).unwrap();

    let (status, body) = app.get("/api/users/me", &early).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(
        &body,
        "The token is not yet active. Please check your system time",
    );
}

#[tokio::test]
async fn wrong_method_is_enveloped_405() {
    let app = TestApp::new().await;
    let tenant = app.seed_user("tenant01", Role::Tenant).await;
    let token = app.token_for(tenant, Role::Tenant);

    let (status, body) = app.get("/api/chores", &token).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error_envelope(&body, "GET /api/chores Method not allowed");

    let (status, body) = app
        .request(Method::DELETE, "/api/users/login", None, None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error_envelope(&body, "DELETE /api/users/login Method not allowed");
}

#[tokio::test]
async fn oversized_body_without_length_header_is_413() {
    let mut config = common::test_config();
    config.server.max_content_length = 64;
    let app = TestApp::with_config(config).await;
    let tenant = app.seed_user("tenant01", Role::Tenant).await;
    let token = app.token_for(tenant, Role::Tenant);

    // The harness sends no Content-Length, so the limit trips while buffering
    let (status, body) = app
        .post(
            "/api/stores/createEntries",
            &token,
            json!({
                "itemName": "x".repeat(200),
                "store": "Corner Shop",
                "price": "2.50",
                "storeLink": "https://shop.example/x"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_error_envelope(&body, "Request payload too large");
}
