mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{assert_error_envelope, TestApp};
use homey_api::auth::TokenService;
use serde_json::{json, Value};

fn registration() -> Value {
    json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "username": "janedoe",
        "email": "jane@example.com",
        "password": "Str0ng!Pass",
        "role": "tenant"
    })
}

/// Pulls the token query parameter out of a verification email body
fn link_token(body: &str) -> String {
    let after = body.split("token=").nth(1).expect("verification link in body");
    after.split_whitespace().next().unwrap().to_string()
}

async fn public(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    app.request(method, uri, None, body).await
}

#[tokio::test]
async fn registration_reports_every_validation_failure() {
    let app = TestApp::new().await;

    let (status, body) = public(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({
            "firstName": "J",
            "lastName": "D",
            "username": "jd",
            "email": "not-an-email",
            "password": "short",
            "role": "janitor"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Unable to create user due to validation error(s)");
    assert!(body["errors"].as_array().unwrap().len() >= 5);
    assert_eq!(app.count("users").await, 0);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn register_verify_and_login() {
    let app = TestApp::new().await;

    let (status, body) = public(&app, Method::POST, "/api/users", Some(registration())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User 1 created");
    assert_eq!(body["data"][0]["username"], "janedoe");
    assert_eq!(body["data"][0]["verified"], false);
    assert!(body["data"][0].get("password").is_none());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
    assert!(sent[0].body.contains("/api/users/verify?token="));

    // Unverified accounts get a fresh link instead of a session
    let login = json!({"username": "janedoe", "password": "Str0ng!Pass"});
    let (status, body) = public(&app, Method::POST, "/api/users/login", Some(login.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body, "Resent verification email to jane@example.com");
    assert_eq!(body["errors"][0], "Account is not verified");
    assert_eq!(app.mailer.sent().len(), 2);

    let token = link_token(&sent[0].body);
    let (status, body) = public(&app, Method::GET, &format!("/api/users/verify?token={token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User 1 has been verified");
    assert_eq!(body["data"], json!([]));

    let (status, body) = public(&app, Method::POST, "/api/users/login", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let session = body["data"][0]["token"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/users/me", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["email"], "jane@example.com");
    assert_eq!(body["data"][0]["verified"], true);

    // Email works as the identifier too
    let (status, _) = public(
        &app,
        Method::POST,
        "/api/users/login",
        Some(json!({"email": "jane@example.com", "password": "Str0ng!Pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn failed_mail_rolls_back_registration() {
    let app = TestApp::new().await;
    app.mailer.fail_deliveries();

    let (status, body) = public(&app, Method::POST, "/api/users", Some(registration())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_envelope(&body, "Failed to send verification email");
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = public(&app, Method::POST, "/api/users", Some(registration())).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut again = registration();
    again["email"] = json!("other@example.com");
    let (status, body) = public(&app, Method::POST, "/api/users", Some(again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Unable to create user");
    assert_eq!(body["errors"][0], "Username janedoe is already taken");
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn wrong_password_is_unauthenticated() {
    let app = TestApp::new().await;
    public(&app, Method::POST, "/api/users", Some(registration())).await;

    let (status, body) = public(
        &app,
        Method::POST,
        "/api/users/login",
        Some(json!({"username": "janedoe", "password": "Wr0ng!Pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body, "Invalid credentials");
    assert_eq!(body["errors"][0], "Incorrect username/email or password");
}

#[tokio::test]
async fn verify_requires_a_verification_token() {
    let app = TestApp::new().await;

    let (status, body) = public(&app, Method::GET, "/api/users/verify", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "Missing token");

    // A session token lacks the verification claims
    let session = app.token_for(1, homey_api::auth::Role::Tenant);
    let (status, _) = public(&app, Method::GET, &format!("/api/users/verify?token={session}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_verification_link_asks_for_a_new_login() {
    let app = TestApp::new().await;
    public(&app, Method::POST, "/api/users", Some(registration())).await;

    let tokens = TokenService::new(common::TEST_SECRET, Duration::minutes(60));
    let mut claims = tokens.verification_claims(1);
    claims.exp = Utc::now().timestamp() - 30;
    let expired = tokens.issue(&claims).unwrap();

    let (status, body) = public(&app, Method::GET, &format!("/api/users/verify?token={expired}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(
        &body,
        "The token has expired. Please login again to send another verification email",
    );

    let (_, body) = public(
        &app,
        Method::POST,
        "/api/users/login",
        Some(json!({"username": "janedoe", "password": "Str0ng!Pass"})),
    )
    .await;
    assert_eq!(body["errors"][0], "Account is not verified");
}
