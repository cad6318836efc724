#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use homey_api::{
    auth::Role,
    create_app,
    db::{groups::GroupRepository, properties::{NewProperty, PropertyRepository}, users::UserRepository},
    mail::{MailError, Mailer, OutgoingEmail},
    models::{NewUser, PropertyType},
    utils::config::{Config, DatabaseConfig, JwtConfig, MailConfig, ServerConfig, TlsConfig},
    AppState, Database,
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret";

/// Mailer that keeps every message and can be told to refuse delivery
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn fail_deliveries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Rejected {
                status: 503,
                body: "mail relay unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
            development: true,
            cors_origins: vec!["*".to_string()],
            max_content_length: 52_428_800,
            tls: TlsConfig {
                cert_path: "./cert.crt".into(),
                key_path: "./key.pem".into(),
            },
            public_base_url: None,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            sync: true,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_minutes: 60,
        },
        mail: MailConfig {
            api_url: None,
            api_key: None,
            from: "no-reply@homey.app".to_string(),
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(db, Arc::new(config), mailer.clone() as Arc<dyn Mailer>);
        let app = create_app(state.clone());

        Self { app, state, mailer }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Verified account that cannot log in with a password
    pub async fn seed_user(&self, username: &str, role: Role) -> i64 {
        let mut conn = self.state.db.acquire().await.unwrap();
        let id = UserRepository::insert(
            &mut conn,
            &NewUser {
                first_name: "Test",
                last_name: "User",
                username,
                email: &format!("{username}@example.com"),
                password_hash: "unusable",
                role,
            },
        )
        .await
        .unwrap();
        UserRepository::mark_verified(&mut conn, id).await.unwrap();
        id
    }

    pub fn token_for(&self, user_id: i64, role: Role) -> String {
        self.state.auth_service.session_token(user_id, role, true).unwrap()
    }

    /// Property plus a group holding `tenants`, inserted directly
    pub async fn seed_group(&self, landlord_id: i64, tenants: &[i64]) -> i64 {
        let mut conn = self.state.db.acquire().await.unwrap();
        let property_id = PropertyRepository::insert(
            &mut conn,
            &NewProperty {
                landlord_id,
                name: "Maple House",
                address: "12 Maple Street",
                city: "Halifax",
                description: "Three bedroom semi",
                bedrooms: 3,
                price: 1800,
                property_type: PropertyType::House,
                availability: true,
                exterior_image: b"exterior",
            },
        )
        .await
        .unwrap();
        let group_id = GroupRepository::insert(&mut conn, "Maple House", landlord_id, property_id)
            .await
            .unwrap();
        for tenant in tenants {
            GroupRepository::add_participant(&mut conn, group_id, *tenant).await.unwrap();
        }
        group_id
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.state.db.pool())
            .await
            .unwrap();
        count
    }
}

/// Error envelopes always carry `data: []` and at least one error.
pub fn assert_error_envelope(body: &Value, message: &str) {
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], message);
    assert_eq!(body["data"], serde_json::json!([]));
    assert!(!body["errors"].as_array().unwrap().is_empty());
}
