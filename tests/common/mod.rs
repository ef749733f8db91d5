#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use storefront_backend::entities::{categories, products};
use storefront_backend::error::AppResult;
use storefront_backend::extractors::SESSION_HEADER;
use storefront_backend::routes::create_router;
use storefront_backend::services::catalog::slugify;
use storefront_backend::services::mailer::Mailer;
use storefront_backend::services::seed;
use storefront_backend::services::session_store::SessionStore;
use storefront_backend::AppState;

/// Set up a migrated in-memory test database.
/// A single pooled connection, since each SQLite memory connection is a
/// separate database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Captures OTP mails so tests can complete the login flow
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl CapturingMailer {
    pub fn code_for(&self, username: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, user, _)| user == username)
            .map(|(_, _, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_otp(&self, to: &str, username: &str, code: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), username.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_test_db().await.expect("Failed to set up test DB");
        let mailer = Arc::new(CapturingMailer::default());

        let state = AppState {
            db: db.clone(),
            sessions: SessionStore::new(Duration::from_secs(600), 1_000),
            mailer: mailer.clone(),
        };

        Self {
            router: create_router(state),
            db,
            mailer,
        }
    }

    /// Send one request and decode the JSON body (Null when empty or not JSON)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(SESSION_HEADER, session);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, session, None).await
    }

    pub async fn post(&self, uri: &str, session: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, session, body).await
    }

    pub async fn new_session(&self) -> String {
        let (status, json) = self.post("/api/sessions", None, None).await;
        assert_eq!(status, StatusCode::CREATED);
        json["session_id"].as_str().unwrap().to_string()
    }

    /// Register through the API; returns the logged-in session id
    pub async fn register(&self, username: &str, role: &str) -> String {
        let session = self.new_session().await;
        let (status, json) = self
            .post(
                "/api/auth/register",
                Some(&session),
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "correct horse battery",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", json);
        session
    }

    /// Provision an admin (not possible through the API) and log it in
    pub async fn admin_session(&self, username: &str) -> String {
        seed::create_admin(&self.db, username, &format!("{}@example.com", username), "admin password 1")
            .await
            .unwrap()
            .unwrap();

        let session = self.new_session().await;
        let (status, _) = self
            .post(
                "/api/auth/login",
                Some(&session),
                Some(serde_json::json!({"username": username, "password": "admin password 1"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self.mailer.code_for(username).unwrap();
        let (status, _) = self
            .post(
                "/api/auth/verify-otp",
                Some(&session),
                Some(serde_json::json!({"username": username, "otp": code})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        session
    }

    pub async fn create_category(&self, name: &str) -> categories::Model {
        categories::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slugify(name)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn create_product(
        &self,
        category_id: i32,
        name: &str,
        price: Decimal,
        stock: i32,
    ) -> products::Model {
        products::ActiveModel {
            category_id: Set(category_id),
            vendor_id: Set(None),
            name: Set(name.to_string()),
            slug: Set(slugify(name)),
            description: Set(String::new()),
            price: Set(price),
            stock: Set(stock),
            available: Set(true),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }
}

/// Parse a JSON decimal (serialized as a string) for exact comparison
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}
