#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use shopkeep_api::{build_router, config::AppConfig, db, AppState};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str =
    "integration-test-secret-9f8e7d6c5b4a39281706f5e4d3c2b1a0-do-not-use-anywhere-else";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Helper harness running the full router over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Response status plus parsed JSON body (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = test_config();
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        Self::with_pool(pool, cfg)
    }

    /// An application whose database connection is gone.
    pub fn disconnected() -> Self {
        Self::with_pool(DatabaseConnection::Disconnected, test_config())
    }

    fn with_pool(pool: DatabaseConnection, cfg: AppConfig) -> Self {
        let state = AppState::new(Arc::new(pool), cfg);
        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Send a request, optionally carrying a session cookie (`token=...`).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        into_test_response(response).await
    }

    /// Send a bodiless request authenticated with `Authorization: Bearer`.
    pub async fn request_with_bearer(&self, method: Method, uri: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        into_test_response(response).await
    }

    /// Send a bodiless request with arbitrary headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        into_test_response(response).await
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(Method::GET, uri, None, Some(cookie)).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(cookie)).await
    }

    pub async fn put(&self, uri: &str, body: Value, cookie: &str) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), Some(cookie)).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, Some(cookie)).await
    }

    /// Registers a business and logs it in, returning the `token=...` cookie pair.
    pub async fn signup(&self, username: &str) -> String {
        let registered = self
            .request(
                Method::POST,
                "/register",
                Some(json!({
                    "username": username,
                    "password": TEST_PASSWORD,
                    "business_name": format!("{username} Hardware"),
                    "address": "1 Main Street",
                })),
                None,
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        self.login(username, TEST_PASSWORD).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let set_cookie = response.set_cookie.expect("login sets a cookie");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    /// Signs up and seeds a balance of `amount`.
    pub async fn signup_with_balance(&self, username: &str, amount: &str) -> String {
        let cookie = self.signup(username).await;
        let created = self
            .post("/balance", json!({ "balance": amount }), &cookie)
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
        cookie
    }

    pub async fn create_supplier(&self, cookie: &str, name: &str, category: &str) -> i32 {
        let response = self
            .post(
                "/suppliers",
                json!({
                    "supplier_name": name,
                    "email": "orders@example.com",
                    "supplier_category": category,
                }),
                cookie,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        id(&response.body, "supplier_id")
    }

    pub async fn create_product(&self, cookie: &str, name: &str, quantity: i32, price: &str) -> i32 {
        let response = self
            .post(
                "/products",
                json!({
                    "product_name": name,
                    "category_name": "Tools",
                    "quantity": quantity,
                    "reorder_level": 5,
                    "reorder_quantity": 20,
                    "price": price,
                }),
                cookie,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        id(&response.body, "product_id")
    }

    pub async fn balance(&self, cookie: &str) -> Decimal {
        let response = self.get("/balance", cookie).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        decimal(&response.body["balance"])
    }

    pub async fn product_quantity(&self, cookie: &str, product_id: i32) -> i64 {
        let response = self.get(&format!("/product/{product_id}"), cookie).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["quantity"].as_i64().expect("quantity")
    }
}

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        TEST_JWT_SECRET.to_string(),
        3600,
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    // A second pooled connection would open a second, empty in-memory database.
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg
}

async fn into_test_response(response: Response) -> TestResponse {
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };

    TestResponse {
        status,
        set_cookie,
        body,
    }
}

/// Reads an integer id field from a JSON object.
pub fn id(body: &Value, field: &str) -> i32 {
    body[field]
        .as_i64()
        .unwrap_or_else(|| panic!("missing {field} in {body}")) as i32
}

/// Parses a decimal serialized either as a JSON string or number.
pub fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap_or_else(|_| panic!("not a decimal: {value}"))
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal")
}
