//! Shopkeep API Library
//!
//! Multi-tenant back office for small retail businesses: employees,
//! suppliers, products, supplier orders, customers, sales and cash balance.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::FromRef, middleware, Router};
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthService};
use crate::db::DbPool;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Every resource route, unauthenticated ones included. The auth extractor on
/// each handler decides whether a session is required.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::health_routes())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::business::business_routes())
        .merge(handlers::employees::employee_routes())
        .merge(handlers::suppliers::supplier_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::orders::order_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::sales::sale_routes())
        .merge(handlers::balances::balance_routes())
}

/// Complete router with request ids, HTTP tracing and the API docs.
///
/// Transport concerns that depend on deployment (CORS, timeouts, body limit,
/// compression, access log) are layered by the binary.
pub fn build_router(state: AppState) -> Router {
    app_routes()
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
