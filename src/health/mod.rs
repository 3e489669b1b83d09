/*!
 * # Health Check Module
 *
 * Monitoring endpoints for the shopkeep API:
 *
 * - `/health` - liveness, always up while the process serves requests
 * - `/health/ready` - readiness, pings the database and returns 503 when it is unreachable
 * - `/health/version` - build information
 */

use crate::{db, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, error};

/// Basic health status
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health of one dependency
#[derive(Serialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
}

/// Readiness report
#[derive(Serialize, Debug, Clone)]
pub struct ReadinessReport {
    pub ready: bool,
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub details: HashMap<String, HealthDetail>,
}

/// Liveness endpoint
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now(),
        })),
    )
}

/// Readiness endpoint, backed by a database ping
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => HealthDetail {
            status: HealthStatus::Up,
            message: None,
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthDetail {
                status: HealthStatus::Down,
                message: Some("database unreachable".to_string()),
            }
        }
    };

    let status = database.status;
    let report = ReadinessReport {
        ready: status == HealthStatus::Up,
        status,
        timestamp: Utc::now(),
        details: HashMap::from([("database".to_string(), database)]),
    };

    (status.status_code(), Json(report))
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
        "built": option_env!("BUILD_TIME").unwrap_or("unknown"),
    }))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/version", get(version_info))
}
