/*!
 * # Health Check Module
 *
 * - `/health` - cached up/down status
 * - `/health/ready` - pings the database before answering
 * - `/health/live` - process liveness and uptime
 * - `/health/version` - build information
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

impl HealthStatus {
    fn http_status(&self) -> StatusCode {
        match self {
            HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: HashMap<String, HealthDetail>,
}

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: Arc<DatabaseConnection>,
    pub health_cache: Arc<RwLock<HealthInfo>>,
    pub start_time: SystemTime,
}

impl HealthState {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            health_cache: Arc::new(RwLock::new(HealthInfo {
                status: HealthStatus::Up,
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
                uptime_seconds: 0,
                details: HashMap::new(),
            })),
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    /// Re-checks dependencies and refreshes the cached health info.
    pub async fn update_health(&self) {
        let (db_status, db_message) = match self.db_pool.ping().await {
            Ok(_) => (HealthStatus::Up, None),
            Err(e) => {
                error!("Database health check failed: {}", e);
                (HealthStatus::Down, Some(e.to_string()))
            }
        };

        let mut health = self.health_cache.write().await;
        health.timestamp = Utc::now();
        health.uptime_seconds = self.uptime();
        health.details.insert(
            "database".to_string(),
            HealthDetail {
                status: db_status,
                message: db_message,
                timestamp: Utc::now(),
            },
        );

        health.status = if health
            .details
            .values()
            .any(|detail| detail.status == HealthStatus::Down)
        {
            HealthStatus::Down
        } else if health
            .details
            .values()
            .any(|detail| detail.status == HealthStatus::Degraded)
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        };
    }
}

pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    let health = state.health_cache.read().await;

    (
        health.status.http_status(),
        Json(json!({
            "status": health.status,
            "version": health.version,
            "timestamp": health.timestamp,
        })),
    )
}

pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    state.update_health().await;
    let health = state.health_cache.read().await;

    (
        health.status.http_status(),
        Json(json!({
            "ready": health.status == HealthStatus::Up,
            "details": health.details,
            "timestamp": health.timestamp,
        })),
    )
}

pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "uptime_seconds": state.uptime(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Health endpoints, mounted under `/health`.
pub fn health_routes_with_state<S>(db_pool: Arc<DatabaseConnection>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let health_state = Arc::new(HealthState::new(db_pool));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(health_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_still_serves_traffic() {
        assert_eq!(HealthStatus::Degraded.http_status(), StatusCode::OK);
        assert_eq!(
            HealthStatus::Down.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(HealthStatus::Up).unwrap(),
            serde_json::json!("up")
        );
    }
}
