//! PrintHub API Library
//!
//! Order management backend for a 3D-printing marketplace: model catalogue
//! and review, cart, checkout with discounts, and order fulfilment.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
    pub auth: Arc<auth::AuthService>,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        auth: Arc<auth::AuthService>,
    ) -> Self {
        let event_sender = Arc::new(event_sender);
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), auth.clone());
        Self {
            db,
            config,
            event_sender,
            services,
            auth,
        }
    }
}

/// Everything mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .nest("/materials", handlers::materials::material_routes())
        .nest("/models", handlers::models::model_routes())
        .nest("/public-models", handlers::models::public_model_routes())
        .nest("/cart", handlers::cart::cart_routes())
        .nest("/shipping-options", handlers::shipping::shipping_option_routes())
        .nest("/addresses", handlers::shipping::address_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/coupons", handlers::orders::coupon_routes())
        .nest("/staff/orders", handlers::orders::staff_order_routes())
        .nest("/discounts", handlers::discounts::discount_routes())
}

/// The complete HTTP application: API, auth, health and the OpenAPI document,
/// wrapped in the shared middleware stack.
pub fn app_router(state: AppState, cors: CorsLayer) -> Router {
    let auth_service = state.auth.clone();
    let db = state.db.clone();

    Router::new()
        .route("/", get(|| async { "printhub-api up" }))
        .nest("/api/v1", api_v1_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/health", health::health_routes_with_state(db))
        .merge(openapi::openapi_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Auth middleware reads the service from request extensions
        .layer(Extension(auth_service))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "printhub-api",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
