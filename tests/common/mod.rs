#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use printhub_api::{
    app_router,
    auth::{permissions_for_role, AuthConfig, AuthService, Claims},
    config::AppConfig,
    db,
    entities::{material, printing_model, saved_address, shipping_option, shipping_option::ShippingType},
    events::{self, EventSender},
    services::{
        materials::CreateMaterialRequest,
        models::{CreateModelRequest, ReviewRequest, Viewer},
        shipping::{CreateShippingOptionRequest, SaveAddressRequest},
        users::CreateEmployeeRequest,
    },
    AppState,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// A logged-in account with its bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Full application over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir");
        let db_path = db_dir.path().join("printhub_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "printhub_test_secret_key_0123456789_abcdefghijklmnopqrstuvwxyz".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));

        let state = AppState::new(
            Arc::new(pool),
            cfg,
            EventSender::new(event_tx),
            auth_service,
        );
        let router = app_router(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails")
    }

    /// Sends the request and asserts on the status before decoding the body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        user: &TestUser,
        expected: StatusCode,
    ) -> Value {
        let response = self.request(method.clone(), uri, body, Some(&user.token)).await;
        let status = response.status();
        let payload = response_json(response).await;
        assert_eq!(status, expected, "{method} {uri} -> {payload}");
        payload
    }

    /// Registers and logs in a customer through the HTTP API.
    pub async fn customer(&self, email: &str) -> TestUser {
        let response = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        self.login(email).await
    }

    /// Provisions a staff account the way the `create-employee` binary does.
    pub async fn employee(&self, email: &str, is_admin: bool) -> TestUser {
        self.state
            .services
            .users
            .create_employee(CreateEmployeeRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                employee_name: format!("Staff {email}"),
                is_admin,
            })
            .await
            .expect("employee");
        self.login(email).await
    }

    pub async fn login(&self, email: &str) -> TestUser {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        TestUser {
            id: body["user"]["id"].as_str().expect("user id").parse().expect("uuid"),
            email: email.to_string(),
            token: body["token"]["access_token"]
                .as_str()
                .expect("access token")
                .to_string(),
        }
    }

    /// Signs a token directly, bypassing login. `expires_in` may be negative.
    pub fn mint_token(&self, user_id: Uuid, role: &str, expires_in: Duration) -> String {
        let auth = &self.state.auth.config;
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: None,
            email: None,
            roles: vec![role.to_string()],
            permissions: permissions_for_role(role),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp() - 60,
            iss: auth.jwt_issuer.clone(),
            aud: auth.jwt_audience.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
        )
        .expect("token")
    }

    pub async fn seed_material(&self, name: &str, price_twd_g: Decimal) -> material::Model {
        self.state
            .services
            .materials
            .create(CreateMaterialRequest {
                name: name.to_string(),
                density_g_cm3: Decimal::new(124, 2),
                price_twd_g,
                is_active: Some(true),
            })
            .await
            .expect("material")
    }

    pub async fn seed_shipping_option(&self, name: &str, base_fee: Decimal) -> shipping_option::Model {
        self.state
            .services
            .shipping
            .create_option(CreateShippingOptionRequest {
                name: name.to_string(),
                shipping_type: ShippingType::HomeDelivery,
                base_fee,
                is_active: Some(true),
            })
            .await
            .expect("shipping option")
    }

    pub async fn seed_address(&self, user: &TestUser) -> saved_address::Model {
        self.state
            .services
            .shipping
            .create_address(
                user.id,
                SaveAddressRequest {
                    name: "Home".to_string(),
                    address_type: ShippingType::HomeDelivery,
                    address_details: "No. 7, Section 2, Zhongshan Rd, Taipei".to_string(),
                    is_default: true,
                },
            )
            .await
            .expect("address")
    }

    /// Creates a model owned by `owner`, sliced to `weight_g`, and pushes it
    /// through review so it is public.
    pub async fn seed_public_model(
        &self,
        owner: &TestUser,
        reviewer: &TestUser,
        weight_g: Option<u32>,
    ) -> printing_model::Model {
        let models = &self.state.services.models;
        let model = models
            .create(
                owner.id,
                CreateModelRequest {
                    model_name: "Desk Organizer".to_string(),
                    description: Some("Modular pen holder".to_string()),
                    category: Some("office".to_string()),
                    stl_file_path: "uploads/desk-organizer.stl".to_string(),
                    gcode_file_path: None,
                    slicing_info: weight_g.map(|w| json!({ "weight_g": w, "print_time_min": 95 })),
                },
            )
            .await
            .expect("model");
        models
            .submit_for_review(
                Viewer {
                    user_id: owner.id,
                    is_staff: false,
                },
                model.id,
            )
            .await
            .expect("submit");
        models
            .approve(reviewer.id, model.id, ReviewRequest::default())
            .await
            .expect("approve")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json body")
}

/// Reads a money value that serializes as a string.
pub fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a money value: {other}"),
    }
}
