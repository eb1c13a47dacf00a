mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{response_json, TestApp, PASSWORD};
use printhub_api::auth::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_EMPLOYEE};
use serde_json::json;

#[tokio::test]
async fn register_login_and_read_profile() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({
                "email": "  Maker@Example.com ",
                "password": PASSWORD,
                "display_name": "Maker"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let profile = response_json(response).await;
    assert_eq!(profile["email"], "maker@example.com");
    assert_eq!(profile["role"], ROLE_CUSTOMER);
    assert_eq!(profile["is_employee"], false);
    assert!(profile.get("password_hash").is_none());

    let user = app.login("MAKER@example.com").await;
    let me = app
        .call(Method::GET, "/auth/me", None, &user, StatusCode::OK)
        .await;
    assert_eq!(me["id"], user.id.to_string());
    assert_eq!(me["display_name"], "Maker");
}

#[tokio::test]
async fn padded_emails_are_trimmed_before_validation() {
    let app = TestApp::new().await;

    let clerk = app.employee("  Clerk@Example.COM ", false).await;
    let me = app
        .call(Method::GET, "/auth/me", None, &clerk, StatusCode::OK)
        .await;
    assert_eq!(me["email"], "clerk@example.com");

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({ "email": "   ", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.customer("dup@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({ "email": "DUP@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_rejects_weak_input() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({ "email": "not-an-email", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            Some(json!({ "email": "short@example.com", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.customer("who@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "who@example.com", "password": "not-the-password" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_roles_are_resolved_at_login() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": "clerk@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let clerk = app.employee("clerk@example.com", false).await;
    let boss = app.employee("boss@example.com", true).await;

    let me = app
        .call(Method::GET, "/auth/me", None, &clerk, StatusCode::OK)
        .await;
    assert_eq!(me["role"], ROLE_EMPLOYEE);
    assert_eq!(me["is_employee"], true);
    assert_eq!(me["is_admin"], false);

    let me = app
        .call(Method::GET, "/auth/me", None, &boss, StatusCode::OK)
        .await;
    assert_eq!(me["role"], ROLE_ADMIN);
    assert_eq!(me["is_admin"], true);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/cart", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some("garbage.token.value"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user = app.customer("late@example.com").await;
    let expired = app.mint_token(user.id, ROLE_CUSTOMER, Duration::hours(-2));
    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some(&expired))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new().await;
    let user = app.customer("bye@example.com").await;

    app.call(Method::POST, "/auth/logout", None, &user, StatusCode::OK)
        .await;

    let response = app
        .request(Method::GET, "/auth/me", None, Some(&user.token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_reach_staff_routes() {
    let app = TestApp::new().await;
    let customer = app.customer("shopper@example.com").await;
    let clerk = app.employee("clerk@example.com", false).await;

    app.call(
        Method::GET,
        "/api/v1/staff/orders",
        None,
        &customer,
        StatusCode::FORBIDDEN,
    )
    .await;
    app.call(Method::GET, "/api/v1/staff/orders", None, &clerk, StatusCode::OK)
        .await;

    // Discount management is admin-only.
    app.call(
        Method::GET,
        "/api/v1/discounts/global",
        None,
        &clerk,
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[tokio::test]
async fn update_profile_changes_display_name() {
    let app = TestApp::new().await;
    let user = app.customer("rename@example.com").await;

    let profile = app
        .call(
            Method::PATCH,
            "/auth/profile",
            Some(json!({ "display_name": "  New Name  " })),
            &user,
            StatusCode::OK,
        )
        .await;
    assert_eq!(profile["display_name"], "New Name");
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"].get("/api/v1/orders").is_some());

    let response = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let status = response_json(response).await;
    assert_eq!(status["environment"], "test");
}
