mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp, TestUser};
use serde_json::{json, Value};

async fn upload(app: &TestApp, owner: &TestUser, name: &str) -> Value {
    app.call(
        Method::POST,
        "/api/v1/models",
        Some(json!({
            "model_name": name,
            "description": "Articulated, print-in-place",
            "category": "Toys",
            "stl_file_path": format!("uploads/{name}.stl"),
            "slicing_info": { "weight_g": 32, "layer_height_mm": 0.2 }
        })),
        owner,
        StatusCode::CREATED,
    )
    .await
}

#[tokio::test]
async fn private_models_are_hidden_from_others() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let other = app.customer("other@example.com").await;

    let model = upload(&app, &owner, "dragon").await;
    assert_eq!(model["visibility_status"], "PRIVATE");
    assert_eq!(model["view_count"], 0);
    let uri = format!("/api/v1/models/{}", model["id"].as_str().unwrap());

    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    app.call(Method::GET, &uri, None, &other, StatusCode::NOT_FOUND)
        .await;
    app.call(Method::GET, &uri, None, &owner, StatusCode::OK)
        .await;

    let mine = app
        .call(Method::GET, "/api/v1/models/mine", None, &owner, StatusCode::OK)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let response = app.request(Method::GET, "/api/v1/models", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn review_cycle_reject_then_approve() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;

    let model = upload(&app, &owner, "flexi-rex").await;
    let id = model["id"].as_str().unwrap().to_string();

    // Only owners submit, and only private or rejected models.
    app.call(
        Method::POST,
        &format!("/api/v1/models/{id}/approve"),
        None,
        &reviewer,
        StatusCode::BAD_REQUEST,
    )
    .await;
    let submitted = app
        .call(
            Method::POST,
            &format!("/api/v1/models/{id}/submit"),
            None,
            &owner,
            StatusCode::OK,
        )
        .await;
    assert_eq!(submitted["visibility_status"], "PENDING");
    app.call(
        Method::POST,
        &format!("/api/v1/models/{id}/submit"),
        None,
        &owner,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let queue = app
        .call(
            Method::GET,
            "/api/v1/models/pending",
            None,
            &reviewer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(queue.as_array().unwrap().len(), 1);
    app.call(
        Method::GET,
        "/api/v1/models/pending",
        None,
        &owner,
        StatusCode::FORBIDDEN,
    )
    .await;

    // Staff see pending models they do not own.
    app.call(
        Method::GET,
        &format!("/api/v1/models/{id}"),
        None,
        &reviewer,
        StatusCode::OK,
    )
    .await;

    app.call(
        Method::POST,
        &format!("/api/v1/models/{id}/reject"),
        Some(json!({})),
        &reviewer,
        StatusCode::BAD_REQUEST,
    )
    .await;
    let rejected = app
        .call(
            Method::POST,
            &format!("/api/v1/models/{id}/reject"),
            Some(json!({ "reason": "Wall thickness below 0.8mm" })),
            &reviewer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(rejected["visibility_status"], "REJECTED");

    app.call(
        Method::POST,
        &format!("/api/v1/models/{id}/submit"),
        None,
        &owner,
        StatusCode::OK,
    )
    .await;
    let approved = app
        .call(
            Method::POST,
            &format!("/api/v1/models/{id}/approve"),
            None,
            &reviewer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(approved["visibility_status"], "PUBLIC");

    let logs = app
        .call(
            Method::GET,
            &format!("/api/v1/models/{id}/review-logs"),
            None,
            &owner,
            StatusCode::OK,
        )
        .await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 4);
    let reasons: Vec<_> = logs.iter().filter_map(|l| l["reason"].as_str()).collect();
    assert!(reasons.contains(&"Wall thickness below 0.8mm"));
    assert!(reasons.contains(&"Approved"));
    let reviewed_by_staff = logs
        .iter()
        .filter(|l| l["reviewer_id"] == reviewer.id.to_string())
        .count();
    assert_eq!(reviewed_by_staff, 2);
}

#[tokio::test]
async fn public_catalogue_counts_views() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let model = app.seed_public_model(&owner, &reviewer, Some(40)).await;

    let uri = format!("/api/v1/public-models/{}", model.id);
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.request(Method::GET, &uri, None, None).await;
    let body = response_json(response).await;
    assert_eq!(body["view_count"], 2);

    let response = app
        .request(
            Method::GET,
            "/api/v1/public-models?search=ORGANIZER&category=office",
            None,
            None,
        )
        .await;
    let listing = response_json(response).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, "/api/v1/public-models?search=vase", None, None)
        .await;
    let listing = response_json(response).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_owners_edit_or_delete_models() {
    let app = TestApp::new().await;
    let owner = app.customer("owner@example.com").await;
    let other = app.customer("other@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let model = app.seed_public_model(&owner, &reviewer, Some(40)).await;
    let uri = format!("/api/v1/models/{}", model.id);

    app.call(
        Method::PUT,
        &uri,
        Some(json!({ "model_name": "Mine now" })),
        &other,
        StatusCode::FORBIDDEN,
    )
    .await;
    app.call(Method::DELETE, &uri, None, &other, StatusCode::FORBIDDEN)
        .await;

    let updated = app
        .call(
            Method::PUT,
            &uri,
            Some(json!({ "model_name": "Desk Organizer v2" })),
            &owner,
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["model_name"], "Desk Organizer v2");

    app.call(Method::DELETE, &uri, None, &owner, StatusCode::NO_CONTENT)
        .await;
    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_token_on_browse_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/v1/models", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
