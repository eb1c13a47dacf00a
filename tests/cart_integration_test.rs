mod common;

use axum::http::{Method, StatusCode};
use common::{money, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

#[tokio::test]
async fn adding_the_same_job_twice_merges_quantities() {
    let app = TestApp::new().await;
    let customer = app.customer("cart@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let model = app.seed_public_model(&reviewer, &reviewer, Some(40)).await;

    let first = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id })),
            &customer,
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(first["quantity"], 1);
    assert_eq!(money(&first["estimated_price"]), dec!(100));

    let merged = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({
                "model_id": model.id,
                "material_id": pla.id,
                "quantity": 2,
                "notes": "Matte finish please"
            })),
            &customer,
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(merged["id"], first["id"]);
    assert_eq!(merged["quantity"], 3);
    assert_eq!(merged["notes"], "Matte finish please");

    let summary = app
        .call(Method::GET, "/api/v1/cart/summary", None, &customer, StatusCode::OK)
        .await;
    assert_eq!(summary["items"].as_array().unwrap().len(), 1);
    assert_eq!(summary["total_items"], 3);
    assert_eq!(money(&summary["estimated_total"]), dec!(300));
}

#[tokio::test]
async fn quantity_must_be_positive() {
    let app = TestApp::new().await;
    let customer = app.customer("qty@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let model = app.seed_public_model(&reviewer, &reviewer, Some(40)).await;

    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": model.id, "material_id": pla.id, "quantity": 0 })),
        &customer,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let line = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id })),
            &customer,
            StatusCode::CREATED,
        )
        .await;
    let uri = format!("/api/v1/cart/{}", line["id"].as_str().unwrap());

    app.call(
        Method::PATCH,
        &uri,
        Some(json!({ "quantity": -1 })),
        &customer,
        StatusCode::BAD_REQUEST,
    )
    .await;
    let updated = app
        .call(
            Method::PATCH,
            &uri,
            Some(json!({ "quantity": 5 })),
            &customer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["quantity"], 5);
    assert_eq!(money(&updated["estimated_price"]), dec!(500));
}

#[tokio::test]
async fn unsliced_models_have_no_estimate() {
    let app = TestApp::new().await;
    let customer = app.customer("raw@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let model = app.seed_public_model(&reviewer, &reviewer, None).await;

    let line = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id })),
            &customer,
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(line["estimated_price"], Value::Null);

    let summary = app
        .call(Method::GET, "/api/v1/cart/summary", None, &customer, StatusCode::OK)
        .await;
    assert_eq!(money(&summary["estimated_total"]), dec!(0));
}

#[tokio::test]
async fn cart_rejects_hidden_models_and_inactive_materials() {
    let app = TestApp::new().await;
    let customer = app.customer("picky@example.com").await;
    let designer = app.customer("designer@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let admin = app.employee("admin@example.com", true).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let public = app.seed_public_model(&designer, &reviewer, Some(40)).await;

    let private = app
        .call(
            Method::POST,
            "/api/v1/models",
            Some(json!({ "model_name": "Prototype", "stl_file_path": "uploads/proto.stl" })),
            &designer,
            StatusCode::CREATED,
        )
        .await;
    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": private["id"], "material_id": pla.id })),
        &customer,
        StatusCode::NOT_FOUND,
    )
    .await;
    // Owners may print their own private models.
    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": private["id"], "material_id": pla.id })),
        &designer,
        StatusCode::CREATED,
    )
    .await;

    app.call(
        Method::PUT,
        &format!("/api/v1/materials/{}", pla.id),
        Some(json!({ "is_active": false })),
        &admin,
        StatusCode::OK,
    )
    .await;
    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": public.id, "material_id": pla.id })),
        &customer,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let response = app
        .request(Method::GET, &format!("/api/v1/materials/{}", pla.id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.request(Method::GET, "/api/v1/materials", None, None).await;
    assert!(response_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cart_lines_belong_to_their_customer() {
    let app = TestApp::new().await;
    let alice = app.customer("alice@example.com").await;
    let bob = app.customer("bob@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let petg = app.seed_material("PETG", dec!(3)).await;
    let model = app.seed_public_model(&reviewer, &reviewer, Some(40)).await;

    let line = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id })),
            &alice,
            StatusCode::CREATED,
        )
        .await;
    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": model.id, "material_id": petg.id })),
        &alice,
        StatusCode::CREATED,
    )
    .await;
    let uri = format!("/api/v1/cart/{}", line["id"].as_str().unwrap());

    app.call(Method::GET, &uri, None, &bob, StatusCode::NOT_FOUND)
        .await;
    app.call(Method::DELETE, &uri, None, &bob, StatusCode::NOT_FOUND)
        .await;
    let bob_cart = app
        .call(Method::GET, "/api/v1/cart", None, &bob, StatusCode::OK)
        .await;
    assert!(bob_cart.as_array().unwrap().is_empty());

    app.call(Method::DELETE, &uri, None, &alice, StatusCode::NO_CONTENT)
        .await;
    let cleared = app
        .call(Method::DELETE, "/api/v1/cart/clear", None, &alice, StatusCode::OK)
        .await;
    assert_eq!(cleared["removed"], 1);
    assert_eq!(cleared["message"], "Cleared 1 items from cart");

    let cart = app
        .call(Method::GET, "/api/v1/cart", None, &alice, StatusCode::OK)
        .await;
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn merged_quantity_cannot_exceed_the_line_limit() {
    let app = TestApp::new().await;
    let customer = app.customer("bulk@example.com").await;
    let reviewer = app.employee("reviewer@example.com", false).await;
    let pla = app.seed_material("PLA", dec!(2.5)).await;
    let model = app.seed_public_model(&reviewer, &reviewer, Some(40)).await;

    app.call(
        Method::POST,
        "/api/v1/cart",
        Some(json!({ "model_id": model.id, "material_id": pla.id, "quantity": i32::MAX })),
        &customer,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let line = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id, "quantity": 600 })),
            &customer,
            StatusCode::CREATED,
        )
        .await;
    let error = app
        .call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": model.id, "material_id": pla.id, "quantity": 600 })),
            &customer,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error["message"], "Quantity cannot exceed 1000.");

    let uri = format!("/api/v1/cart/{}", line["id"].as_str().unwrap());
    let unchanged = app
        .call(Method::GET, &uri, None, &customer, StatusCode::OK)
        .await;
    assert_eq!(unchanged["quantity"], 600);
    app.call(
        Method::PATCH,
        &uri,
        Some(json!({ "quantity": i32::MAX })),
        &customer,
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn models_with_unpriceable_weights_are_refused() {
    let app = TestApp::new().await;
    let designer = app.customer("heavy@example.com").await;

    for weight in [json!("79228162514264337593543950335"), json!(100_001), json!("lots")] {
        app.call(
            Method::POST,
            "/api/v1/models",
            Some(json!({
                "model_name": "Anvil",
                "stl_file_path": "uploads/anvil.stl",
                "slicing_info": { "weight_g": weight }
            })),
            &designer,
            StatusCode::BAD_REQUEST,
        )
        .await;
    }

    let model = app
        .call(
            Method::POST,
            "/api/v1/models",
            Some(json!({ "model_name": "Anvil", "stl_file_path": "uploads/anvil.stl" })),
            &designer,
            StatusCode::CREATED,
        )
        .await;
    app.call(
        Method::PUT,
        &format!("/api/v1/models/{}", model["id"].as_str().unwrap()),
        Some(json!({ "slicing_info": { "weight_g": "79228162514264337593543950335" } })),
        &designer,
        StatusCode::BAD_REQUEST,
    )
    .await;
}
