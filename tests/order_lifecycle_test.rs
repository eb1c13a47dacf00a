mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TestUser};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

struct Fulfilment {
    app: TestApp,
    customer: TestUser,
    clerk: TestUser,
    material_id: Uuid,
    shipping_id: Uuid,
    model_id: Uuid,
}

impl Fulfilment {
    async fn new() -> Self {
        let app = TestApp::new().await;
        let customer = app.customer("buyer@example.com").await;
        let clerk = app.employee("clerk@example.com", false).await;
        let pla = app.seed_material("PLA", dec!(2.5)).await;
        let shipping = app.seed_shipping_option("Black Cat", dec!(60)).await;
        let model = app.seed_public_model(&clerk, &clerk, Some(40)).await;
        Self {
            app,
            customer,
            clerk,
            material_id: pla.id,
            shipping_id: shipping.id,
            model_id: model.id,
        }
    }

    /// Places a one-line order for `user` and returns its id.
    async fn order_for(&self, user: &TestUser) -> String {
        let app = &self.app;
        let address = app.seed_address(user).await;

        app.call(
            Method::POST,
            "/api/v1/cart",
            Some(json!({ "model_id": self.model_id, "material_id": self.material_id })),
            user,
            StatusCode::CREATED,
        )
        .await;
        let order = app
            .call(
                Method::POST,
                "/api/v1/orders",
                Some(json!({ "shipping_option_id": self.shipping_id, "saved_address_id": address.id })),
                user,
                StatusCode::CREATED,
            )
            .await;
        order["id"].as_str().unwrap().to_string()
    }

    async fn set_status(&self, id: &str, body: Value, expected: StatusCode) -> Value {
        self.app
            .call(
                Method::POST,
                &format!("/api/v1/staff/orders/{id}/status"),
                Some(body),
                &self.clerk,
                expected,
            )
            .await
    }
}

#[tokio::test]
async fn staff_walks_an_order_to_completion() {
    let f = Fulfilment::new().await;
    let id = f.order_for(&f.customer).await;

    for status in ["CONFIRMED", "PROCESSING", "PRINTING", "QUALITY_CHECK"] {
        let order = f
            .set_status(&id, json!({ "status": status }), StatusCode::OK)
            .await;
        assert_eq!(order["status"], status);
    }
    // Failed QC goes back to the printer.
    f.set_status(
        &id,
        json!({ "status": "PRINTING", "notes": "Layer shift on the lid" }),
        StatusCode::OK,
    )
    .await;
    for status in ["QUALITY_CHECK", "READY_TO_SHIP"] {
        f.set_status(&id, json!({ "status": status }), StatusCode::OK)
            .await;
    }
    let shipped = f
        .set_status(
            &id,
            json!({ "status": "SHIPPED", "tracking_number": "TW123456789" }),
            StatusCode::OK,
        )
        .await;
    assert_eq!(shipped["tracking_number"], "TW123456789");
    for status in ["DELIVERED", "COMPLETED"] {
        f.set_status(&id, json!({ "status": status }), StatusCode::OK)
            .await;
    }

    let detail = f
        .app
        .call(
            Method::GET,
            &format!("/api/v1/staff/orders/{id}"),
            None,
            &f.clerk,
            StatusCode::OK,
        )
        .await;
    let logs = detail["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 10);
    assert_eq!(logs[0]["previous_status"], "PENDING");
    assert_eq!(logs[0]["new_status"], "CONFIRMED");
    assert!(logs
        .iter()
        .all(|l| l["updated_by"] == f.clerk.id.to_string()));
    assert!(logs
        .iter()
        .any(|l| l["notes"] == "Layer shift on the lid"));

    // Customers see their order but not the staff log.
    let mine = f
        .app
        .call(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            None,
            &f.customer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(mine["status"], "COMPLETED");
    assert!(mine.get("logs").is_none());
}

#[tokio::test]
async fn illegal_transitions_are_refused() {
    let f = Fulfilment::new().await;
    let id = f.order_for(&f.customer).await;

    let error = f
        .set_status(&id, json!({ "status": "SHIPPED" }), StatusCode::BAD_REQUEST)
        .await;
    assert_eq!(
        error["message"],
        "Cannot change order status from PENDING to SHIPPED"
    );
    let error = f
        .set_status(&id, json!({ "status": "PENDING" }), StatusCode::BAD_REQUEST)
        .await;
    assert_eq!(error["message"], "Order is already PENDING");

    f.set_status(&id, json!({ "status": "CANCELLED" }), StatusCode::OK)
        .await;
    f.set_status(&id, json!({ "status": "CONFIRMED" }), StatusCode::BAD_REQUEST)
        .await;

    // Unknown statuses never reach the workflow.
    let response = f
        .app
        .request(
            Method::POST,
            &format!("/api/v1/staff/orders/{id}/status"),
            Some(json!({ "status": "LOST_IN_SPACE" })),
            Some(&f.clerk.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn customers_cancel_only_pending_orders() {
    let f = Fulfilment::new().await;
    let first = f.order_for(&f.customer).await;
    let second = f.order_for(&f.customer).await;

    let cancelled = f
        .app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{first}/cancel"),
            None,
            &f.customer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(cancelled["status"], "CANCELLED");
    let error = f
        .app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{first}/cancel"),
            None,
            &f.customer,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error["message"], "Only pending orders can be cancelled");

    f.set_status(&second, json!({ "status": "CONFIRMED" }), StatusCode::OK)
        .await;
    f.app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{second}/cancel"),
            None,
            &f.customer,
            StatusCode::BAD_REQUEST,
        )
        .await;
}

#[tokio::test]
async fn orders_are_private_to_their_customer() {
    let f = Fulfilment::new().await;
    let id = f.order_for(&f.customer).await;
    let snoop = f.app.customer("snoop@example.com").await;

    f.app
        .call(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            None,
            &snoop,
            StatusCode::NOT_FOUND,
        )
        .await;
    f.app
        .call(
            Method::POST,
            &format!("/api/v1/orders/{id}/cancel"),
            None,
            &snoop,
            StatusCode::NOT_FOUND,
        )
        .await;
    let theirs = f
        .app
        .call(Method::GET, "/api/v1/orders", None, &snoop, StatusCode::OK)
        .await;
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn staff_filter_and_assign_orders() {
    let f = Fulfilment::new().await;
    let pending = f.order_for(&f.customer).await;
    let confirmed = f.order_for(&f.customer).await;
    f.set_status(&confirmed, json!({ "status": "CONFIRMED" }), StatusCode::OK)
        .await;

    let all = f
        .app
        .call(Method::GET, "/api/v1/staff/orders", None, &f.clerk, StatusCode::OK)
        .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let filtered = f
        .app
        .call(
            Method::GET,
            "/api/v1/staff/orders?status=PENDING",
            None,
            &f.clerk,
            StatusCode::OK,
        )
        .await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], pending);
    assert_eq!(filtered[0]["item_count"], 1);

    let error = f
        .app
        .call(
            Method::POST,
            &format!("/api/v1/staff/orders/{pending}/assign"),
            Some(json!({ "assignee_id": f.customer.id })),
            &f.clerk,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert_eq!(error["message"], "Assignee must be an employee");

    let printer = f.app.employee("printer@example.com", false).await;
    let assigned = f
        .app
        .call(
            Method::POST,
            &format!("/api/v1/staff/orders/{pending}/assign"),
            Some(json!({ "assignee_id": printer.id })),
            &f.clerk,
            StatusCode::OK,
        )
        .await;
    assert_eq!(assigned["assignee_id"], printer.id.to_string());
}

#[tokio::test]
async fn ordered_models_cannot_be_deleted() {
    let f = Fulfilment::new().await;
    f.order_for(&f.customer).await;

    let models = f
        .app
        .call(Method::GET, "/api/v1/models/mine", None, &f.clerk, StatusCode::OK)
        .await;
    let model_id = models[0]["id"].as_str().unwrap();

    f.app
        .call(
            Method::DELETE,
            &format!("/api/v1/models/{model_id}"),
            None,
            &f.clerk,
            StatusCode::CONFLICT,
        )
        .await;
}
