mod common;

use axum::http::{Method, StatusCode};
use common::{money, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

fn address(name: &str, is_default: bool) -> serde_json::Value {
    json!({
        "name": name,
        "address_type": "CONVENIENCE_STORE",
        "address_details": format!("{name} store #1024, Taichung"),
        "is_default": is_default
    })
}

#[tokio::test]
async fn only_one_default_address_per_customer() {
    let app = TestApp::new().await;
    let user = app.customer("addr@example.com").await;

    let home = app
        .call(
            Method::POST,
            "/api/v1/addresses",
            Some(address("Home", true)),
            &user,
            StatusCode::CREATED,
        )
        .await;
    let office = app
        .call(
            Method::POST,
            "/api/v1/addresses",
            Some(address("Office", true)),
            &user,
            StatusCode::CREATED,
        )
        .await;

    let list = app
        .call(Method::GET, "/api/v1/addresses", None, &user, StatusCode::OK)
        .await;
    let list = list.as_array().expect("array");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], office["id"]);
    assert_eq!(list[0]["is_default"], true);
    assert_eq!(list[1]["is_default"], false);

    let uri = format!("/api/v1/addresses/{}/default", home["id"].as_str().unwrap());
    let updated = app.call(Method::POST, &uri, None, &user, StatusCode::OK).await;
    assert_eq!(updated["is_default"], true);

    let list = app
        .call(Method::GET, "/api/v1/addresses", None, &user, StatusCode::OK)
        .await;
    let defaults: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["id"], home["id"]);
}

#[tokio::test]
async fn addresses_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let alice = app.customer("alice@example.com").await;
    let bob = app.customer("bob@example.com").await;

    let created = app
        .call(
            Method::POST,
            "/api/v1/addresses",
            Some(address("Home", false)),
            &alice,
            StatusCode::CREATED,
        )
        .await;
    let uri = format!("/api/v1/addresses/{}", created["id"].as_str().unwrap());

    app.call(Method::GET, &uri, None, &bob, StatusCode::NOT_FOUND)
        .await;
    app.call(
        Method::PUT,
        &uri,
        Some(address("Stolen", false)),
        &bob,
        StatusCode::NOT_FOUND,
    )
    .await;
    app.call(Method::DELETE, &uri, None, &bob, StatusCode::NOT_FOUND)
        .await;

    let updated = app
        .call(
            Method::PUT,
            &uri,
            Some(address("Parents", false)),
            &alice,
            StatusCode::OK,
        )
        .await;
    assert_eq!(updated["name"], "Parents");

    app.call(Method::DELETE, &uri, None, &alice, StatusCode::NO_CONTENT)
        .await;
    app.call(Method::GET, &uri, None, &alice, StatusCode::NOT_FOUND)
        .await;
}

#[tokio::test]
async fn address_requires_details() {
    let app = TestApp::new().await;
    let user = app.customer("blank@example.com").await;

    app.call(
        Method::POST,
        "/api/v1/addresses",
        Some(json!({
            "name": "Nowhere",
            "address_type": "HOME_DELIVERY",
            "address_details": ""
        })),
        &user,
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn shipping_options_are_managed_by_admins() {
    let app = TestApp::new().await;
    let admin = app.employee("admin@example.com", true).await;
    let clerk = app.employee("clerk@example.com", false).await;
    let customer = app.customer("buyer@example.com").await;

    let body = json!({ "name": "Express", "type": "HOME_DELIVERY", "base_fee": "120" });
    app.call(
        Method::POST,
        "/api/v1/shipping-options",
        Some(body.clone()),
        &clerk,
        StatusCode::FORBIDDEN,
    )
    .await;
    let express = app
        .call(
            Method::POST,
            "/api/v1/shipping-options",
            Some(body),
            &admin,
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(express["type"], "HOME_DELIVERY");
    app.seed_shipping_option("Store pickup", dec!(60)).await;

    let options = app
        .call(
            Method::GET,
            "/api/v1/shipping-options",
            None,
            &customer,
            StatusCode::OK,
        )
        .await;
    let fees: Vec<_> = options
        .as_array()
        .unwrap()
        .iter()
        .map(|o| money(&o["base_fee"]))
        .collect();
    assert_eq!(fees, vec![dec!(60), dec!(120)]);

    let uri = format!(
        "/api/v1/shipping-options/{}",
        express["id"].as_str().unwrap()
    );
    app.call(
        Method::PUT,
        &uri,
        Some(json!({ "is_active": false })),
        &admin,
        StatusCode::OK,
    )
    .await;

    let options = app
        .call(
            Method::GET,
            "/api/v1/shipping-options",
            None,
            &customer,
            StatusCode::OK,
        )
        .await;
    assert_eq!(options.as_array().unwrap().len(), 1);
}
