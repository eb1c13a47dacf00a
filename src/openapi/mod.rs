use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PrintHub API",
        version = "1.0.0",
        description = r#"
# PrintHub marketplace API

Customers upload 3D models, pick a material, and order prints. Staff review
submitted models and move orders through the fulfilment workflow.

## Authentication

Register or log in under `/auth`, then send the token on every call:

```
Authorization: Bearer <your-jwt-token>
```

## Errors

Failures share one body shape:

```json
{
  "error": "Bad Request",
  "message": "Cart is empty",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "materials", description = "Printing materials and prices"),
        (name = "models", description = "3D model catalogue"),
        (name = "review", description = "Staff model review"),
        (name = "cart", description = "Shopping cart"),
        (name = "shipping", description = "Shipping options"),
        (name = "addresses", description = "Saved addresses"),
        (name = "orders", description = "Checkout and order history"),
        (name = "staff", description = "Order fulfilment"),
        (name = "discounts", description = "Global discounts and coupons")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::update_profile,
        crate::handlers::auth::logout,

        crate::handlers::materials::list_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::create_material,
        crate::handlers::materials::update_material,

        crate::handlers::models::list_models,
        crate::handlers::models::get_model,
        crate::handlers::models::model_review_logs,
        crate::handlers::models::create_model,
        crate::handlers::models::my_models,
        crate::handlers::models::update_model,
        crate::handlers::models::delete_model,
        crate::handlers::models::submit_model,
        crate::handlers::models::pending_models,
        crate::handlers::models::approve_model,
        crate::handlers::models::reject_model,
        crate::handlers::models::list_public_models,
        crate::handlers::models::view_public_model,

        crate::handlers::cart::list_cart,
        crate::handlers::cart::cart_summary,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::get_cart_item,
        crate::handlers::cart::update_cart_item,
        crate::handlers::cart::remove_cart_item,
        crate::handlers::cart::clear_cart,

        crate::handlers::shipping::list_shipping_options,
        crate::handlers::shipping::create_shipping_option,
        crate::handlers::shipping::update_shipping_option,
        crate::handlers::shipping::list_addresses,
        crate::handlers::shipping::create_address,
        crate::handlers::shipping::get_address,
        crate::handlers::shipping::update_address,
        crate::handlers::shipping::set_default_address,
        crate::handlers::shipping::delete_address,

        crate::handlers::orders::list_my_orders,
        crate::handlers::orders::place_order,
        crate::handlers::orders::get_my_order,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::validate_coupon,
        crate::handlers::orders::list_all_orders,
        crate::handlers::orders::get_any_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::assign_order,

        crate::handlers::discounts::list_global_discounts,
        crate::handlers::discounts::create_global_discount,
        crate::handlers::discounts::list_coupons,
        crate::handlers::discounts::create_coupon,
        crate::handlers::discounts::deactivate_discount,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::handlers::common::MessageResponse,
            crate::entities::order::OrderStatus,
            crate::entities::printing_model::VisibilityStatus,
            crate::entities::shipping_option::ShippingType,
            crate::entities::discount::WorksOn,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDocV1::openapi()) }),
    )
}
