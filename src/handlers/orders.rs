use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    errors::ApiError,
    services::{
        checkout::{CouponPreview, PlaceOrderRequest, ValidateCouponRequest},
        orders::{AssignOrderRequest, OrderFilter, UpdateOrderStatusRequest},
    },
    AppState,
};

/// Customer order endpoints, mounted at `/orders`.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_orders).post(place_order))
        .route("/:id", get(get_my_order))
        .route("/:id/cancel", post(cancel_order))
        .with_permission(perm::ORDERS_PLACE)
}

/// Mounted at `/coupons`.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate_coupon))
        .with_permission(perm::ORDERS_PLACE)
}

/// Staff fulfilment endpoints, mounted at `/staff/orders`.
pub fn staff_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders))
        .route("/:id", get(get_any_order))
        .route("/:id/status", post(update_order_status))
        .route("/:id/assign", post(assign_order))
        .with_permission(perm::ORDERS_MANAGE)
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    responses((status = 200, description = "The caller's orders, newest first")),
    security(("Bearer" = []))
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.orders.list_for_customer(user.user_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed from the cart"),
        (status = 400, description = "Empty cart, invalid shipping option, address or coupon", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .checkout
        .place_order(user.user_id, payload)
        .await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items and discounts"),
        (status = 404, description = "Not one of the caller's orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_my_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .orders
            .get_for_customer(user.user_id, id)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 400, description = "Order is no longer pending", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.orders.cancel(user.user_id, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/coupons/validate",
    tag = "orders",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Coupon applies to the current cart", body = CouponPreview),
        (status = 400, description = "Coupon cannot be used", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ValidateCouponRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .checkout
            .preview_coupon(user.user_id, payload)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/orders",
    tag = "staff",
    params(OrderFilter),
    responses((status = 200, description = "All orders, newest first")),
    security(("Bearer" = []))
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.orders.list_all(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/orders/{id}",
    tag = "staff",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items, discounts and status history"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_any_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.orders.get_any(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/orders/{id}/status",
    tag = "staff",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed and logged"),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .orders
            .update_status(user.user_id, id, payload)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/orders/{id}/assign",
    tag = "staff",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = AssignOrderRequest,
    responses(
        (status = 200, description = "Order assigned"),
        (status = 400, description = "Assignee is not an employee", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assign_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .orders
            .assign(user.user_id, id, payload)
            .await?,
    ))
}
