use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt},
    errors::ApiError,
    services::discounts::{CreateCouponRequest, CreateGlobalDiscountRequest},
    AppState,
};

pub fn discount_routes() -> Router<AppState> {
    Router::new()
        .route("/global", get(list_global_discounts).post(create_global_discount))
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/:id/deactivate", post(deactivate_discount))
        .with_permission(perm::DISCOUNTS_MANAGE)
}

#[utoipa::path(
    get,
    path = "/api/v1/discounts/global",
    tag = "discounts",
    responses((status = 200, description = "Global discounts by priority")),
    security(("Bearer" = []))
)]
pub async fn list_global_discounts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.discounts.list_global().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/discounts/global",
    tag = "discounts",
    request_body = CreateGlobalDiscountRequest,
    responses(
        (status = 201, description = "Global discount created"),
        (status = 400, description = "Invalid discount rule", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_global_discount(
    State(state): State<AppState>,
    Json(payload): Json<CreateGlobalDiscountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(
        state.services.discounts.create_global(payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/discounts/coupons",
    tag = "discounts",
    responses((status = 200, description = "Coupons with redemption counts")),
    security(("Bearer" = []))
)]
pub async fn list_coupons(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.discounts.list_coupons().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/discounts/coupons",
    tag = "discounts",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created"),
        (status = 409, description = "Coupon code already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(payload): Json<CreateCouponRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(
        state.services.discounts.create_coupon(payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/discounts/{id}/deactivate",
    tag = "discounts",
    params(("id" = Uuid, Path, description = "Discount id")),
    responses(
        (status = 200, description = "Discount deactivated"),
        (status = 404, description = "Discount not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn deactivate_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.discounts.deactivate(id).await?))
}
