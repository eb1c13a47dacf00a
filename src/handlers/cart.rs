use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    errors::ApiError,
    services::{
        cart::{AddCartItemRequest, CartItemView, CartSummary, ClearCartResponse, UpdateCartItemRequest},
        models::Viewer,
    },
    AppState,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cart).post(add_to_cart))
        .route("/summary", get(cart_summary))
        .route("/clear", delete(clear_cart))
        .route(
            "/:id",
            get(get_cart_item).patch(update_cart_item).delete(remove_cart_item),
        )
        .with_permission(perm::CART_MANAGE)
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "cart",
    responses((status = 200, description = "Cart lines, oldest first", body = [CartItemView])),
    security(("Bearer" = []))
)]
pub async fn list_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.cart.list(user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart/summary",
    tag = "cart",
    responses((status = 200, description = "Cart totals", body = CartSummary)),
    security(("Bearer" = []))
)]
pub async fn cart_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.cart.summary(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart",
    tag = "cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Line added or merged", body = CartItemView),
        (status = 400, description = "Invalid quantity or unavailable material", body = crate::errors::ErrorResponse),
        (status = 404, description = "Model not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state
        .services
        .cart
        .add(Viewer::from(&user), payload)
        .await?;
    Ok(created_response(line))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart/{id}",
    tag = "cart",
    params(("id" = Uuid, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Cart line", body = CartItemView),
        (status = 404, description = "Not in the caller's cart", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.cart.get(user.user_id, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/cart/{id}",
    tag = "cart",
    params(("id" = Uuid, Path, description = "Cart item id")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Line updated", body = CartItemView),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state
        .services
        .cart
        .update(user.user_id, id, payload)
        .await?;
    Ok(success_response(line))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/{id}",
    tag = "cart",
    params(("id" = Uuid, Path, description = "Cart item id")),
    responses((status = 204, description = "Line removed")),
    security(("Bearer" = []))
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.cart.remove(user.user_id, id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/clear",
    tag = "cart",
    responses((status = 200, description = "Cart emptied", body = ClearCartResponse)),
    security(("Bearer" = []))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.cart.clear(user.user_id).await?))
}
