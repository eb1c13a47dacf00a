use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    errors::ApiError,
    services::shipping::{
        CreateShippingOptionRequest, SaveAddressRequest, UpdateShippingOptionRequest,
    },
    AppState,
};

/// `/shipping-options`: any signed-in user may list, admins edit.
pub fn shipping_option_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_shipping_options))
        .with_auth();

    let manage = Router::new()
        .route("/", post(create_shipping_option))
        .route("/:id", put(update_shipping_option))
        .with_permission(perm::SHIPPING_MANAGE);

    read.merge(manage)
}

/// `/addresses`: the caller's own address book.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route(
            "/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/:id/default", post(set_default_address))
        .with_permission(perm::ADDRESSES_MANAGE)
}

#[utoipa::path(
    get,
    path = "/api/v1/shipping-options",
    tag = "shipping",
    responses((status = 200, description = "Active shipping options, cheapest first")),
    security(("Bearer" = []))
)]
pub async fn list_shipping_options(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.shipping.list_active_options().await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipping-options",
    tag = "shipping",
    request_body = CreateShippingOptionRequest,
    responses(
        (status = 201, description = "Shipping option created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_shipping_option(
    State(state): State<AppState>,
    Json(payload): Json<CreateShippingOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(
        state.services.shipping.create_option(payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/shipping-options/{id}",
    tag = "shipping",
    params(("id" = Uuid, Path, description = "Shipping option id")),
    request_body = UpdateShippingOptionRequest,
    responses(
        (status = 200, description = "Shipping option updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_shipping_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShippingOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.shipping.update_option(id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses",
    tag = "addresses",
    responses((status = 200, description = "Saved addresses, default first")),
    security(("Bearer" = []))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.shipping.list_addresses(user.user_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/addresses",
    tag = "addresses",
    request_body = SaveAddressRequest,
    responses(
        (status = 201, description = "Address saved"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(
        state
            .services
            .shipping
            .create_address(user.user_id, payload)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses/{id}",
    tag = "addresses",
    params(("id" = Uuid, Path, description = "Address id")),
    responses(
        (status = 200, description = "Address"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.shipping.get_address(user.user_id, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/addresses/{id}",
    tag = "addresses",
    params(("id" = Uuid, Path, description = "Address id")),
    request_body = SaveAddressRequest,
    responses(
        (status = 200, description = "Address updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveAddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .shipping
            .update_address(user.user_id, id, payload)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/addresses/{id}/default",
    tag = "addresses",
    params(("id" = Uuid, Path, description = "Address id")),
    responses((status = 200, description = "Address is now the default")),
    security(("Bearer" = []))
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .shipping
            .set_default_address(user.user_id, id)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{id}",
    tag = "addresses",
    params(("id" = Uuid, Path, description = "Address id")),
    responses((status = 204, description = "Address deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .shipping
        .delete_address(user.user_id, id)
        .await?;
    Ok(no_content_response())
}
