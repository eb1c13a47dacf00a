use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt},
    errors::ApiError,
    services::materials::{CreateMaterialRequest, UpdateMaterialRequest},
    AppState,
};

pub fn material_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_materials))
        .route("/:id", get(get_material));

    let admin = Router::new()
        .route("/", post(create_material))
        .route("/:id", put(update_material))
        .with_permission(perm::MATERIALS_MANAGE);

    public.merge(admin)
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    tag = "materials",
    responses((status = 200, description = "Active materials ordered by name"))
)]
pub async fn list_materials(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.materials.list_active().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    tag = "materials",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material"),
        (status = 404, description = "Unknown or inactive material", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.materials.get_active(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    tag = "materials",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<CreateMaterialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(state.services.materials.create(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/materials/{id}",
    tag = "materials",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Material updated"),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.materials.update(id, payload).await?,
    ))
}
