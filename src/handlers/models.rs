use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser},
    errors::ApiError,
    services::models::{CreateModelRequest, ModelFilter, ReviewRequest, UpdateModelRequest, Viewer},
    AppState,
};

/// `/models`: browsing with optional auth, owner actions and staff review.
pub fn model_routes() -> Router<AppState> {
    let browse = Router::new()
        .route("/", get(list_models))
        .route("/:id", get(get_model))
        .route("/:id/review-logs", get(model_review_logs))
        .with_optional_auth();

    let owner = Router::new()
        .route("/", post(create_model))
        .route("/mine", get(my_models))
        .route("/:id", axum::routing::put(update_model).delete(delete_model))
        .route("/:id/submit", post(submit_model))
        .with_permission(perm::MODELS_MANAGE);

    let review = Router::new()
        .route("/pending", get(pending_models))
        .route("/:id/approve", post(approve_model))
        .route("/:id/reject", post(reject_model))
        .with_permission(perm::MODELS_REVIEW);

    browse.merge(owner).merge(review)
}

/// `/public-models`: anonymous catalogue of approved models.
pub fn public_model_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_models))
        .route("/:id", get(view_public_model))
}

#[utoipa::path(
    get,
    path = "/api/v1/models",
    tag = "models",
    params(ModelFilter),
    responses((status = 200, description = "Models visible to the caller"))
)]
pub async fn list_models(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(filter): Query<ModelFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.as_ref().map(Viewer::from);
    Ok(success_response(state.services.models.list(viewer, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/models/{id}",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model"),
        (status = 404, description = "Not found or not visible", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_model(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.as_ref().map(Viewer::from);
    Ok(success_response(state.services.models.get(viewer, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/models/{id}/review-logs",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    responses((status = 200, description = "Review history, newest first"))
)]
pub async fn model_review_logs(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = user.as_ref().map(Viewer::from);
    Ok(success_response(
        state.services.models.review_logs(viewer, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/models",
    tag = "models",
    request_body = CreateModelRequest,
    responses(
        (status = 201, description = "Private model created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_model(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(created_response(
        state.services.models.create(user.user_id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/models/mine",
    tag = "models",
    responses((status = 200, description = "Models owned by the caller")),
    security(("Bearer" = []))
)]
pub async fn my_models(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.models.my_models(user.user_id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/models/{id}",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = UpdateModelRequest,
    responses(
        (status = 200, description = "Model updated"),
        (status = 403, description = "Not the owner", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_model(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .models
            .update(Viewer::from(&user), id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/models/{id}",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 409, description = "Model is referenced by orders", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_model(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .models
        .delete(Viewer::from(&user), id)
        .await?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/models/{id}/submit",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model is pending review"),
        (status = 400, description = "Model cannot be submitted from its current status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn submit_model(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .models
            .submit_for_review(Viewer::from(&user), id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/models/pending",
    tag = "review",
    responses((status = 200, description = "Models awaiting review, oldest first")),
    security(("Bearer" = []))
)]
pub async fn pending_models(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.models.pending_review().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/models/{id}/approve",
    tag = "review",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Model published"),
        (status = 400, description = "Model is not pending", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn approve_model(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReviewRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = payload
        .map(|Json(body)| body)
        .unwrap_or(ReviewRequest { reason: None });
    Ok(success_response(
        state
            .services
            .models
            .approve(user.user_id, id, request)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/models/{id}/reject",
    tag = "review",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Model rejected"),
        (status = 400, description = "Model is not pending or no reason given", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn reject_model(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state
            .services
            .models
            .reject(user.user_id, id, payload)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/public-models",
    tag = "models",
    params(ModelFilter),
    responses((status = 200, description = "Approved models"))
)]
pub async fn list_public_models(
    State(state): State<AppState>,
    Query(filter): Query<ModelFilter>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.models.list_public(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/public-models/{id}",
    tag = "models",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 200, description = "Approved model; the view is counted"),
        (status = 404, description = "Not found or not public", body = crate::errors::ErrorResponse),
    )
)]
pub async fn view_public_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.models.view_public(id).await?))
}
