use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use super::common::{created_response, success_response, MessageResponse};
use crate::{
    auth::{bearer_token, AuthRouterExt, AuthUser},
    errors::{ApiError, ServiceError},
    services::users::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserProfile},
    AppState,
};

/// `/auth` routes. Register and login are public; the rest need a token.
pub fn auth_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
        .route("/logout", post(logout))
        .with_auth();

    public.merge(protected)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.services.users.register(payload).await?;
    Ok(created_response(profile))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.services.users.login(payload).await?;
    Ok(success_response(response))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.users.me(user.user_id).await?))
}

#[utoipa::path(
    patch,
    path = "/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .services
        .users
        .update_profile(user.user_id, payload)
        .await?;
    Ok(success_response(profile))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;
    state
        .auth
        .revoke_token(token)
        .await
        .map_err(ServiceError::from)?;
    Ok(success_response(MessageResponse::new("Logged out")))
}
