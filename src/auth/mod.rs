/*!
 * # Authentication and Authorization Module
 *
 * Bearer JWT authentication plus role-based access control. Tokens carry the
 * caller's role (`customer`, `employee` or `admin`) and the permissions that
 * role grants at issue time; route groups are gated with [`AuthRouterExt`].
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

mod password;
mod permissions;
mod rbac;

pub use password::{hash_password, verify_password};
pub use permissions::consts;
pub use rbac::*;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub name: Option<String>,     // Display or employee name
    pub email: Option<String>,    // User's email
    pub roles: Vec<String>,       // Resolved role
    pub permissions: Vec<String>, // Permissions granted by the role
    pub jti: String,              // JWT ID, used for revocation
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Checks a permission, honouring `resource:*` and `*` grants.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, permission))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Employees and admins both count as staff.
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_EMPLOYEE)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Identity a token is minted for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

/// Token issuance, validation and revocation.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Mint an access token for `subject` carrying its role's permissions.
    pub fn generate_token(&self, subject: &TokenSubject) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: subject.user_id.to_string(),
            name: subject.name.clone(),
            email: Some(subject.email.clone()),
            roles: vec![subject.role.clone()],
            permissions: permissions_for_role(&subject.role),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            role: subject.role.clone(),
        })
    }

    /// Validate a JWT token and extract the claims
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Revoke a token until it would have expired anyway.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;
        let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(BlacklistedToken {
            jti: claims.jti,
            expiry,
        });
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);
        debug!(revoked = blacklist.len(), "token revoked");
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }
}

/// Token issued by register/login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token has been revoked")]
    RevokedToken,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Could not issue token".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for crate::errors::ServiceError {
    fn from(err: AuthError) -> Self {
        use crate::errors::ServiceError;
        match err {
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
            AuthError::InternalError(msg) => ServiceError::InternalError(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

/// Permission middleware; admins pass every permission check.
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.is_admin() && !user.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.is_admin() && !user.has_role(&required_role) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware: requires a valid bearer token.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => AuthError::MissingAuth.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Like [`auth_middleware`], but lets anonymous requests through. A token
/// that is present but invalid is still rejected.
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(auth_service) = request.extensions().get::<Arc<AuthService>>().cloned() else {
        return next.run(request).await;
    };

    match extract_auth_from_headers(request.headers(), &auth_service).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Handlers take `AuthUser` (or `Option<AuthUser>` behind optional auth) as an
/// extractor; the auth middleware has already validated the token.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Pulls the bearer token out of the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<Option<AuthUser>, AuthError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let claims = auth_service.validate_token(token).await?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

    Ok(Some(AuthUser {
        user_id,
        name: claims.name,
        email: claims.email,
        roles: claims.roles,
        permissions: claims.permissions,
        token_id: claims.jti,
    }))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_optional_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_optional_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(optional_auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }

    fn with_role(self, role: &str) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "k".repeat(32) + &"Q7z".repeat(12),
            "printhub-api".into(),
            "printhub-clients".into(),
            Duration::from_secs(600),
        ))
    }

    fn subject(role: &str) -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            email: "maker@example.com".into(),
            name: None,
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn issued_token_round_trips_role_and_permissions() {
        let svc = service();
        let subject = subject(ROLE_EMPLOYEE);
        let token = svc.generate_token(&subject).unwrap();

        let claims = svc.validate_token(&token.access_token).await.unwrap();
        assert_eq!(claims.sub, subject.user_id.to_string());
        assert_eq!(claims.roles, vec![ROLE_EMPLOYEE.to_string()]);
        assert!(claims.permissions.iter().any(|p| p == consts::MODELS_REVIEW));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let svc = service();
        let token = svc.generate_token(&subject(ROLE_CUSTOMER)).unwrap();

        svc.revoke_token(&token.access_token).await.unwrap();
        assert_matches!(
            svc.validate_token(&token.access_token).await,
            Err(AuthError::RevokedToken)
        );
    }

    #[tokio::test]
    async fn token_for_other_audience_is_rejected() {
        let svc = service();
        let mut other_cfg = svc.config.clone();
        other_cfg.jwt_audience = "someone-else".into();
        let other = AuthService::new(other_cfg);

        let token = other.generate_token(&subject(ROLE_CUSTOMER)).unwrap();
        assert_matches!(
            svc.validate_token(&token.access_token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn staff_detection_follows_roles() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            name: None,
            email: None,
            roles: vec![ROLE_EMPLOYEE.into()],
            permissions: permissions_for_role(ROLE_EMPLOYEE),
            token_id: "t".into(),
        };
        assert!(user.is_staff());
        assert!(!user.is_admin());
        assert!(user.has_permission(consts::ORDERS_MANAGE));
        assert!(!user.has_permission(consts::DISCOUNTS_MANAGE));
    }
}
