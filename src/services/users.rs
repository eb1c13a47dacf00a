use crate::{
    auth::{hash_password, resolve_role, verify_password, AuthError, AuthService, TokenResponse, TokenSubject},
    entities::{
        customer,
        employee,
        user::{self, AuthProvider, Entity as UserEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Employee name is required"))]
    pub employee_name: String,
    pub is_admin: bool,
}

/// The caller's account as returned by `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub auth_provider: AuthProvider,
    pub is_active: bool,
    pub role: String,
    pub is_employee: bool,
    pub is_admin: bool,
    pub employee_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: TokenResponse,
    pub user: UserProfile,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn duplicate_email(err: DbErr, email: &str) -> ServiceError {
    ServiceError::conflict_on_unique(err, format!("User with email {} already exists", email))
}

/// Returns the caller's customer profile, creating it on first use.
pub async fn ensure_customer<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<customer::Model, ServiceError> {
    if let Some(existing) = customer::Entity::find_by_id(user_id).one(conn).await? {
        return Ok(existing);
    }

    customer::Entity::insert(customer::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
    })
    .on_conflict(
        OnConflict::column(customer::Column::UserId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    customer::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::InternalError(format!("customer profile for {} missing", user_id)))
}

/// Account management: registration, login and staff provisioning.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            auth,
        }
    }

    /// Creates a local account and its customer profile.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<UserProfile, ServiceError> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        let email = request.email.clone();
        let password_hash = hash_password(&request.password)?;

        let txn = self.db.begin().await?;
        if self.find_by_email(&txn, &email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            password_hash: Set(Some(password_hash)),
            auth_provider: Set(AuthProvider::Local),
            display_name: Set(request.display_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_email(e, &email))?;
        ensure_customer(&txn, user.id).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::UserRegistered(user.id));
        info!(user_id = %user.id, "user registered");
        Ok(profile(user, None))
    }

    /// Verifies credentials and issues a bearer token for the resolved role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let user = self
            .find_by_email(&*self.db, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let Some(hash) = user.password_hash.as_deref() else {
            warn!(user_id = %user.id, "password login attempted for external account");
            return Err(AuthError::InvalidCredentials.into());
        };
        verify_password(&request.password, hash)?;
        if !user.is_active {
            return Err(ServiceError::Unauthorized("Account is disabled".to_string()));
        }

        let employee = employee::Entity::find_by_id(user.id).one(&*self.db).await?;
        let profile = profile(user, employee);
        let token = self.auth.generate_token(&TokenSubject {
            user_id: profile.id,
            email: profile.email.clone(),
            name: profile
                .employee_name
                .clone()
                .or_else(|| profile.display_name.clone()),
            role: profile.role.clone(),
        })?;

        info!(user_id = %profile.id, role = %profile.role, "user logged in");
        Ok(LoginResponse {
            token,
            user: profile,
        })
    }

    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        let (user, employee) = self.load(user_id).await?;
        Ok(profile(user, employee))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, ServiceError> {
        request.validate()?;
        let (user, employee) = self.load(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.display_name = Set(request
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()));
        active.updated_at = Set(Utc::now());
        let user = active.update(&*self.db).await?;

        info!(user_id = %user_id, "profile updated");
        Ok(profile(user, employee))
    }

    /// Provisions a staff account. Used by the `create-employee` binary.
    #[instrument(skip(self, request), fields(email = %request.email, is_admin = request.is_admin))]
    pub async fn create_employee(
        &self,
        mut request: CreateEmployeeRequest,
    ) -> Result<UserProfile, ServiceError> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        let email = request.email.clone();
        let password_hash = hash_password(&request.password)?;

        let txn = self.db.begin().await?;
        if self.find_by_email(&txn, &email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            password_hash: Set(Some(password_hash)),
            auth_provider: Set(AuthProvider::Local),
            display_name: Set(Some(request.employee_name.clone())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_email(e, &email))?;

        let employee = employee::ActiveModel {
            user_id: Set(user.id),
            employee_name: Set(request.employee_name),
            is_admin: Set(request.is_admin),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::EmployeeCreated {
            user_id: user.id,
            is_admin: employee.is_admin,
        });
        info!(user_id = %user.id, "employee created");
        Ok(profile(user, Some(employee)))
    }

    async fn load(
        &self,
        user_id: Uuid,
    ) -> Result<(user::Model, Option<employee::Model>), ServiceError> {
        let user = UserEntity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        let employee = employee::Entity::find_by_id(user_id).one(&*self.db).await?;
        Ok((user, employee))
    }

    async fn find_by_email<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<user::Model>, ServiceError> {
        Ok(UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await?)
    }
}

fn profile(user: user::Model, employee: Option<employee::Model>) -> UserProfile {
    let is_admin = employee.as_ref().map_or(false, |e| e.is_admin);
    UserProfile {
        role: resolve_role(employee.is_some(), is_admin).to_string(),
        is_employee: employee.is_some(),
        is_admin,
        employee_name: employee.map(|e| e.employee_name),
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        auth_provider: user.auth_provider,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}
