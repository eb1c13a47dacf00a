use crate::{
    entities::material::{self, Entity as MaterialEntity},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must_be_non_negative"));
    }
    Ok(())
}

fn duplicate_name(err: DbErr, name: &str) -> ServiceError {
    ServiceError::conflict_on_unique(err, format!("Material {} already exists", name))
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("must_be_positive"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, max = 100, message = "Material name is required"))]
    pub name: String,
    #[validate(custom = "validate_positive")]
    #[schema(value_type = String, example = "1.2400")]
    pub density_g_cm3: Decimal,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String, example = "2.5000")]
    pub price_twd_g: Decimal,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom = "validate_positive")]
    #[schema(value_type = Option<String>)]
    pub density_g_cm3: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub price_twd_g: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Material catalogue. Customers only ever see active materials.
#[derive(Clone)]
pub struct MaterialService {
    db: Arc<DatabaseConnection>,
}

impl MaterialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<material::Model>, ServiceError> {
        Ok(MaterialEntity::find()
            .filter(material::Column::IsActive.eq(true))
            .order_by_asc(material::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Fetches an active material; inactive ones are reported as missing.
    #[instrument(skip(self))]
    pub async fn get_active(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        MaterialEntity::find_by_id(id)
            .filter(material::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", id))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateMaterialRequest) -> Result<material::Model, ServiceError> {
        request.validate()?;
        let name = request.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let now = Utc::now();
        let created = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            density_g_cm3: Set(request.density_g_cm3),
            price_twd_g: Set(request.price_twd_g),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| duplicate_name(e, &name))?;

        info!(material_id = %created.id, "material created");
        Ok(created)
    }

    /// Price changes only affect carts; placed orders keep their snapshots.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMaterialRequest,
    ) -> Result<material::Model, ServiceError> {
        request.validate()?;
        let existing = MaterialEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", id))?;

        let mut active: material::ActiveModel = existing.into();
        let renamed = request.name.map(|name| name.trim().to_string());
        if let Some(name) = &renamed {
            self.ensure_unique_name(name, Some(id)).await?;
            active.name = Set(name.clone());
        }
        if let Some(density) = request.density_g_cm3 {
            active.density_g_cm3 = Set(density);
        }
        if let Some(price) = request.price_twd_g {
            active.price_twd_g = Set(price);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await.map_err(|e| match &renamed {
            Some(name) => duplicate_name(e, name),
            None => e.into(),
        })?;
        info!(material_id = %id, "material updated");
        Ok(updated)
    }

    async fn ensure_unique_name(&self, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = MaterialEntity::find().filter(material::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(material::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Material {} already exists",
                name
            )));
        }
        Ok(())
    }
}
