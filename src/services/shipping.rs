use crate::{
    entities::{
        saved_address::{self, Entity as AddressEntity},
        shipping_option::{self, Entity as ShippingOptionEntity, ShippingType},
    },
    errors::ServiceError,
    services::{pricing::round_money, users::ensure_customer},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_fee(fee: &Decimal) -> Result<(), ValidationError> {
    if fee.is_sign_negative() {
        return Err(ValidationError::new("fee_must_be_non_negative"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShippingOptionRequest {
    #[validate(length(min = 1, max = 100, message = "Shipping option name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    pub shipping_type: ShippingType,
    #[validate(custom = "validate_fee")]
    #[schema(value_type = String, example = "60.00")]
    pub base_fee: Decimal,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateShippingOptionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub shipping_type: Option<ShippingType>,
    #[validate(custom = "validate_fee")]
    #[schema(value_type = Option<String>)]
    pub base_fee: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaveAddressRequest {
    #[validate(length(min = 1, max = 100, message = "Address name is required"))]
    pub name: String,
    pub address_type: ShippingType,
    #[validate(length(min = 1, message = "Address details are required"))]
    pub address_details: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Shipping catalogue and the per-customer address book.
#[derive(Clone)]
pub struct ShippingService {
    db: Arc<DatabaseConnection>,
}

impl ShippingService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_active_options(&self) -> Result<Vec<shipping_option::Model>, ServiceError> {
        Ok(ShippingOptionEntity::find()
            .filter(shipping_option::Column::IsActive.eq(true))
            .order_by_asc(shipping_option::Column::BaseFee)
            .order_by_asc(shipping_option::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_option(
        &self,
        request: CreateShippingOptionRequest,
    ) -> Result<shipping_option::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let option = shipping_option::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            shipping_type: Set(request.shipping_type),
            base_fee: Set(round_money(request.base_fee)),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(shipping_option_id = %option.id, "shipping option created");
        Ok(option)
    }

    /// Fee changes never touch placed orders; they carry a `ship_snapshot`.
    #[instrument(skip(self, request))]
    pub async fn update_option(
        &self,
        id: Uuid,
        request: UpdateShippingOptionRequest,
    ) -> Result<shipping_option::Model, ServiceError> {
        request.validate()?;
        let existing = ShippingOptionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shipping option", id))?;

        let mut active: shipping_option::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(shipping_type) = request.shipping_type {
            active.shipping_type = Set(shipping_type);
        }
        if let Some(fee) = request.base_fee {
            active.base_fee = Set(round_money(fee));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!(shipping_option_id = %id, "shipping option updated");
        Ok(updated)
    }

    /// Default address first, then alphabetical.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self, user_id: Uuid) -> Result<Vec<saved_address::Model>, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        Ok(AddressEntity::find()
            .filter(saved_address::Column::CustomerId.eq(customer.user_id))
            .order_by_desc(saved_address::Column::IsDefault)
            .order_by_asc(saved_address::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_address(&self, user_id: Uuid, id: Uuid) -> Result<saved_address::Model, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        find_owned_address(&*self.db, customer.user_id, id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_address(
        &self,
        user_id: Uuid,
        request: SaveAddressRequest,
    ) -> Result<saved_address::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let customer = ensure_customer(&txn, user_id).await?;

        if request.is_default {
            unset_defaults(&txn, customer.user_id, None).await?;
        }

        let now = Utc::now();
        let address = saved_address::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.user_id),
            name: Set(request.name.trim().to_string()),
            address_type: Set(request.address_type),
            address_details: Set(request.address_details),
            is_default: Set(request.is_default),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(address_id = %address.id, is_default = address.is_default, "address saved");
        Ok(address)
    }

    #[instrument(skip(self, request))]
    pub async fn update_address(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: SaveAddressRequest,
    ) -> Result<saved_address::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let customer = ensure_customer(&txn, user_id).await?;
        let existing = find_owned_address(&txn, customer.user_id, id).await?;

        if request.is_default {
            unset_defaults(&txn, customer.user_id, Some(id)).await?;
        }

        let mut active: saved_address::ActiveModel = existing.into();
        active.name = Set(request.name.trim().to_string());
        active.address_type = Set(request.address_type);
        active.address_details = Set(request.address_details);
        active.is_default = Set(request.is_default);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(address_id = %id, "address updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn set_default_address(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<saved_address::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let customer = ensure_customer(&txn, user_id).await?;
        let existing = find_owned_address(&txn, customer.user_id, id).await?;

        unset_defaults(&txn, customer.user_id, Some(id)).await?;
        let mut active: saved_address::ActiveModel = existing.into();
        active.is_default = Set(true);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(address_id = %id, "default address changed");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_address(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let existing = find_owned_address(&*self.db, customer.user_id, id).await?;
        existing.delete(&*self.db).await?;
        info!(address_id = %id, "address deleted");
        Ok(())
    }
}

/// Looks up an address scoped to its owner; other customers' rows are 404.
pub(crate) async fn find_owned_address<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
    id: Uuid,
) -> Result<saved_address::Model, ServiceError> {
    AddressEntity::find_by_id(id)
        .filter(saved_address::Column::CustomerId.eq(customer_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Address", id))
}

async fn unset_defaults<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
    except: Option<Uuid>,
) -> Result<u64, ServiceError> {
    let mut update = AddressEntity::update_many()
        .col_expr(saved_address::Column::IsDefault, Expr::value(false))
        .col_expr(saved_address::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(saved_address::Column::CustomerId.eq(customer_id))
        .filter(saved_address::Column::IsDefault.eq(true));
    if let Some(id) = except {
        update = update.filter(saved_address::Column::Id.ne(id));
    }
    Ok(update.exec(conn).await?.rows_affected)
}
