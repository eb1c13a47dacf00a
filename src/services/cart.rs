use crate::{
    entities::{
        cart_item::{self, Entity as CartItemEntity},
        material::{self, Entity as MaterialEntity},
        printing_model::{self, Entity as PrintingModelEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        models::{can_view, find_model, Viewer},
        pricing::{estimate_line, round_money, sum_money},
        users::ensure_customer,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i32 = 1_000;

const QUANTITY_MESSAGE: &str = "Quantity must be at least 1.";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCartItemRequest {
    pub model_id: Uuid,
    pub material_id: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i32>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// A cart line with live catalogue details and a price estimate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub model_id: Uuid,
    pub material_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub model_name: String,
    pub material_name: String,
    #[schema(value_type = String)]
    pub material_price: Decimal,
    #[schema(value_type = Option<Object>)]
    pub model_slicing_info: Option<Json>,
    /// `None` when the model has not been sliced.
    #[schema(value_type = Option<String>)]
    pub estimated_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartItemView>,
    pub total_items: i64,
    #[schema(value_type = String)]
    pub estimated_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearCartResponse {
    pub message: String,
    pub removed: u64,
}

/// A cart line joined with its model and material, as checkout needs it.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: cart_item::Model,
    pub model: printing_model::Model,
    pub material: material::Model,
}

impl CartLine {
    fn view(&self) -> Result<CartItemView, ServiceError> {
        Ok(CartItemView {
            id: self.item.id,
            customer_id: self.item.customer_id,
            model_id: self.item.model_id,
            material_id: self.item.material_id,
            quantity: self.item.quantity,
            notes: self.item.notes.clone(),
            model_name: self.model.model_name.clone(),
            material_name: self.material.name.clone(),
            material_price: self.material.price_twd_g,
            model_slicing_info: self.model.slicing_info.clone(),
            estimated_price: estimate_line(
                self.model.weight_g(),
                self.material.price_twd_g,
                self.item.quantity,
            )?,
            created_at: self.item.created_at,
            updated_at: self.item.updated_at,
        })
    }
}

/// Loads the customer's cart in insertion order with model and material rows.
pub async fn load_cart<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
) -> Result<Vec<CartLine>, ServiceError> {
    let rows = CartItemEntity::find()
        .filter(cart_item::Column::CustomerId.eq(customer_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(PrintingModelEntity)
        .all(conn)
        .await?;

    let material_ids: Vec<Uuid> = rows.iter().map(|(item, _)| item.material_id).collect();
    let materials: HashMap<Uuid, material::Model> = MaterialEntity::find()
        .filter(material::Column::Id.is_in(material_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    rows.into_iter()
        .map(|(item, model)| {
            let model = model.ok_or_else(|| ServiceError::not_found("Model", item.model_id))?;
            let material = materials
                .get(&item.material_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("Material", item.material_id))?;
            Ok(CartLine {
                item,
                model,
                material,
            })
        })
        .collect()
}

fn check_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::ValidationError(QUANTITY_MESSAGE.to_string()));
    }
    if quantity > MAX_QUANTITY {
        return Err(ServiceError::ValidationError(format!(
            "Quantity cannot exceed {}.",
            MAX_QUANTITY
        )));
    }
    Ok(())
}

/// Per-customer shopping cart of print jobs.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CartItemView>, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let lines = load_cart(&*self.db, customer.user_id).await?;
        lines.iter().map(CartLine::view).collect()
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, user_id: Uuid) -> Result<CartSummary, ServiceError> {
        let items = self.list(user_id).await?;
        let total_items = items.iter().map(|i| i64::from(i.quantity)).sum();
        let estimated_total = round_money(sum_money(items.iter().filter_map(|i| i.estimated_price))?);
        Ok(CartSummary {
            items,
            total_items,
            estimated_total,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<CartItemView, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let item = self.owned_item(&*self.db, customer.user_id, id).await?;
        self.view_of(&*self.db, item).await
    }

    /// Adds a print job. An existing line for the same model and material is
    /// merged: quantities add up and new notes replace old ones.
    #[instrument(skip(self, request), fields(model_id = %request.model_id, material_id = %request.material_id))]
    pub async fn add(
        &self,
        viewer: Viewer,
        request: AddCartItemRequest,
    ) -> Result<CartItemView, ServiceError> {
        request.validate()?;
        let quantity = request.quantity.unwrap_or(1);
        check_quantity(quantity)?;

        let txn = self.db.begin().await?;
        let customer = ensure_customer(&txn, viewer.user_id).await?;

        let model = find_model(&txn, request.model_id).await?;
        if !can_view(&model, Some(&viewer)) {
            return Err(ServiceError::not_found("Model", request.model_id));
        }
        let material = MaterialEntity::find_by_id(request.material_id)
            .one(&txn)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Material {} is not available",
                    request.material_id
                ))
            })?;

        let existing = CartItemEntity::find()
            .filter(cart_item::Column::CustomerId.eq(customer.user_id))
            .filter(cart_item::Column::ModelId.eq(model.id))
            .filter(cart_item::Column::MaterialId.eq(material.id))
            .one(&txn)
            .await?;

        let now = Utc::now();
        let item = match existing {
            Some(item) => {
                let merged = item.quantity.checked_add(quantity).unwrap_or(i32::MAX);
                check_quantity(merged)?;
                let mut active: cart_item::ActiveModel = item.into();
                active.quantity = Set(merged);
                if let Some(notes) = request.notes {
                    active.notes = Set(Some(notes));
                }
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    customer_id: Set(customer.user_id),
                    model_id: Set(model.id),
                    material_id: Set(material.id),
                    quantity: Set(quantity),
                    notes: Set(request.notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
                .map_err(|e| {
                    ServiceError::conflict_on_unique(
                        e,
                        "This model and material are already in the cart",
                    )
                })?
            }
        };
        txn.commit().await?;

        self.event_sender.send_or_log(Event::CartItemAdded {
            customer_id: customer.user_id,
            cart_item_id: item.id,
        });
        info!(cart_item_id = %item.id, quantity = item.quantity, "cart item saved");

        CartLine {
            item,
            model,
            material,
        }
        .view()
    }

    /// Only quantity and notes can change on an existing line.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateCartItemRequest,
    ) -> Result<CartItemView, ServiceError> {
        request.validate()?;
        if let Some(quantity) = request.quantity {
            check_quantity(quantity)?;
        }

        let customer = ensure_customer(&*self.db, user_id).await?;
        let item = self.owned_item(&*self.db, customer.user_id, id).await?;

        let mut active: cart_item::ActiveModel = item.into();
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());
        let item = active.update(&*self.db).await?;

        info!(cart_item_id = %id, quantity = item.quantity, "cart item updated");
        self.view_of(&*self.db, item).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let item = self.owned_item(&*self.db, customer.user_id, id).await?;
        item.delete(&*self.db).await?;
        info!(cart_item_id = %id, "cart item removed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<ClearCartResponse, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let removed = CartItemEntity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer.user_id))
            .exec(&*self.db)
            .await?
            .rows_affected;

        self.event_sender.send_or_log(Event::CartCleared {
            customer_id: customer.user_id,
            removed,
        });
        info!(customer_id = %customer.user_id, removed, "cart cleared");
        Ok(ClearCartResponse {
            message: format!("Cleared {} items from cart", removed),
            removed,
        })
    }

    /// Another customer's line is indistinguishable from a missing one.
    async fn owned_item<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: Uuid,
        id: Uuid,
    ) -> Result<cart_item::Model, ServiceError> {
        CartItemEntity::find_by_id(id)
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cart item", id))
    }

    async fn view_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        item: cart_item::Model,
    ) -> Result<CartItemView, ServiceError> {
        let model = find_model(conn, item.model_id).await?;
        let material = MaterialEntity::find_by_id(item.material_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material", item.material_id))?;
        CartLine {
            item,
            model,
            material,
        }
        .view()
    }
}
