use crate::{
    entities::{
        coupon_redemption, employee, is_affected,
        order::{self, Entity as OrderEntity, OrderStatus},
        order_item::{self, Entity as OrderItemEntity},
        order_log::{self, Entity as OrderLogEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{discounts::DiscountSource, users::ensure_customer},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignOrderRequest {
    pub assignee_id: Uuid,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: order_item::Model,
    pub subtotal: Decimal,
}

/// A discount recorded against an order, global or coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDiscountView {
    pub source: DiscountSource,
    pub discount_id: Uuid,
    pub amount: Decimal,
    pub snapshot: Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<OrderItemView>,
    pub discounts: Vec<OrderDiscountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<order_log::Model>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: order::Model,
    pub item_count: u64,
}

/// Loads items (by item number) and recorded discounts for `order`.
pub async fn order_detail<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
    include_logs: bool,
) -> Result<OrderDetail, ServiceError> {
    let items = order
        .find_related(OrderItemEntity)
        .order_by_asc(order_item::Column::ItemNumber)
        .all(conn)
        .await?
        .into_iter()
        .map(|item| OrderItemView {
            subtotal: item.subtotal(),
            item,
        })
        .collect();

    let mut discounts: Vec<OrderDiscountView> = is_affected::Entity::find()
        .filter(is_affected::Column::OrderId.eq(order.id))
        .order_by_asc(is_affected::Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(|row| OrderDiscountView {
            source: DiscountSource::Global,
            discount_id: row.global_discount_id,
            amount: row.discount_amount,
            snapshot: row.discount_snapshot_info,
        })
        .collect();
    if let Some(redemption) = coupon_redemption::Entity::find()
        .filter(coupon_redemption::Column::OrderId.eq(order.id))
        .one(conn)
        .await?
    {
        discounts.push(OrderDiscountView {
            source: DiscountSource::Coupon,
            discount_id: redemption.coupon_id,
            amount: redemption.discount_amount,
            snapshot: redemption.discount_snapshot_info,
        });
    }

    let logs = if include_logs {
        Some(
            order
                .find_related(OrderLogEntity)
                .order_by_asc(order_log::Column::Timestamp)
                .all(conn)
                .await?,
        )
    } else {
        None
    };

    Ok(OrderDetail {
        order,
        items,
        discounts,
        logs,
    })
}

/// Order history for customers and the fulfilment workflow for staff.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// The caller's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_customer(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let orders = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer.user_id))
            .order_by_desc(order::Column::CreationDate)
            .all(&*self.db)
            .await?;
        self.summarize(orders).await
    }

    #[instrument(skip(self))]
    pub async fn get_for_customer(&self, user_id: Uuid, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let order = OrderEntity::find_by_id(id)
            .filter(order::Column::CustomerId.eq(customer.user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;
        order_detail(&*self.db, order, false).await
    }

    /// Customers may cancel only while the order is still pending. Coupon
    /// usage is not restored.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: Uuid, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let customer = ensure_customer(&*self.db, user_id).await?;
        let owned = order::Column::CustomerId.eq(customer.user_id);

        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(id))
            .filter(owned.clone())
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .exec(&*self.db)
            .await?;

        let order = OrderEntity::find_by_id(id)
            .filter(owned)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidStatus(
                "Only pending orders can be cancelled".to_string(),
            ));
        }

        self.event_sender.send_or_log(Event::OrderCancelled(id));
        info!(order_id = %id, "order cancelled by customer");
        order_detail(&*self.db, order, false).await
    }

    /// Every order, newest first, optionally narrowed to one status.
    #[instrument(skip(self))]
    pub async fn list_all(&self, filter: OrderFilter) -> Result<Vec<OrderSummary>, ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        let orders = query
            .order_by_desc(order::Column::CreationDate)
            .all(&*self.db)
            .await?;
        self.summarize(orders).await
    }

    #[instrument(skip(self))]
    pub async fn get_any(&self, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = OrderEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;
        order_detail(&*self.db, order, true).await
    }

    /// Moves an order along the fulfilment workflow and logs the change.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        staff_id: Uuid,
        id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderDetail, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let order = OrderEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        let previous = order.status;
        let next = request.status;
        if previous == next {
            return Err(ServiceError::InvalidStatus(format!(
                "Order is already {}",
                previous
            )));
        }
        if !previous.can_transition_to(next) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot change order status from {} to {}",
                previous, next
            )));
        }

        let now = Utc::now();
        order_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            updated_by: Set(staff_id),
            previous_status: Set(Some(previous)),
            new_status: Set(next),
            notes: Set(request.notes),
            timestamp: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(next);
        if let Some(tracking) = request.tracking_number {
            active.tracking_number = Set(Some(tracking));
        }
        active.updated_at = Set(now);
        let order = active.update(&txn).await?;
        let detail = order_detail(&txn, order, true).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::OrderStatusChanged {
            order_id: id,
            old_status: previous.to_string(),
            new_status: next.to_string(),
        });
        info!(order_id = %id, staff_id = %staff_id, from = %previous, to = %next, "order status changed");
        Ok(detail)
    }

    #[instrument(skip(self, request), fields(assignee_id = %request.assignee_id))]
    pub async fn assign(
        &self,
        staff_id: Uuid,
        id: Uuid,
        request: AssignOrderRequest,
    ) -> Result<OrderDetail, ServiceError> {
        let assignee = employee::Entity::find_by_id(request.assignee_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError("Assignee must be an employee".to_string())
            })?;
        let order = OrderEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        let mut active: order::ActiveModel = order.into();
        active.assignee_id = Set(Some(assignee.user_id));
        active.updated_at = Set(Utc::now());
        let order = active.update(&*self.db).await?;

        self.event_sender.send_or_log(Event::OrderAssigned {
            order_id: id,
            assignee_id: assignee.user_id,
        });
        info!(order_id = %id, staff_id = %staff_id, assignee_id = %assignee.user_id, "order assigned");
        order_detail(&*self.db, order, true).await
    }

    async fn summarize(&self, orders: Vec<order::Model>) -> Result<Vec<OrderSummary>, ServiceError> {
        let mut summaries = Vec::with_capacity(orders.len());
        for order in orders {
            let item_count = OrderItemEntity::find()
                .filter(order_item::Column::OrderId.eq(order.id))
                .count(&*self.db)
                .await?;
            summaries.push(OrderSummary { order, item_count });
        }
        Ok(summaries)
    }
}
