//! Turns a mutable cart into an immutable, priced order.

use crate::{
    entities::{
        cart_item::{self, Entity as CartItemEntity},
        coupon_redemption, is_affected,
        order::{self, OrderStatus},
        order_item, saved_address,
        shipping_option::{self, Entity as ShippingOptionEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        cart::{load_cart, CartLine},
        discounts::{normalize_code, plan_discounts, DiscountPlan, DiscountSource},
        orders::{order_detail, OrderDetail},
        pricing::{line_total, order_total, round_money, sum_money, unit_price},
        shipping::find_owned_address,
        users::ensure_customer,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    pub shipping_option_id: Uuid,
    pub saved_address_id: Uuid,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(max = 50))]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1, max = 50, message = "Coupon code is required"))]
    pub coupon_code: String,
    /// Needed to preview shipping discounts; without it the fee counts as zero.
    pub shipping_option_id: Option<Uuid>,
}

/// What a coupon would do to the current cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CouponPreview {
    pub coupon_code: String,
    pub discount_name: String,
    #[schema(value_type = String)]
    pub discount_amount: Decimal,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub shipping_fee: Decimal,
    #[schema(value_type = String)]
    pub global_discount_total: Decimal,
    #[schema(value_type = String)]
    pub estimated_total: Decimal,
}

/// Frozen copy of the shipping choice and destination.
pub fn ship_snapshot(option: &shipping_option::Model, address: &saved_address::Model) -> Json {
    json!({
        "service_name": option.name,
        "type": option.shipping_type,
        "fee": format!("{:.2}", option.base_fee),
        "address_name": address.name,
        "address_type": address.address_type,
        "address_details": address.address_details,
    })
}

/// Unit price for each line plus the cart subtotal.
fn price_lines(lines: &[CartLine]) -> Result<(Vec<Decimal>, Decimal), ServiceError> {
    let prices = lines
        .iter()
        .map(|line| unit_price(line.model.weight_g(), line.material.price_twd_g))
        .collect::<Result<Vec<_>, _>>()?;
    let totals = lines
        .iter()
        .zip(&prices)
        .map(|(line, price)| line_total(*price, line.item.quantity))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((prices, sum_money(totals)?))
}

async fn active_shipping_option<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<shipping_option::Model, ServiceError> {
    ShippingOptionEntity::find_by_id(id)
        .one(conn)
        .await?
        .filter(|o| o.is_active)
        .ok_or_else(|| ServiceError::ValidationError("Invalid shipping option".to_string()))
}

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Places an order from the caller's cart. Everything happens in one
    /// transaction; the cart is emptied only if the order is written.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        request: PlaceOrderRequest,
    ) -> Result<OrderDetail, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let customer = ensure_customer(&txn, user_id).await?;

        let lines = load_cart(&txn, customer.user_id).await?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let option = active_shipping_option(&txn, request.shipping_option_id).await?;
        let address = find_owned_address(&txn, customer.user_id, request.saved_address_id)
            .await
            .map_err(|err| match err {
                ServiceError::NotFound(_) => {
                    ServiceError::ValidationError("Invalid address".to_string())
                }
                other => other,
            })?;

        let (prices, subtotal) = price_lines(&lines)?;
        let shipping_fee = round_money(option.base_fee);
        let plan: DiscountPlan = plan_discounts(
            &txn,
            customer.user_id,
            subtotal,
            shipping_fee,
            request.coupon_code.as_deref(),
            true,
        )
        .await?;
        let total_price = order_total(subtotal, shipping_fee, plan.total);

        let now = Utc::now();
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.user_id),
            assignee_id: Set(None),
            status: Set(OrderStatus::Pending),
            ship_snapshot: Set(ship_snapshot(&option, &address)),
            total_price: Set(total_price),
            notes: Set(request.notes),
            tracking_number: Set(None),
            creation_date: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (index, (line, price)) in lines.iter().zip(prices).enumerate() {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                model_id: Set(line.model.id),
                material_id: Set(line.material.id),
                item_number: Set(index as i32 + 1),
                quantity: Set(line.item.quantity),
                price_snapshot: Set(price),
                slicing_info_snapshot: Set(line.model.slicing_info.clone()),
                notes: Set(line.item.notes.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let mut redeemed_coupon = None;
        for applied in &plan.applied {
            match applied.source {
                DiscountSource::Global => {
                    is_affected::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        order_id: Set(order.id),
                        global_discount_id: Set(applied.discount_id),
                        discount_snapshot_info: Set(applied.snapshot.clone()),
                        discount_amount: Set(applied.amount),
                        created_at: Set(now),
                    }
                    .insert(&txn)
                    .await?;
                }
                DiscountSource::Coupon => {
                    coupon_redemption::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        customer_id: Set(customer.user_id),
                        coupon_id: Set(applied.discount_id),
                        order_id: Set(order.id),
                        discount_snapshot_info: Set(applied.snapshot.clone()),
                        discount_amount: Set(applied.amount),
                        timestamp: Set(now),
                    }
                    .insert(&txn)
                    .await?;
                    redeemed_coupon = Some(applied.discount_id);
                }
            }
        }

        let removed = CartItemEntity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer.user_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let detail = order_detail(&txn, order, false).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::OrderPlaced {
            order_id: detail.order.id,
            customer_id: customer.user_id,
            total_price,
        });
        if let Some(coupon_id) = redeemed_coupon {
            self.event_sender.send_or_log(Event::CouponRedeemed {
                coupon_id,
                order_id: detail.order.id,
            });
        }
        info!(
            order_id = %detail.order.id,
            items = detail.items.len(),
            cart_lines_removed = removed,
            %subtotal,
            %shipping_fee,
            discount = %plan.total,
            %total_price,
            "order placed"
        );
        Ok(detail)
    }

    /// Runs the coupon checks against the current cart without redeeming.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn preview_coupon(
        &self,
        user_id: Uuid,
        request: ValidateCouponRequest,
    ) -> Result<CouponPreview, ServiceError> {
        request.validate()?;
        let customer = ensure_customer(&*self.db, user_id).await?;
        let lines = load_cart(&*self.db, customer.user_id).await?;
        if lines.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let shipping_fee = match request.shipping_option_id {
            Some(id) => round_money(active_shipping_option(&*self.db, id).await?.base_fee),
            None => Decimal::ZERO,
        };
        let (_, subtotal) = price_lines(&lines)?;
        let plan = plan_discounts(
            &*self.db,
            customer.user_id,
            subtotal,
            shipping_fee,
            Some(&request.coupon_code),
            false,
        )
        .await?;

        let coupon = plan
            .coupon()
            .ok_or_else(|| ServiceError::ValidationError("Invalid coupon code".to_string()))?;
        let global_discount_total: Decimal = plan.globals().map(|d| d.amount).sum();

        Ok(CouponPreview {
            coupon_code: normalize_code(&request.coupon_code),
            discount_name: coupon.name.clone(),
            discount_amount: coupon.amount,
            subtotal,
            shipping_fee,
            global_discount_total,
            estimated_total: order_total(subtotal, shipping_fee, plan.total),
        })
    }
}
