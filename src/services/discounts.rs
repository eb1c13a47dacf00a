//! Discount rules: staff management plus the application plan used at checkout.

use crate::{
    entities::{
        coupon::{self, Entity as CouponEntity},
        coupon_redemption,
        discount::{self, Entity as DiscountEntity, WorksOn},
        global_discount::{self, Entity as GlobalDiscountEntity},
    },
    errors::ServiceError,
    services::pricing::{apply_discount, round_money, DiscountTerms, Remaining},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must_be_non_negative"));
    }
    Ok(())
}

/// Fields shared by global discounts and coupons.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DiscountRuleInput {
    #[validate(length(min = 1, max = 100, message = "Discount name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = Option<String>)]
    pub max_discount: Option<Decimal>,
    pub works_on: WorksOn,
    pub is_fixed: bool,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = String, example = "10")]
    pub dis_value: Decimal,
}

impl DiscountRuleInput {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if !self.is_fixed && self.dis_value > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "Percentage discounts cannot exceed 100".to_string(),
            ));
        }
        if let (Some(start), Some(due)) = (self.start_date, self.due_date) {
            if due < start {
                return Err(ServiceError::ValidationError(
                    "Discount due date must not precede its start date".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn into_active_model(self, now: DateTime<Utc>) -> discount::ActiveModel {
        discount::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(self.name.trim().to_string()),
            description: Set(self.description),
            start_date: Set(self.start_date.unwrap_or(now)),
            due_date: Set(self.due_date),
            min_price: Set(round_money(self.min_price.unwrap_or(Decimal::ZERO))),
            max_discount: Set(self.max_discount.map(round_money)),
            works_on: Set(self.works_on),
            is_fixed: Set(self.is_fixed),
            dis_value: Set(self.dis_value),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGlobalDiscountRequest {
    #[serde(flatten)]
    #[validate]
    pub rule: DiscountRuleInput,
    #[validate(range(min = 0, message = "Priority must not be negative"))]
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCouponRequest {
    #[serde(flatten)]
    #[validate]
    pub rule: DiscountRuleInput,
    #[validate(length(min = 1, max = 50, message = "Coupon code is required"))]
    pub coupon_code: String,
    #[validate(range(min = 1))]
    pub max_uses_total: Option<i32>,
    #[validate(range(min = 1, message = "Per-customer limit must be at least 1"))]
    pub max_uses_per_customer: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalDiscountResponse {
    #[serde(flatten)]
    pub discount: discount::Model,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponResponse {
    #[serde(flatten)]
    pub discount: discount::Model,
    pub coupon_code: String,
    pub max_uses_total: Option<i32>,
    pub max_uses_per_customer: i32,
    pub times_redeemed: u64,
}

/// Codes are matched case-insensitively by storing them upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountSource {
    Global,
    Coupon,
}

/// One discount the checkout will record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDiscount {
    pub source: DiscountSource,
    pub discount_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    #[serde(skip)]
    pub snapshot: Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscountPlan {
    pub applied: Vec<AppliedDiscount>,
    pub total: Decimal,
}

impl DiscountPlan {
    pub fn coupon(&self) -> Option<&AppliedDiscount> {
        self.applied
            .iter()
            .find(|d| d.source == DiscountSource::Coupon)
    }

    pub fn globals(&self) -> impl Iterator<Item = &AppliedDiscount> {
        self.applied
            .iter()
            .filter(|d| d.source == DiscountSource::Global)
    }
}

fn rule_snapshot(discount: &discount::Model) -> serde_json::Map<String, Json> {
    let mut map = serde_json::Map::new();
    map.insert("discount_id".into(), json!(discount.id));
    map.insert("name".into(), json!(discount.name));
    map.insert("works_on".into(), json!(discount.works_on));
    map.insert("is_fixed".into(), json!(discount.is_fixed));
    map.insert("dis_value".into(), json!(discount.dis_value.to_string()));
    map.insert("min_price".into(), json!(discount.min_price.to_string()));
    map.insert(
        "max_discount".into(),
        json!(discount.max_discount.map(|d| d.to_string())),
    );
    map
}

/// Orders live global discounts by descending priority, oldest first on ties.
fn sort_globals(globals: &mut [(global_discount::Model, discount::Model)]) {
    globals.sort_by(|(ga, da), (gb, db)| {
        gb.priority
            .cmp(&ga.priority)
            .then(da.created_at.cmp(&db.created_at))
    });
}

/// Counts redemptions against a coupon's caps.
pub async fn is_valid_for_customer<C: ConnectionTrait>(
    conn: &C,
    coupon: &coupon::Model,
    customer_id: Uuid,
) -> Result<bool, ServiceError> {
    let total = coupon_redemption::Entity::find()
        .filter(coupon_redemption::Column::CouponId.eq(coupon.discount_id))
        .count(conn)
        .await?;
    let mine = coupon_redemption::Entity::find()
        .filter(coupon_redemption::Column::CouponId.eq(coupon.discount_id))
        .filter(coupon_redemption::Column::CustomerId.eq(customer_id))
        .count(conn)
        .await?;
    Ok(coupon.allows_redemption(total, mine))
}

/// Looks up a live coupon. With `lock` the coupon row is held until the
/// surrounding transaction ends so concurrent checkouts serialise on it.
async fn find_live_coupon<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    now: DateTime<Utc>,
    lock: bool,
) -> Result<(coupon::Model, discount::Model), ServiceError> {
    let invalid = || ServiceError::ValidationError("Invalid coupon code".to_string());

    let mut query = CouponEntity::find().filter(coupon::Column::CouponCode.eq(normalize_code(code)));
    if lock {
        query = query.lock_exclusive();
    }
    let coupon = query.one(conn).await?.ok_or_else(invalid)?;
    let discount = DiscountEntity::find_by_id(coupon.discount_id)
        .one(conn)
        .await?
        .filter(|d| d.is_live_at(now))
        .ok_or_else(invalid)?;
    Ok((coupon, discount))
}

/// Works out every discount an order of `subtotal` + `shipping_fee` gets:
/// qualifying global discounts by priority, then the coupon if one is given.
pub async fn plan_discounts<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
    subtotal: Decimal,
    shipping_fee: Decimal,
    coupon_code: Option<&str>,
    lock_coupon: bool,
) -> Result<DiscountPlan, ServiceError> {
    let now = Utc::now();
    let mut remaining = Remaining::new(subtotal, shipping_fee);
    let mut plan = DiscountPlan::default();

    let mut globals: Vec<(global_discount::Model, discount::Model)> = GlobalDiscountEntity::find()
        .find_also_related(DiscountEntity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(global, discount)| discount.map(|d| (global, d)))
        .filter(|(_, d)| d.is_live_at(now))
        .collect();
    sort_globals(&mut globals);

    for (global, discount) in globals {
        let terms = DiscountTerms::from(&discount);
        if !terms.qualifies(subtotal) {
            continue;
        }
        let amount = apply_discount(&terms, &mut remaining);
        if amount <= Decimal::ZERO {
            continue;
        }
        let mut snapshot = rule_snapshot(&discount);
        snapshot.insert("priority".into(), json!(global.priority));
        plan.total += amount;
        plan.applied.push(AppliedDiscount {
            source: DiscountSource::Global,
            discount_id: discount.id,
            name: discount.name,
            amount,
            snapshot: Json::Object(snapshot),
        });
    }

    if let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        let (coupon, discount) = find_live_coupon(conn, code, now, lock_coupon).await?;
        let terms = DiscountTerms::from(&discount);
        if !terms.qualifies(subtotal) {
            return Err(ServiceError::ValidationError(format!(
                "Order does not meet the coupon minimum of {:.2}",
                discount.min_price
            )));
        }
        if !is_valid_for_customer(conn, &coupon, customer_id).await? {
            return Err(ServiceError::ValidationError(
                "Coupon usage limit reached".to_string(),
            ));
        }

        let amount = apply_discount(&terms, &mut remaining);
        let mut snapshot = rule_snapshot(&discount);
        snapshot.insert("coupon_code".into(), json!(coupon.coupon_code));
        plan.total += amount;
        plan.applied.push(AppliedDiscount {
            source: DiscountSource::Coupon,
            discount_id: coupon.discount_id,
            name: discount.name,
            amount,
            snapshot: Json::Object(snapshot),
        });
    }

    debug!(applied = plan.applied.len(), total = %plan.total, "discount plan computed");
    Ok(plan)
}

/// Staff management of discount rules.
#[derive(Clone)]
pub struct DiscountService {
    db: Arc<DatabaseConnection>,
}

impl DiscountService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.rule.name))]
    pub async fn create_global(
        &self,
        request: CreateGlobalDiscountRequest,
    ) -> Result<GlobalDiscountResponse, ServiceError> {
        request.validate()?;
        request.rule.check()?;

        let txn = self.db.begin().await?;
        let discount = request.rule.into_active_model(Utc::now()).insert(&txn).await?;
        let global = global_discount::ActiveModel {
            discount_id: Set(discount.id),
            priority: Set(request.priority),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(discount_id = %discount.id, priority = global.priority, "global discount created");
        Ok(GlobalDiscountResponse {
            discount,
            priority: global.priority,
        })
    }

    #[instrument(skip(self, request), fields(code = %request.coupon_code))]
    pub async fn create_coupon(&self, request: CreateCouponRequest) -> Result<CouponResponse, ServiceError> {
        request.validate()?;
        request.rule.check()?;
        let code = normalize_code(&request.coupon_code);

        let txn = self.db.begin().await?;
        let taken = CouponEntity::find()
            .filter(coupon::Column::CouponCode.eq(code.clone()))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Coupon code {} already exists",
                code
            )));
        }

        let discount = request.rule.into_active_model(Utc::now()).insert(&txn).await?;
        let coupon = coupon::ActiveModel {
            discount_id: Set(discount.id),
            coupon_code: Set(code.clone()),
            max_uses_total: Set(request.max_uses_total),
            max_uses_per_customer: Set(request.max_uses_per_customer.unwrap_or(1)),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::conflict_on_unique(e, format!("Coupon code {} already exists", code)))?;
        txn.commit().await?;

        info!(discount_id = %discount.id, code = %coupon.coupon_code, "coupon created");
        Ok(CouponResponse {
            discount,
            coupon_code: coupon.coupon_code,
            max_uses_total: coupon.max_uses_total,
            max_uses_per_customer: coupon.max_uses_per_customer,
            times_redeemed: 0,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_global(&self) -> Result<Vec<GlobalDiscountResponse>, ServiceError> {
        let mut rows: Vec<(global_discount::Model, discount::Model)> = GlobalDiscountEntity::find()
            .find_also_related(DiscountEntity)
            .all(&*self.db)
            .await?
            .into_iter()
            .filter_map(|(global, discount)| discount.map(|d| (global, d)))
            .collect();
        sort_globals(&mut rows);

        Ok(rows
            .into_iter()
            .map(|(global, discount)| GlobalDiscountResponse {
                discount,
                priority: global.priority,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> Result<Vec<CouponResponse>, ServiceError> {
        let rows = CouponEntity::find()
            .find_also_related(DiscountEntity)
            .all(&*self.db)
            .await?;

        let mut coupons = Vec::with_capacity(rows.len());
        for (coupon, discount) in rows {
            let Some(discount) = discount else { continue };
            let times_redeemed = coupon_redemption::Entity::find()
                .filter(coupon_redemption::Column::CouponId.eq(coupon.discount_id))
                .count(&*self.db)
                .await?;
            coupons.push(CouponResponse {
                discount,
                coupon_code: coupon.coupon_code,
                max_uses_total: coupon.max_uses_total,
                max_uses_per_customer: coupon.max_uses_per_customer,
                times_redeemed,
            });
        }
        coupons.sort_by(|a, b| a.coupon_code.cmp(&b.coupon_code));
        Ok(coupons)
    }

    /// Deactivated rules stop applying to new orders; recorded snapshots stay.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, discount_id: Uuid) -> Result<discount::Model, ServiceError> {
        let existing = DiscountEntity::find_by_id(discount_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Discount", discount_id))?;

        let mut active: discount::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        info!(discount_id = %discount_id, "discount deactivated");
        Ok(updated)
    }
}
