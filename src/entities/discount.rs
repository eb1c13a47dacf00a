use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Base discount rule, specialised by `global_discount` or `coupon`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub due_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub min_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub max_discount: Option<Decimal>,
    pub works_on: WorksOn,
    pub is_fixed: bool,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub dis_value: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::global_discount::Entity")]
    GlobalDiscount,
    #[sea_orm(has_one = "super::coupon::Entity")]
    Coupon,
}

impl Related<super::global_discount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlobalDiscount.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Active and inside its date window at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date <= now
            && self.due_date.map_or(true, |due| now <= due)
    }
}

/// Which part of the order a discount reduces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorksOn {
    #[sea_orm(string_value = "ORDER_SUBTOTAL")]
    OrderSubtotal,
    #[sea_orm(string_value = "SHIPPING")]
    Shipping,
    #[sea_orm(string_value = "TOTAL")]
    Total,
}
