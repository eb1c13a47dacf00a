use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a global discount applied to an order, with the rule snapshotted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "is_affected")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub global_discount_id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub discount_snapshot_info: Json,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub discount_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::global_discount::Entity",
        from = "Column::GlobalDiscountId",
        to = "super::global_discount::Column::DiscountId"
    )]
    GlobalDiscount,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::global_discount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlobalDiscount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
