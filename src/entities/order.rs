use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Placed order. Shipping and pricing live in snapshots, never in foreign keys
/// to the mutable catalog.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    #[sea_orm(nullable)]
    pub assignee_id: Option<Uuid>,
    pub status: OrderStatus,
    #[sea_orm(column_type = "Json")]
    pub ship_snapshot: Json,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_price: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(nullable)]
    pub tracking_number: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::UserId"
    )]
    Customer,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::order_log::Entity")]
    OrderLogs,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::order_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "PRINTING")]
    Printing,
    #[sea_orm(string_value = "QUALITY_CHECK")]
    QualityCheck,
    #[sea_orm(string_value = "READY_TO_SHIP")]
    ReadyToShip,
    #[sea_orm(string_value = "SHIPPED")]
    Shipped,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Fulfilment workflow used for staff status updates.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self == next || self.is_terminal() {
            return false;
        }
        match next {
            Cancelled => matches!(
                self,
                Pending | Confirmed | Processing | Printing | QualityCheck | ReadyToShip
            ),
            Refunded => self != Pending,
            _ => matches!(
                (self, next),
                (Pending, Confirmed)
                    | (Confirmed, Processing)
                    | (Processing, Printing)
                    | (Printing, QualityCheck)
                    | (QualityCheck, Printing)
                    | (QualityCheck, ReadyToShip)
                    | (ReadyToShip, Shipped)
                    | (Shipped, Delivered)
                    | (Delivered, Completed)
            ),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Printing => "PRINTING",
            OrderStatus::QualityCheck => "QUALITY_CHECK",
            OrderStatus::ReadyToShip => "READY_TO_SHIP",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        };
        f.write_str(s)
    }
}
