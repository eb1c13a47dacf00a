use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Code-gated discount with usage caps.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub discount_id: Uuid,
    #[sea_orm(unique)]
    pub coupon_code: String,
    /// `None` means unlimited.
    #[sea_orm(nullable)]
    pub max_uses_total: Option<i32>,
    pub max_uses_per_customer: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discount::Entity",
        from = "Column::DiscountId",
        to = "super::discount::Column::Id",
        on_delete = "Cascade"
    )]
    Discount,
    #[sea_orm(has_many = "super::coupon_redemption::Entity")]
    Redemptions,
}

impl Related<super::discount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discount.def()
    }
}

impl Related<super::coupon_redemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Redemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Usage-cap check given the current redemption counts.
    pub fn allows_redemption(&self, total_redemptions: u64, customer_redemptions: u64) -> bool {
        if let Some(max_total) = self.max_uses_total {
            if total_redemptions >= max_total.max(0) as u64 {
                return false;
            }
        }
        customer_redemptions < self.max_uses_per_customer.max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(max_total: Option<i32>, per_customer: i32) -> Model {
        Model {
            discount_id: Uuid::new_v4(),
            coupon_code: "PLA10".into(),
            max_uses_total: max_total,
            max_uses_per_customer: per_customer,
        }
    }

    #[test]
    fn unlimited_total_checks_only_per_customer() {
        let c = coupon(None, 2);
        assert!(c.allows_redemption(10_000, 1));
        assert!(!c.allows_redemption(0, 2));
    }

    #[test]
    fn total_cap_is_checked_first() {
        let c = coupon(Some(3), 5);
        assert!(c.allows_redemption(2, 0));
        assert!(!c.allows_redemption(3, 0));
    }
}
