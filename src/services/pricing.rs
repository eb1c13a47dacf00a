//! Pure pricing arithmetic shared by the cart, checkout and coupon preview.
//!
//! Nothing here touches the database; callers load rows and pass plain values.

use crate::entities::discount::{self, WorksOn};
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use serde_json::Value as Json;
use std::str::FromStr;

const MONEY_DP: u32 = 2;

/// Heaviest sliced job that can be priced, in grams.
pub const MAX_WEIGHT_G: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

fn too_large() -> ServiceError {
    ServiceError::ValidationError("Price is too large to compute".to_string())
}

/// Rounds a money amount to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_DP)
}

/// Reads `weight_g` out of a model's slicing info. Numbers and numeric
/// strings are accepted; anything else, or a negative weight, yields `None`.
pub fn weight_from_slicing_info(info: Option<&Json>) -> Option<Decimal> {
    let raw = info?.get("weight_g")?;
    let weight = match raw {
        Json::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()?
        }
        Json::String(s) => Decimal::from_str(s.trim()).ok()?,
        _ => return None,
    };
    (weight >= Decimal::ZERO).then_some(weight)
}

/// Rejects slicing info whose `weight_g` cannot be priced.
pub fn check_slicing_info(info: Option<&Json>) -> Result<(), ServiceError> {
    let Some(raw) = info.and_then(|i| i.get("weight_g")) else {
        return Ok(());
    };
    if raw.is_null() {
        return Ok(());
    }
    match weight_from_slicing_info(info) {
        Some(weight) if weight <= MAX_WEIGHT_G => Ok(()),
        _ => Err(ServiceError::ValidationError(format!(
            "weight_g must be a number between 0 and {}",
            MAX_WEIGHT_G
        ))),
    }
}

/// Unit price snapshot for an order line: `weight_g × price_twd_g`, or zero
/// for an unsliced model.
pub fn unit_price(weight_g: Option<Decimal>, price_twd_g: Decimal) -> Result<Decimal, ServiceError> {
    match weight_g {
        Some(w) => w.checked_mul(price_twd_g).map(round_money).ok_or_else(too_large),
        None => Ok(Decimal::ZERO),
    }
}

/// Live estimate shown in the cart. `None` when the model has no weight.
pub fn estimate_line(
    weight_g: Option<Decimal>,
    price_twd_g: Decimal,
    quantity: i32,
) -> Result<Option<Decimal>, ServiceError> {
    let Some(w) = weight_g else {
        return Ok(None);
    };
    w.checked_mul(price_twd_g)
        .and_then(|unit| unit.checked_mul(Decimal::from(quantity)))
        .map(|amount| Some(round_money(amount)))
        .ok_or_else(too_large)
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, ServiceError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(too_large)
}

/// Sums money amounts, failing instead of overflowing.
pub fn sum_money<I>(amounts: I) -> Result<Decimal, ServiceError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(too_large)
}

/// The arithmetic part of a discount rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountTerms {
    pub works_on: WorksOn,
    pub is_fixed: bool,
    pub dis_value: Decimal,
    pub min_price: Decimal,
    pub max_discount: Option<Decimal>,
}

impl From<&discount::Model> for DiscountTerms {
    fn from(d: &discount::Model) -> Self {
        Self {
            works_on: d.works_on,
            is_fixed: d.is_fixed,
            dis_value: d.dis_value,
            min_price: d.min_price,
            max_discount: d.max_discount,
        }
    }
}

impl DiscountTerms {
    /// Minimum spend is judged against the undiscounted subtotal.
    pub fn qualifies(&self, subtotal: Decimal) -> bool {
        subtotal >= self.min_price
    }
}

/// What is left to discount after earlier rules have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remaining {
    pub subtotal: Decimal,
    pub shipping: Decimal,
}

impl Remaining {
    pub fn new(subtotal: Decimal, shipping: Decimal) -> Self {
        Self { subtotal, shipping }
    }

    pub fn target(&self, works_on: WorksOn) -> Decimal {
        match works_on {
            WorksOn::OrderSubtotal => self.subtotal,
            WorksOn::Shipping => self.shipping,
            WorksOn::Total => self.subtotal + self.shipping,
        }
    }

    /// Removes `amount` from the targeted buckets. `Total` eats the subtotal
    /// before shipping.
    fn consume(&mut self, works_on: WorksOn, amount: Decimal) {
        match works_on {
            WorksOn::OrderSubtotal => self.subtotal -= amount,
            WorksOn::Shipping => self.shipping -= amount,
            WorksOn::Total => {
                let from_subtotal = amount.min(self.subtotal);
                self.subtotal -= from_subtotal;
                self.shipping -= amount - from_subtotal;
            }
        }
    }

    pub fn total(&self) -> Decimal {
        self.subtotal + self.shipping
    }
}

/// Amount a rule takes off the current remaining target.
pub fn discount_amount(terms: &DiscountTerms, remaining: &Remaining) -> Decimal {
    let target = remaining.target(terms.works_on);
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut amount = if terms.is_fixed {
        terms.dis_value
    } else {
        target * terms.dis_value / Decimal::ONE_HUNDRED
    };
    if let Some(cap) = terms.max_discount {
        amount = amount.min(cap);
    }
    round_money(amount.min(target).max(Decimal::ZERO))
}

/// Applies one rule and returns the amount taken.
pub fn apply_discount(terms: &DiscountTerms, remaining: &mut Remaining) -> Decimal {
    let amount = discount_amount(terms, remaining);
    remaining.consume(terms.works_on, amount);
    amount
}

/// Order total after discounts, clamped at zero.
pub fn order_total(subtotal: Decimal, shipping_fee: Decimal, discounts: Decimal) -> Decimal {
    round_money((subtotal + shipping_fee - discounts).max(Decimal::ZERO))
}
