//! SeaORM entities for the marketplace schema.

pub mod cart_item;
pub mod coupon;
pub mod coupon_redemption;
pub mod customer;
pub mod discount;
pub mod employee;
pub mod global_discount;
pub mod is_affected;
pub mod material;
pub mod model_review_log;
pub mod order;
pub mod order_item;
pub mod order_log;
pub mod printing_model;
pub mod saved_address;
pub mod shipping_option;
pub mod user;
