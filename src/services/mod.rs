//! Business logic. Each service owns a shared connection and, where it
//! publishes domain events, the event sender.

pub mod cart;
pub mod checkout;
pub mod discounts;
pub mod materials;
pub mod models;
pub mod orders;
pub mod pricing;
pub mod shipping;
pub mod users;
