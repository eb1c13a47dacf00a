pub mod auth;
pub mod cart;
pub mod common;
pub mod discounts;
pub mod materials;
pub mod models;
pub mod orders;
pub mod shipping;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    cart::CartService, checkout::CheckoutService, discounts::DiscountService,
    materials::MaterialService, models::ModelService, orders::OrderService,
    shipping::ShippingService, users::UserService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub materials: Arc<MaterialService>,
    pub shipping: Arc<ShippingService>,
    pub models: Arc<ModelService>,
    pub cart: Arc<CartService>,
    pub discounts: Arc<DiscountService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<crate::auth::AuthService>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(
                db_pool.clone(),
                event_sender.clone(),
                auth_service,
            )),
            materials: Arc::new(MaterialService::new(db_pool.clone())),
            shipping: Arc::new(ShippingService::new(db_pool.clone())),
            models: Arc::new(ModelService::new(db_pool.clone(), event_sender.clone())),
            cart: Arc::new(CartService::new(db_pool.clone(), event_sender.clone())),
            discounts: Arc::new(DiscountService::new(db_pool.clone())),
            checkout: Arc::new(CheckoutService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            orders: Arc::new(OrderService::new(db_pool, event_sender)),
        }
    }
}
