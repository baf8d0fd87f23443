//! Application use cases and business logic.

mod auth_service;
mod container;
mod market_service;

pub use auth_service::{AuthService, Authenticator};
pub use container::{ServiceContainer, Services};
pub use market_service::{MarketManager, MarketService, PurchaseReceipt};
