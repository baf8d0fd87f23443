//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod offer;
pub mod price_history;
pub mod product;
pub mod user;
