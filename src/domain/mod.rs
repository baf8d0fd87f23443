//! Core business entities and logic.

mod password;
pub mod pricing;
mod product;
mod user;

pub use password::Password;
pub use product::{Offer, Product};
pub use user::{User, UserRole};
