//! Market Exchange - a console marketplace.
//!
//! Admins define product models; sellers publish offers (price +
//! quantity); anyone can buy from a seller's offer. Trades execute at the
//! listed price, re-list the offer at a supply-driven price, and record
//! the execution price in the product's trade history. Runs against
//! PostgreSQL when DATABASE_URL is set, in-memory otherwise.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **console**: Interactive menu UI
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, persistence backends)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Run the interactive console
//! cargo run
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Provision an account
//! cargo run -- users create --login alice --password s3cret-pass --role seller
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use console::Console;
pub use domain::{Offer, Password, Product, User, UserRole};
pub use errors::{AppError, AppResult};
