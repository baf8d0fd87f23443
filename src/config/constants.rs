//! Application-wide constants.

/// Listed price for the initial "Stock" offer created alongside a product
pub const DEFAULT_STOCK_PRICE: f64 = 10.0;

/// Seller name used for exchange-owned starting stock
pub const STOCK_SELLER: &str = "Stock";

/// How many history entries the in-memory stores retain per product/offer
pub const PRICE_HISTORY_LIMIT: usize = 3;

/// Lowest price an offer can be re-listed at
pub const MIN_LISTED_PRICE: f64 = 0.01;

/// Largest quantity accepted anywhere; keeps totals inside the range of
/// the database's integer columns
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// Role names stored in the users table
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SELLER: &str = "seller";

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LENGTH: usize = 8;
