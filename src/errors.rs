//! Centralized error handling.
//!
//! Provides a unified error type for the entire application. Purchase
//! failures carry enough context for the console to explain what went
//! wrong without re-querying the store.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    Forbidden,

    // Market errors
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("No offer from seller {seller} for {product}")]
    OfferNotFound { product: String, seller: String },

    #[error("Not enough stock in seller offer, available: {available}")]
    InsufficientStock { available: u32 },

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
