//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence, with a
//! PostgreSQL implementation and an in-memory fallback behind the same
//! traits.

pub(crate) mod entities;
mod market_repository;
mod memory;
mod user_repository;

pub use market_repository::{MarketRepository, PgMarketStore};
pub use memory::{MemoryMarketStore, MemoryUserStore};
pub use user_repository::{PgUserStore, UserRepository};

// Export mocks for unit tests
#[cfg(test)]
pub use market_repository::MockMarketRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
