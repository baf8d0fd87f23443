//! Infrastructure concerns (database, persistence backends).

pub mod db;
pub mod repositories;

pub use db::Database;
pub use repositories::{
    MarketRepository, MemoryMarketStore, MemoryUserStore, PgMarketStore, PgUserStore,
    UserRepository,
};
