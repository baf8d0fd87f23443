//! Service Container - Centralized service access.
//!
//! Wires the market and auth services over a chosen persistence backend:
//! PostgreSQL when configured, in-memory otherwise.

use std::sync::Arc;

use super::{AuthService, Authenticator, MarketManager, MarketService};
use crate::errors::AppResult;
use crate::infra::{MemoryMarketStore, MemoryUserStore, PgMarketStore, PgUserStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get market service
    fn market(&self) -> Arc<dyn MarketService>;

    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    market_service: Arc<dyn MarketService>,
    auth_service: Arc<dyn AuthService>,
}

impl Services {
    /// Create a new service container from already-built services
    pub fn new(market_service: Arc<dyn MarketService>, auth_service: Arc<dyn AuthService>) -> Self {
        Self {
            market_service,
            auth_service,
        }
    }

    /// Services over the PostgreSQL backend
    pub fn postgres(db: sea_orm::DatabaseConnection) -> Self {
        let market_repo = Arc::new(PgMarketStore::new(db.clone()));
        let user_repo = Arc::new(PgUserStore::new(db));
        Self::new(
            Arc::new(MarketManager::new(market_repo)),
            Arc::new(Authenticator::new(user_repo)),
        )
    }

    /// Services over the in-memory backend, with demo accounts seeded
    pub fn in_memory() -> AppResult<Self> {
        let market_repo = Arc::new(MemoryMarketStore::new());
        let user_repo = Arc::new(MemoryUserStore::seeded()?);
        Ok(Self::new(
            Arc::new(MarketManager::new(market_repo)),
            Arc::new(Authenticator::new(user_repo)),
        ))
    }
}

impl ServiceContainer for Services {
    fn market(&self) -> Arc<dyn MarketService> {
        self.market_service.clone()
    }

    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }
}
