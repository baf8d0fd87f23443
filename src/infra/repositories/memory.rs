//! In-memory fallback stores.
//!
//! Used when no DATABASE_URL is configured, or when database
//! initialization fails at startup. Unlike the database, the in-memory
//! stores also maintain the last-3 listing history per offer and the
//! last-3 trade history per product.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MarketRepository, UserRepository};
use crate::config::MAX_QUANTITY;
use crate::domain::{Offer, Password, Product, User, UserRole};
use crate::errors::{AppError, AppResult};

/// In-process market store.
#[derive(Default)]
pub struct MemoryMarketStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_by_name<'a>(products: &'a [Product], name: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn find_by_name_mut<'a>(products: &'a mut [Product], name: &str) -> Option<&'a mut Product> {
    products
        .iter_mut()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

#[async_trait]
impl MarketRepository for MemoryMarketStore {
    async fn upsert_product(&self, id: &str, name: &str, category: &str) -> AppResult<()> {
        let mut products = self.products.write().await;
        if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
            existing.name = name.to_string();
            existing.category = category.to_string();
        } else {
            products.push(Product::new(id, name, category));
        }
        Ok(())
    }

    async fn upsert_offer(
        &self,
        product_id: &str,
        seller: &str,
        price: f64,
        added_qty: u32,
    ) -> AppResult<()> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::ProductNotFound(product_id.to_string()))?;

        if let Some(offer) = product.offer_mut(seller) {
            offer.price = price;
            // Accumulated quantity stays inside the database column range
            offer.quantity = offer.quantity.saturating_add(added_qty).min(MAX_QUANTITY);
            offer.record_listing(price);
        } else {
            let mut offer = Offer::new(seller, price, added_qty);
            offer.record_listing(price);
            product.offers.push(offer);
        }
        Ok(())
    }

    async fn fetch_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_product_id(&self, name: &str) -> AppResult<Option<String>> {
        let products = self.products.read().await;
        Ok(find_by_name(&products, name).map(|p| p.id.clone()))
    }

    async fn purchase(
        &self,
        product: &str,
        seller: &str,
        qty: u32,
        execution_price: f64,
        new_listed_price: f64,
    ) -> AppResult<()> {
        if qty == 0 {
            return Err(AppError::validation("Quantity must be positive"));
        }

        let mut products = self.products.write().await;
        let model = find_by_name_mut(&mut products, product)
            .ok_or_else(|| AppError::ProductNotFound(product.to_string()))?;

        let offer = model
            .offer_mut(seller)
            .ok_or_else(|| AppError::OfferNotFound {
                product: product.to_string(),
                seller: seller.to_string(),
            })?;

        if offer.quantity < qty {
            return Err(AppError::InsufficientStock {
                available: offer.quantity,
            });
        }

        offer.quantity -= qty;
        offer.price = new_listed_price;
        offer.record_listing(new_listed_price);
        model.record_trade(execution_price);
        Ok(())
    }

    async fn trade_prices(&self, product: &str, limit: u32) -> AppResult<Vec<f64>> {
        let products = self.products.read().await;
        let Some(model) = find_by_name(&products, product) else {
            return Ok(Vec::new());
        };

        // History is stored oldest first; return newest first
        Ok(model
            .trade_history
            .iter()
            .rev()
            .take(limit as usize)
            .copied()
            .collect())
    }
}

/// In-process user store, pre-seeded with demo accounts so the console
/// is usable without a database.
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    /// Store seeded with `admin`/`admin123` and `seller`/`seller123`.
    pub fn seeded() -> AppResult<Self> {
        let users = vec![
            User::new(
                "admin".to_string(),
                Password::new("admin123")?.into_string(),
                UserRole::Admin,
            ),
            User::new(
                "seller".to_string(),
                Password::new("seller123")?.into_string(),
                UserRole::Seller,
            ),
        ];
        Ok(Self {
            users: RwLock::new(users),
        })
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create(&self, login: &str, password_hash: &str, role: UserRole) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.login == login) {
            return Err(AppError::conflict("User"));
        }
        let user = User::new(login.to_string(), password_hash.to_string(), role);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.login == login).cloned())
    }
}
