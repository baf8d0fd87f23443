//! Market service - product, offer, and trading use cases.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{DEFAULT_STOCK_PRICE, MAX_QUANTITY, STOCK_SELLER};
use crate::domain::{pricing, Offer, Product};
use crate::errors::{AppError, AppResult};
use crate::infra::MarketRepository;

/// Outcome of a successful purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub product: String,
    pub seller: String,
    pub quantity: u32,
    /// Price the trade executed at (the offer's listed price)
    pub execution_price: f64,
    /// Price the offer was re-listed at
    pub new_listed_price: f64,
    /// Units left in this seller's offer
    pub remaining_in_offer: u32,
}

/// Market service trait for dependency injection.
#[async_trait]
pub trait MarketService: Send + Sync {
    /// Admin: add or update a product; when `initial_qty > 0`, create a
    /// starting "Stock" offer at the default price.
    async fn add_product(
        &self,
        id: &str,
        name: &str,
        category: &str,
        initial_qty: u32,
    ) -> AppResult<()>;

    /// All products with their offers.
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// Products whose name or category contains the query
    /// (case-insensitive). An empty query lists everything.
    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>>;

    /// Find a product by name (case-insensitive).
    async fn find_product(&self, name: &str) -> AppResult<Option<Product>>;

    /// A specific seller's offer for a product.
    async fn get_offer(&self, product: &str, seller: &str) -> AppResult<Option<Offer>>;

    /// Create or update a seller's offer: sets the price and adds quantity.
    async fn place_offer(
        &self,
        product: &str,
        seller: &str,
        added_qty: u32,
        price: f64,
    ) -> AppResult<()>;

    /// Buy from a seller's offer at its listed price. The offer is
    /// re-listed at a supply-driven price and the execution price is
    /// recorded in the product's trade history.
    async fn buy(&self, product: &str, seller: &str, qty: u32) -> AppResult<PurchaseReceipt>;

    /// Last `limit` trade prices for a product, newest first.
    async fn trade_history(&self, product: &str, limit: u32) -> AppResult<Vec<f64>>;
}

/// Concrete implementation of MarketService.
pub struct MarketManager {
    repo: Arc<dyn MarketRepository>,
}

impl MarketManager {
    pub fn new(repo: Arc<dyn MarketRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl MarketService for MarketManager {
    async fn add_product(
        &self,
        id: &str,
        name: &str,
        category: &str,
        initial_qty: u32,
    ) -> AppResult<()> {
        self.repo.upsert_product(id, name, category).await?;
        if initial_qty > 0 {
            self.repo
                .upsert_offer(id, STOCK_SELLER, DEFAULT_STOCK_PRICE, initial_qty)
                .await?;
        }
        Ok(())
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.repo.fetch_products().await
    }

    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
        let products = self.repo.fetch_products().await?;
        let q = query.trim();
        if q.is_empty() {
            return Ok(products);
        }
        Ok(products.into_iter().filter(|p| p.matches(q)).collect())
    }

    async fn find_product(&self, name: &str) -> AppResult<Option<Product>> {
        let products = self.repo.fetch_products().await?;
        Ok(products
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name)))
    }

    async fn get_offer(&self, product: &str, seller: &str) -> AppResult<Option<Offer>> {
        Ok(self
            .find_product(product)
            .await?
            .and_then(|p| p.offer(seller).cloned()))
    }

    async fn place_offer(
        &self,
        product: &str,
        seller: &str,
        added_qty: u32,
        price: f64,
    ) -> AppResult<()> {
        let Some(product_id) = self.repo.find_product_id(product).await? else {
            tracing::warn!(product, "Product not found");
            return Err(AppError::ProductNotFound(product.to_string()));
        };
        if added_qty == 0 {
            return Err(AppError::validation("Initial/added quantity must be positive"));
        }
        if added_qty > MAX_QUANTITY {
            return Err(AppError::validation("Quantity exceeds the supported range"));
        }

        self.repo
            .upsert_offer(&product_id, seller, price, added_qty)
            .await
    }

    async fn buy(&self, product: &str, seller: &str, qty: u32) -> AppResult<PurchaseReceipt> {
        if qty == 0 {
            return Err(AppError::validation("Quantity must be positive"));
        }

        let model = self
            .find_product(product)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(product.to_string()))?;
        let offer = model.offer(seller).ok_or_else(|| AppError::OfferNotFound {
            product: product.to_string(),
            seller: seller.to_string(),
        })?;
        if offer.quantity < qty {
            return Err(AppError::InsufficientStock {
                available: offer.quantity,
            });
        }

        let execution_price = offer.price;
        let seller_name = offer.seller.clone();
        let remaining_in_offer = offer.quantity - qty;
        // Supply left across all of the product's offers once this trade settles
        let remaining_after = model.available_quantity() - qty;
        let new_listed_price = pricing::reprice(execution_price, qty, remaining_after);

        self.repo
            .purchase(product, seller, qty, execution_price, new_listed_price)
            .await?;

        tracing::info!(
            product,
            seller,
            qty,
            execution_price,
            new_listed_price,
            "Trade executed"
        );

        Ok(PurchaseReceipt {
            product: model.name,
            seller: seller_name,
            quantity: qty,
            execution_price,
            new_listed_price,
            remaining_in_offer,
        })
    }

    async fn trade_history(&self, product: &str, limit: u32) -> AppResult<Vec<f64>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.repo.trade_prices(product, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::MockMarketRepository;
    use mockall::predicate::eq;

    fn phone_with_offers() -> Vec<Product> {
        let mut product = Product::new("1", "Phone", "Electronics");
        product.add_offer(Offer::new("Alice", 100.0, 5));
        product.add_offer(Offer::new("Bob", 120.0, 5));
        vec![product]
    }

    #[tokio::test]
    async fn test_add_product_creates_stock_offer() {
        let mut repo = MockMarketRepository::new();
        repo.expect_upsert_product()
            .with(eq("1"), eq("Phone"), eq("Electronics"))
            .returning(|_, _, _| Ok(()));
        repo.expect_upsert_offer()
            .with(eq("1"), eq(STOCK_SELLER), eq(DEFAULT_STOCK_PRICE), eq(7u32))
            .returning(|_, _, _, _| Ok(()));

        let service = MarketManager::new(Arc::new(repo));
        service.add_product("1", "Phone", "Electronics", 7).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_product_without_initial_stock() {
        let mut repo = MockMarketRepository::new();
        repo.expect_upsert_product().returning(|_, _, _| Ok(()));
        repo.expect_upsert_offer().never();

        let service = MarketManager::new(Arc::new(repo));
        service.add_product("1", "Phone", "Electronics", 0).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_filters_by_name_or_category() {
        let mut repo = MockMarketRepository::new();
        repo.expect_fetch_products()
            .returning(|| Ok(phone_with_offers()));

        let service = MarketManager::new(Arc::new(repo));
        assert_eq!(service.search_products("elect").await.unwrap().len(), 1);
        assert_eq!(service.search_products("tablet").await.unwrap().len(), 0);
        assert_eq!(service.search_products("  ").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_place_offer_unknown_product() {
        let mut repo = MockMarketRepository::new();
        repo.expect_find_product_id().returning(|_| Ok(None));

        let service = MarketManager::new(Arc::new(repo));
        let err = service.place_offer("Tablet", "Bob", 3, 50.0).await.unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_place_offer_rejects_zero_quantity() {
        let mut repo = MockMarketRepository::new();
        repo.expect_find_product_id()
            .returning(|_| Ok(Some("1".to_string())));
        repo.expect_upsert_offer().never();

        let service = MarketManager::new(Arc::new(repo));
        let err = service.place_offer("Phone", "Bob", 0, 50.0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_place_offer_rejects_oversized_quantity() {
        let mut repo = MockMarketRepository::new();
        repo.expect_find_product_id()
            .returning(|_| Ok(Some("1".to_string())));
        repo.expect_upsert_offer().never();

        let service = MarketManager::new(Arc::new(repo));
        let err = service
            .place_offer("Phone", "Bob", MAX_QUANTITY + 1, 50.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_buy_reprices_against_total_supply() {
        let mut repo = MockMarketRepository::new();
        repo.expect_fetch_products()
            .returning(|| Ok(phone_with_offers()));
        // 2 bought, 8 remain across both offers: 100 * (1 + 2/10) = 120
        repo.expect_purchase()
            .with(eq("Phone"), eq("Alice"), eq(2u32), eq(100.0), eq(120.0))
            .returning(|_, _, _, _, _| Ok(()));

        let service = MarketManager::new(Arc::new(repo));
        let receipt = service.buy("Phone", "Alice", 2).await.unwrap();
        assert_eq!(receipt.execution_price, 100.0);
        assert_eq!(receipt.new_listed_price, 120.0);
        assert_eq!(receipt.remaining_in_offer, 3);
    }

    #[tokio::test]
    async fn test_buy_rejects_zero_quantity() {
        let repo = MockMarketRepository::new();
        let service = MarketManager::new(Arc::new(repo));
        let err = service.buy("Phone", "Alice", 0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_buy_insufficient_stock_before_hitting_store() {
        let mut repo = MockMarketRepository::new();
        repo.expect_fetch_products()
            .returning(|| Ok(phone_with_offers()));
        repo.expect_purchase().never();

        let service = MarketManager::new(Arc::new(repo));
        let err = service.buy("Phone", "Alice", 6).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { available: 5 }));
    }

    #[tokio::test]
    async fn test_buy_unknown_seller() {
        let mut repo = MockMarketRepository::new();
        repo.expect_fetch_products()
            .returning(|| Ok(phone_with_offers()));

        let service = MarketManager::new(Arc::new(repo));
        let err = service.buy("Phone", "Carol", 1).await.unwrap_err();
        assert!(matches!(err, AppError::OfferNotFound { .. }));
    }

    #[tokio::test]
    async fn test_trade_history_zero_limit() {
        let repo = MockMarketRepository::new();
        let service = MarketManager::new(Arc::new(repo));
        assert!(service.trade_history("Phone", 0).await.unwrap().is_empty());
    }
}
