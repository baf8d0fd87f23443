//! Product and offer domain entities.
//!
//! A product (model) is defined by the exchange admin. Sellers publish
//! offers (price + quantity) against a product; trades execute against a
//! specific seller's offer.

use serde::{Deserialize, Serialize};

use crate::config::PRICE_HISTORY_LIMIT;

/// An individual offer from a seller for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub seller: String,
    /// Current listed price
    pub price: f64,
    /// Units available in this offer
    pub quantity: u32,
    /// Last listed prices for this offer (not trade prices), newest last.
    /// Only maintained by the in-memory store.
    #[serde(default)]
    pub price_history: Vec<f64>,
}

impl Offer {
    pub fn new(seller: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            seller: seller.into(),
            price,
            quantity,
            price_history: Vec::new(),
        }
    }

    /// Append a listed price, keeping only the most recent entries.
    pub fn record_listing(&mut self, listed_price: f64) {
        self.price_history.push(listed_price);
        if self.price_history.len() > PRICE_HISTORY_LIMIT {
            self.price_history.remove(0);
        }
    }
}

impl std::fmt::Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Seller: {} | Price: {:.2} | Quantity: {}",
            self.seller, self.price, self.quantity
        )
    }
}

/// A product model with the offers currently listed against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub offers: Vec<Offer>,
    /// Last trade execution prices, newest last.
    /// Only maintained by the in-memory store; the database keeps all trades.
    #[serde(default)]
    pub trade_history: Vec<f64>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            offers: Vec::new(),
            trade_history: Vec::new(),
        }
    }

    /// Mean of current listed offer prices; 0.0 when there are no offers.
    pub fn market_price(&self) -> f64 {
        if self.offers.is_empty() {
            return 0.0;
        }
        self.offers.iter().map(|o| o.price).sum::<f64>() / self.offers.len() as f64
    }

    /// Total units available across all offers.
    pub fn available_quantity(&self) -> u32 {
        self.offers.iter().map(|o| o.quantity).sum()
    }

    /// Append a trade execution price, keeping only the most recent entries.
    pub fn record_trade(&mut self, price: f64) {
        self.trade_history.push(price);
        if self.trade_history.len() > PRICE_HISTORY_LIMIT {
            self.trade_history.remove(0);
        }
    }

    /// Add an offer unless this seller already has one (case-insensitive).
    ///
    /// Returns false when an offer from the same seller exists.
    pub fn add_offer(&mut self, offer: Offer) -> bool {
        if self.offer(&offer.seller).is_some() {
            return false;
        }
        self.offers.push(offer);
        true
    }

    /// Find this product's offer from a seller (case-insensitive).
    pub fn offer(&self, seller: &str) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|o| o.seller.eq_ignore_ascii_case(seller))
    }

    /// Mutable variant of [`Product::offer`].
    pub fn offer_mut(&mut self, seller: &str) -> Option<&mut Offer> {
        self.offers
            .iter_mut()
            .find(|o| o.seller.eq_ignore_ascii_case(seller))
    }

    /// Whether the query matches the name or category (case-insensitive contains).
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q) || self.category.to_lowercase().contains(&q)
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {} | Product: {} | Category: {} | Market Price: {:.2} | Offers: {} | Available: {}",
            self.id,
            self.name,
            self.category,
            self.market_price(),
            self.offers.len(),
            self.available_quantity()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> Product {
        let mut product = Product::new("1", "Phone", "Electronics");
        product.add_offer(Offer::new("Alice", 100.0, 5));
        product.add_offer(Offer::new("Bob", 120.0, 3));
        product
    }

    #[test]
    fn test_market_price_is_mean_of_offers() {
        let product = phone();
        assert!((product.market_price() - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_market_price_without_offers() {
        let product = Product::new("1", "Phone", "Electronics");
        assert_eq!(product.market_price(), 0.0);
    }

    #[test]
    fn test_available_quantity_sums_offers() {
        assert_eq!(phone().available_quantity(), 8);
    }

    #[test]
    fn test_duplicate_seller_rejected_case_insensitive() {
        let mut product = phone();
        assert!(!product.add_offer(Offer::new("alice", 90.0, 1)));
        assert_eq!(product.offers.len(), 2);
    }

    #[test]
    fn test_offer_lookup_case_insensitive() {
        let product = phone();
        assert!(product.offer("BOB").is_some());
        assert!(product.offer("carol").is_none());
    }

    #[test]
    fn test_trade_history_keeps_last_three() {
        let mut product = phone();
        for price in [1.0, 2.0, 3.0, 4.0] {
            product.record_trade(price);
        }
        assert_eq!(product.trade_history, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_offer_listing_history_keeps_last_three() {
        let mut offer = Offer::new("Alice", 10.0, 5);
        for price in [10.0, 11.0, 12.0, 13.0] {
            offer.record_listing(price);
        }
        assert_eq!(offer.price_history, vec![11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_matches_name_or_category() {
        let product = phone();
        assert!(product.matches("pho"));
        assert!(product.matches("ELECT"));
        assert!(!product.matches("furniture"));
    }
}
