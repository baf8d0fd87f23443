//! End-to-end market flows over the in-memory backend.

use market_exchange::config::MAX_QUANTITY;
use market_exchange::errors::AppError;
use market_exchange::services::{AuthService, MarketService, ServiceContainer, Services};

fn services() -> Services {
    Services::in_memory().expect("in-memory services")
}

#[tokio::test]
async fn test_admin_stocks_a_new_product() {
    let services = services();
    let market = services.market();

    market.add_product("p1", "Phone", "Electronics", 10).await.unwrap();

    let products = market.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Phone");
    assert_eq!(products[0].available_quantity(), 10);

    let stock = market.get_offer("Phone", "Stock").await.unwrap().unwrap();
    assert_eq!(stock.price, 10.0);
    assert_eq!(stock.quantity, 10);
}

#[tokio::test]
async fn test_seller_offer_upsert_accumulates() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 0).await.unwrap();

    market.place_offer("Phone", "alice", 5, 120.0).await.unwrap();
    market.place_offer("phone", "Alice", 3, 110.0).await.unwrap();

    let offer = market.get_offer("Phone", "ALICE").await.unwrap().unwrap();
    assert_eq!(offer.quantity, 8);
    assert_eq!(offer.price, 110.0);
}

#[tokio::test]
async fn test_offer_quantity_is_bounded() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 0).await.unwrap();

    let err = market
        .place_offer("Phone", "Alice", u32::MAX, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Accumulating past the cap saturates instead of wrapping
    market.place_offer("Phone", "Alice", MAX_QUANTITY, 10.0).await.unwrap();
    market.place_offer("Phone", "Alice", 1, 10.0).await.unwrap();

    let offer = market.get_offer("Phone", "Alice").await.unwrap().unwrap();
    assert_eq!(offer.quantity, MAX_QUANTITY);
}

#[tokio::test]
async fn test_purchase_reprices_and_records_history() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 0).await.unwrap();
    market.place_offer("Phone", "Alice", 10, 100.0).await.unwrap();

    // Buy 5 of 10: 100 * (1 + 5/10) = 150
    let receipt = market.buy("Phone", "Alice", 5).await.unwrap();
    assert_eq!(receipt.execution_price, 100.0);
    assert_eq!(receipt.new_listed_price, 150.0);
    assert_eq!(receipt.remaining_in_offer, 5);

    // Next trade executes at the re-listed price
    let receipt = market.buy("Phone", "Alice", 5).await.unwrap();
    assert_eq!(receipt.execution_price, 150.0);
    // Last units: price doubles
    assert_eq!(receipt.new_listed_price, 300.0);
    assert_eq!(receipt.remaining_in_offer, 0);

    let history = market.trade_history("Phone", 3).await.unwrap();
    assert_eq!(history, vec![150.0, 100.0]);
}

#[tokio::test]
async fn test_purchase_failures_are_typed() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 0).await.unwrap();
    market.place_offer("Phone", "Alice", 2, 100.0).await.unwrap();

    let err = market.buy("Tablet", "Alice", 1).await.unwrap_err();
    assert!(matches!(err, AppError::ProductNotFound(_)));

    let err = market.buy("Phone", "Bob", 1).await.unwrap_err();
    assert!(matches!(err, AppError::OfferNotFound { .. }));

    let err = market.buy("Phone", "Alice", 3).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { available: 2 }));

    let err = market.buy("Phone", "Alice", 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Failed purchases leave the offer untouched
    let offer = market.get_offer("Phone", "Alice").await.unwrap().unwrap();
    assert_eq!(offer.quantity, 2);
    assert_eq!(offer.price, 100.0);
}

#[tokio::test]
async fn test_search_by_name_and_category() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 1).await.unwrap();
    market.add_product("p2", "Desk", "Furniture", 1).await.unwrap();

    let hits = market.search_products("elect").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Phone");

    let hits = market.search_products("e").await.unwrap();
    assert_eq!(hits.len(), 2);

    // Blank query lists everything
    let hits = market.search_products("   ").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_trade_history_limit_and_order() {
    let services = services();
    let market = services.market();
    market.add_product("p1", "Phone", "Electronics", 0).await.unwrap();
    market.place_offer("Phone", "Alice", 100, 10.0).await.unwrap();

    let mut executed = Vec::new();
    for _ in 0..4 {
        let receipt = market.buy("Phone", "Alice", 1).await.unwrap();
        executed.push(receipt.execution_price);
    }

    let history = market.trade_history("Phone", 3).await.unwrap();
    assert_eq!(history.len(), 3);
    // Newest first
    assert_eq!(history[0], executed[3]);
    assert_eq!(history[2], executed[1]);

    assert!(market.trade_history("Phone", 0).await.unwrap().is_empty());
    assert!(market.trade_history("Unknown", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_demo_accounts_login() {
    let services = services();
    let auth = services.auth();

    let admin = auth.login("admin", "admin123").await.unwrap();
    assert!(admin.is_admin());

    let err = auth.login("admin", "nope").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}
