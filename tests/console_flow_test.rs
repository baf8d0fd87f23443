//! Console flows driven through in-memory buffers.

use std::io::Cursor;
use std::sync::Arc;

use market_exchange::services::{MarketService, ServiceContainer, Services};
use market_exchange::Console;

async fn run_console(services: Arc<Services>, script: &[&str]) -> String {
    let input = script.join("\n") + "\n";
    let mut output: Vec<u8> = Vec::new();

    let mut console = Console::new(Cursor::new(input.into_bytes()), &mut output, services);
    console.run().await.expect("console run");

    String::from_utf8(output).expect("utf8 console output")
}

#[tokio::test]
async fn test_admin_adds_product_then_buy_and_history() {
    let services = Arc::new(Services::in_memory().unwrap());

    let script = [
        "3", // add product, triggers login
        "admin",
        "admin123",
        "p1",
        "Phone",
        "Electronics",
        "99.5",
        "10",
        "", // press enter
        "5", // buy
        "Phone",
        "Stock",
        "4",
        "",
        "7", // price history
        "Phone",
        "",
        "9", // exit
    ];
    let output = run_console(services, &script).await;

    assert!(output.contains("Logged in as admin (admin)"));
    assert!(output.contains("[OK] Product added/updated."));
    assert!(output.contains("[OK] Bought 4 of Phone from Stock"));
    // 99.5 * (1 + 4/10) = 139.30
    assert!(output.contains("New listed price: 139.30, remaining qty: 6"));
    assert!(output.contains("Last 3 trade prices for \"Phone\": [99.50]"));
    assert!(output.contains("Bye!"));
}

#[tokio::test]
async fn test_seller_manages_offer() {
    let services = Arc::new(Services::in_memory().unwrap());
    services
        .market()
        .add_product("p1", "Phone", "Electronics", 3)
        .await
        .unwrap();

    let script = [
        "4", // manage offers, triggers login
        "seller",
        "seller123",
        "Phone",
        "4294967295", // over the quantity cap, re-asked
        "5",
        "80",
        "",
        "9",
    ];
    let output = run_console(services.clone(), &script).await;

    assert!(output.contains("Logged in as seller (seller)"));
    assert!(output.contains("Please enter a whole number between 0 and 2147483647."));
    assert!(output.contains("[OK] Offer upserted."));

    let offer = services
        .market()
        .get_offer("Phone", "seller")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.quantity, 5);
    assert_eq!(offer.price, 80.0);
}

#[tokio::test]
async fn test_buy_unknown_seller_lists_alternatives() {
    let services = Arc::new(Services::in_memory().unwrap());
    services
        .market()
        .add_product("p1", "Phone", "Electronics", 3)
        .await
        .unwrap();

    let script = ["5", "Phone", "ghost", "1", "", "9"];
    let output = run_console(services, &script).await;

    assert!(output.contains("[FAIL] Seller offer not found: ghost for Phone"));
    assert!(output.contains("[HINT] Available sellers: [\"Stock\"]"));
}

#[tokio::test]
async fn test_buy_failures_explained() {
    let services = Arc::new(Services::in_memory().unwrap());
    services
        .market()
        .add_product("p1", "Phone", "Electronics", 2)
        .await
        .unwrap();

    let script = [
        "5", // unknown product
        "Tablet",
        "Stock",
        "1",
        "",
        "5", // too much
        "Phone",
        "Stock",
        "5",
        "",
        "9",
    ];
    let output = run_console(services, &script).await;

    assert!(output.contains("[FAIL] Product not found: Tablet"));
    assert!(output.contains("[FAIL] Not enough stock in seller offer. Available: 2"));
}

#[tokio::test]
async fn test_invalid_credentials_and_access_denied() {
    let services = Arc::new(Services::in_memory().unwrap());

    let script = [
        "8", // explicit login, wrong password
        "admin",
        "wrong-password",
        "",
        "3", // add product as non-admin: login as seller, then denied
        "seller",
        "seller123",
        "",
        "9",
    ];
    let output = run_console(services, &script).await;

    assert!(output.contains("Invalid credentials."));
    assert!(output.contains("[ERROR] Access denied (admin required)."));
}

#[tokio::test]
async fn test_list_and_search() {
    let services = Arc::new(Services::in_memory().unwrap());
    services
        .market()
        .add_product("p1", "Phone", "Electronics", 3)
        .await
        .unwrap();
    services
        .market()
        .add_product("p2", "Desk", "Furniture", 1)
        .await
        .unwrap();

    let script = ["1", "", "2", "furn", "", "9"];
    let output = run_console(services, &script).await;

    assert!(output.contains("Product: Phone | Category: Electronics"));
    assert!(output.contains("Found:"));
    assert!(output.contains("Product: Desk | Category: Furniture"));
    assert!(!output.contains("No results."));
}

#[tokio::test]
async fn test_empty_market_listing() {
    let services = Arc::new(Services::in_memory().unwrap());

    let script = ["1", "", "9"];
    let output = run_console(services, &script).await;

    assert!(output.contains("(no items)"));
}
