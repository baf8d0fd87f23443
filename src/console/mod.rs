//! Interactive console UI.
//!
//! A menu loop over stdin/stdout. Generic over the reader and writer so
//! flows can be exercised in tests with in-memory buffers. Prompts are
//! strict and re-ask until they get a usable value.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::config::{MAX_QUANTITY, STOCK_SELLER};
use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::services::{AuthService, MarketService, ServiceContainer};

const BANNER: &str = "\
==========================================
         Welcome to the Market
==========================================
";

const MENU: &str = "\
What do you want to do?
  1) List all products
  2) Search products
  3) Add product (admin)
  4) Manage your offers (seller)
  5) Buy product
  6) Sell product (seller)
  7) Show price history
  8) Login
  9) Exit
";

pub struct Console<R, W> {
    input: R,
    output: W,
    services: Arc<dyn ServiceContainer>,
    current_user: Option<User>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            input,
            output,
            services,
            current_user: None,
        }
    }

    /// Set the active user without going through the login flow (tests).
    pub fn set_current_user(&mut self, user: Option<User>) {
        self.current_user = user;
    }

    // ---------- main loop ----------

    pub async fn run(&mut self) -> AppResult<()> {
        self.clear_screen()?;
        writeln!(self.output, "{}", BANNER)?;

        loop {
            self.print_menu()?;
            let Some(choice) = self.read_menu_choice(1, 9)? else {
                // Input closed; leave quietly
                return Ok(());
            };

            match choice {
                1 => {
                    self.println_info("You chose: List all products")?;
                    self.list_products().await?;
                }
                2 => {
                    self.println_info("You chose: Search products")?;
                    self.search_products().await?;
                }
                3 => {
                    self.println_info("You chose: Add product (admin)")?;
                    self.ensure_logged_in(UserRole::Admin).await?;
                    if self.is_role(UserRole::Admin) {
                        self.println_hint(
                            "Enter line by line: ID, Name, Category, Initial price, Initial quantity",
                        )?;
                        self.add_product().await?;
                    } else {
                        self.println_error("Access denied (admin required).")?;
                    }
                }
                4 | 6 => {
                    let label = if choice == 4 {
                        "You chose: Manage your offers (seller)"
                    } else {
                        "You chose: Sell product (seller)"
                    };
                    self.println_info(label)?;
                    self.ensure_logged_in(UserRole::Seller).await?;
                    if self.is_role(UserRole::Seller) {
                        self.println_hint("Enter line by line: Product, Quantity, Price")?;
                        self.sell_item().await?;
                    } else {
                        self.println_error("Access denied (seller required).")?;
                    }
                }
                5 => {
                    self.println_info("You chose: Buy product")?;
                    self.println_hint("Enter line by line: Product, Seller, Quantity")?;
                    self.buy_item().await?;
                }
                7 => {
                    self.println_info("You chose: Show price history")?;
                    self.show_history().await?;
                }
                8 => {
                    self.println_info("You chose: Login")?;
                    self.login().await?;
                }
                _ => {
                    self.println_info("Bye!")?;
                    return Ok(());
                }
            }

            self.pause()?;
            self.clear_screen()?;
        }
    }

    // ---------- actions ----------

    /// Admin adds/updates a product and an initial "Stock" offer.
    async fn add_product(&mut self) -> AppResult<()> {
        let id = self.read_non_empty("ID: ")?;
        let name = self.read_non_empty("Name: ")?;
        let category = self.read_non_empty("Category: ")?;
        let price = self.read_f64("Initial price: ")?;
        let qty = self.read_u32("Initial quantity: ")?;

        let market = self.services.market();
        market.add_product(&id, &name, &category, 0).await?;
        if qty > 0 {
            if let Err(e) = market.place_offer(&name, STOCK_SELLER, qty, price).await {
                self.println_error(&format!("Could not create starting stock: {}", e))?;
                return Ok(());
            }
        }
        writeln!(self.output, "[OK] Product added/updated.")?;
        Ok(())
    }

    /// Seller creates/updates own offer (fixed order: Product, Quantity, Price).
    async fn sell_item(&mut self) -> AppResult<()> {
        let product = self.read_non_empty("Product: ")?;
        let qty = self.read_u32("Quantity to add: ")?;
        let price = self.read_f64("New price: ")?;

        let seller = self
            .current_user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_else(|| "unknown".to_string());

        match self
            .services
            .market()
            .place_offer(&product, &seller, qty, price)
            .await
        {
            Ok(()) => writeln!(self.output, "[OK] Offer upserted.")?,
            Err(e) => writeln!(self.output, "[FAIL] Offer update failed: {}", e)?,
        }
        Ok(())
    }

    /// Buy from a seller (fixed order: Product, Seller, Quantity).
    async fn buy_item(&mut self) -> AppResult<()> {
        let product = self.read_non_empty("Product: ")?;
        let seller = self.read_non_empty("Seller: ")?;
        let qty = self.read_u32("How much do you want to buy: ")?;

        let market = self.services.market();
        match market.buy(&product, &seller, qty).await {
            Ok(receipt) => {
                writeln!(
                    self.output,
                    "[OK] Bought {} of {} from {}",
                    receipt.quantity, receipt.product, receipt.seller
                )?;
                writeln!(
                    self.output,
                    "[INFO] New listed price: {:.2}, remaining qty: {}",
                    receipt.new_listed_price, receipt.remaining_in_offer
                )?;
                if let Some(offer) = market.get_offer(&product, &seller).await? {
                    if !offer.price_history.is_empty() {
                        writeln!(
                            self.output,
                            "[INFO] Offer price history: {:?}",
                            offer.price_history
                        )?;
                    }
                }
            }
            Err(AppError::ProductNotFound(name)) => {
                writeln!(self.output, "[FAIL] Product not found: {}", name)?;
            }
            Err(AppError::OfferNotFound { product, seller }) => {
                writeln!(
                    self.output,
                    "[FAIL] Seller offer not found: {} for {}",
                    seller, product
                )?;
                if let Some(model) = market.find_product(&product).await? {
                    let sellers: Vec<&str> =
                        model.offers.iter().map(|o| o.seller.as_str()).collect();
                    writeln!(self.output, "[HINT] Available sellers: {:?}", sellers)?;
                }
            }
            Err(AppError::InsufficientStock { available }) => {
                writeln!(
                    self.output,
                    "[FAIL] Not enough stock in seller offer. Available: {}",
                    available
                )?;
            }
            Err(AppError::Validation(msg)) => {
                writeln!(self.output, "[FAIL] {}", msg)?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Show last 3 trade execution prices (product-level).
    async fn show_history(&mut self) -> AppResult<()> {
        let name = self.read_non_empty("Product name: ")?;
        let prices = self.services.market().trade_history(&name, 3).await?;
        if prices.is_empty() {
            writeln!(self.output, "No trade history yet.")?;
            return Ok(());
        }

        let rendered = prices
            .iter()
            .map(|p| format!("{:.2}", p))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            self.output,
            "Last 3 trade prices for \"{}\": [{}]",
            name, rendered
        )?;
        Ok(())
    }

    async fn list_products(&mut self) -> AppResult<()> {
        let products = self.services.market().list_products().await?;
        if products.is_empty() {
            writeln!(self.output, "(no items)")?;
            return Ok(());
        }
        for product in products {
            writeln!(self.output, "{}", product)?;
            for offer in &product.offers {
                writeln!(self.output, "  -> {}", offer)?;
            }
        }
        Ok(())
    }

    async fn search_products(&mut self) -> AppResult<()> {
        let query = self.read_non_empty("Search by name or category: ")?;
        let results = self.services.market().search_products(&query).await?;
        if results.is_empty() {
            writeln!(self.output, "No results.")?;
            return Ok(());
        }
        writeln!(self.output, "Found:")?;
        for product in results {
            writeln!(
                self.output,
                "  Product: {} | Category: {}",
                product.name, product.category
            )?;
            for offer in &product.offers {
                writeln!(
                    self.output,
                    "    -> Seller: {}, Price: {}, Quantity: {}",
                    offer.seller, offer.price, offer.quantity
                )?;
            }
        }
        Ok(())
    }

    // ---------- auth ----------

    fn is_role(&self, role: UserRole) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.role == role)
    }

    async fn ensure_logged_in(&mut self, role: UserRole) -> AppResult<()> {
        if !self.is_role(role) {
            self.login().await?;
        }
        Ok(())
    }

    async fn login(&mut self) -> AppResult<()> {
        let login = self.read_non_empty("Login: ")?;
        let password = self.read_non_empty("Password: ")?;

        match self.services.auth().login(&login, &password).await {
            Ok(user) => {
                writeln!(
                    self.output,
                    "Logged in as {} ({})",
                    user.login, user.role
                )?;
                self.current_user = Some(user);
            }
            Err(AppError::InvalidCredentials) => {
                writeln!(self.output, "Invalid credentials.")?;
                self.current_user = None;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    // ---------- input helpers ----------

    /// Read one line; None when the input is closed.
    fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_non_empty(&mut self, prompt: &str) -> AppResult<String> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(value) = self.read_line()? else {
                return Err(input_closed());
            };
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "Please enter a non-empty value.")?;
        }
    }

    fn read_u32(&mut self, prompt: &str) -> AppResult<u32> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(value) = self.read_line()? else {
                return Err(input_closed());
            };
            match value.parse::<u32>() {
                Ok(n) if n <= MAX_QUANTITY => return Ok(n),
                _ => writeln!(
                    self.output,
                    "Please enter a whole number between 0 and {}.",
                    MAX_QUANTITY
                )?,
            }
        }
    }

    fn read_f64(&mut self, prompt: &str) -> AppResult<f64> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(value) = self.read_line()? else {
                return Err(input_closed());
            };
            match value.replace(',', ".").parse::<f64>() {
                Ok(n) => return Ok(n),
                Err(_) => writeln!(self.output, "Please enter a decimal number, e.g. 1.23")?,
            }
        }
    }

    fn read_menu_choice(&mut self, min: u32, max: u32) -> AppResult<Option<u32>> {
        loop {
            let Some(value) = self.read_line()? else {
                return Ok(None);
            };
            if let Ok(n) = value.parse::<u32>() {
                if n >= min && n <= max {
                    return Ok(Some(n));
                }
            }
            write!(self.output, "Enter a number from {} to {}: ", min, max)?;
            self.output.flush()?;
        }
    }

    // ---------- UI helpers ----------

    fn print_menu(&mut self) -> AppResult<()> {
        writeln!(self.output, "{}", MENU)?;
        match &self.current_user {
            Some(user) => writeln!(
                self.output,
                "Current user: {} [{}]",
                user.login, user.role
            )?,
            None => writeln!(
                self.output,
                "You are not logged in. Some actions will require login."
            )?,
        }
        write!(self.output, "\nYour choice (1-9): ")?;
        self.output.flush()?;
        Ok(())
    }

    fn pause(&mut self) -> AppResult<()> {
        write!(self.output, "\nPress Enter to continue...")?;
        self.output.flush()?;
        // Swallow one line; closed input is handled by the next menu read
        self.read_line()?;
        Ok(())
    }

    fn clear_screen(&mut self) -> AppResult<()> {
        write!(self.output, "\x1b[H\x1b[2J")?;
        self.output.flush()?;
        Ok(())
    }

    fn println_info(&mut self, msg: &str) -> AppResult<()> {
        writeln!(self.output, "[INFO] {}", msg)?;
        Ok(())
    }

    fn println_error(&mut self, msg: &str) -> AppResult<()> {
        writeln!(self.output, "[ERROR] {}", msg)?;
        Ok(())
    }

    fn println_hint(&mut self, msg: &str) -> AppResult<()> {
        writeln!(self.output, "[HINT] {}", msg)?;
        Ok(())
    }
}

fn input_closed() -> AppError {
    std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "input closed").into()
}
