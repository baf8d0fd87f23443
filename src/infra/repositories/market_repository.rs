//! Market repository - persistence for products, offers, and trade history.
//!
//! The PostgreSQL store upserts: products conflict on id, offers conflict
//! on (product_id, seller) and accumulate quantity. Purchases run in a
//! single transaction.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::collections::HashMap;

use super::entities::{offer, price_history, product};
use crate::domain::{Offer, Product};
use crate::errors::{AppError, AppResult};

/// Market persistence trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// Insert or update a product by id.
    async fn upsert_product(&self, id: &str, name: &str, category: &str) -> AppResult<()>;

    /// Insert a seller offer, or update its price and add to its quantity.
    async fn upsert_offer(
        &self,
        product_id: &str,
        seller: &str,
        price: f64,
        added_qty: u32,
    ) -> AppResult<()>;

    /// Load all products with their offers.
    async fn fetch_products(&self) -> AppResult<Vec<Product>>;

    /// Find a product id by name (case-insensitive).
    async fn find_product_id(&self, name: &str) -> AppResult<Option<String>>;

    /// Atomic purchase: decrease quantity, re-list at the new price, and
    /// record the execution price in the trade history.
    async fn purchase(
        &self,
        product: &str,
        seller: &str,
        qty: u32,
        execution_price: f64,
        new_listed_price: f64,
    ) -> AppResult<()>;

    /// Last `limit` trade execution prices for a product, newest first.
    async fn trade_prices(&self, product: &str, limit: u32) -> AppResult<Vec<f64>>;
}

/// PostgreSQL-backed market store.
pub struct PgMarketStore {
    db: DatabaseConnection,
}

impl PgMarketStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Case-insensitive product lookup by name.
    async fn find_product_row<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> AppResult<Option<product::Model>> {
        let found = product::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name))).eq(name.to_lowercase()),
            )
            .one(conn)
            .await?;
        Ok(found)
    }
}

#[async_trait]
impl MarketRepository for PgMarketStore {
    async fn upsert_product(&self, id: &str, name: &str, category: &str) -> AppResult<()> {
        let model = product::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            category: Set(category.to_string()),
        };

        product::Entity::insert(model)
            .on_conflict(
                OnConflict::column(product::Column::Id)
                    .update_columns([product::Column::Name, product::Column::Category])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn upsert_offer(
        &self,
        product_id: &str,
        seller: &str,
        price: f64,
        added_qty: u32,
    ) -> AppResult<()> {
        // The quantity column is a signed integer; never store a wrapped value
        let added = i32::try_from(added_qty)
            .map_err(|_| AppError::validation("Quantity exceeds the supported range"))?;

        let model = offer::ActiveModel {
            product_id: Set(product_id.to_string()),
            seller: Set(seller.to_string()),
            price: Set(price),
            quantity: Set(added),
        };

        offer::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([offer::Column::ProductId, offer::Column::Seller])
                    .value(offer::Column::Price, Expr::value(price))
                    .value(
                        offer::Column::Quantity,
                        Expr::col(offer::Column::Quantity).add(Expr::value(added)),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn fetch_products(&self) -> AppResult<Vec<Product>> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;
        let offers = offer::Entity::find().all(&self.db).await?;

        let mut result: Vec<Product> = products
            .into_iter()
            .map(|p| Product::new(p.id, p.name, p.category))
            .collect();
        let index: HashMap<String, usize> = result
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        for row in offers {
            if let Some(&i) = index.get(&row.product_id) {
                result[i]
                    .offers
                    .push(Offer::new(row.seller, row.price, row.quantity.max(0) as u32));
            }
        }

        Ok(result)
    }

    async fn find_product_id(&self, name: &str) -> AppResult<Option<String>> {
        Ok(Self::find_product_row(&self.db, name).await?.map(|p| p.id))
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

        // Dropping the transaction on an error path rolls it back.
        let txn = self.db.begin().await?;

        let Some(product_row) = Self::find_product_row(&txn, product).await? else {
            return Err(AppError::ProductNotFound(product.to_string()));
        };

        let offer_row = offer::Entity::find()
            .filter(offer::Column::ProductId.eq(product_row.id.clone()))
            .filter(
                Expr::expr(Func::lower(Expr::col(offer::Column::Seller)))
                    .eq(seller.to_lowercase()),
            )
            .one(&txn)
            .await?;
        let Some(offer_row) = offer_row else {
            return Err(AppError::OfferNotFound {
                product: product.to_string(),
                seller: seller.to_string(),
            });
        };

        let available = offer_row.quantity.max(0) as u32;
        if available < qty {
            return Err(AppError::InsufficientStock { available });
        }

        // Decrease quantity and re-list at the new price
        offer::Entity::update_many()
            .col_expr(
                offer::Column::Quantity,
                Expr::col(offer::Column::Quantity).sub(Expr::value(qty as i32)),
            )
            .col_expr(offer::Column::Price, Expr::value(new_listed_price))
            .filter(offer::Column::ProductId.eq(product_row.id.clone()))
            .filter(offer::Column::Seller.eq(offer_row.seller.clone()))
            .exec(&txn)
            .await?;

        // Record the execution price
        let history = price_history::ActiveModel {
            id: NotSet,
            product_id: Set(product_row.id),
            price: Set(execution_price),
            traded_at: Set(chrono::Utc::now()),
        };
        price_history::Entity::insert(history)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn trade_prices(&self, product: &str, limit: u32) -> AppResult<Vec<f64>> {
        let Some(product_row) = Self::find_product_row(&self.db, product).await? else {
            return Ok(Vec::new());
        };

        let rows = price_history::Entity::find()
            .filter(price_history::Column::ProductId.eq(product_row.id))
            .order_by_desc(price_history::Column::Id)
            .limit(u64::from(limit))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| r.price).collect())
    }
}
