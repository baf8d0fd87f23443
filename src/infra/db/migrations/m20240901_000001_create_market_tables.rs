//! Migration: Create products, offers, and price_history tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).text().not_null())
                    .col(ColumnDef::new(Products::Category).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Offers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offers::ProductId).text().not_null())
                    .col(ColumnDef::new(Offers::Seller).text().not_null())
                    .col(ColumnDef::new(Offers::Price).double().not_null())
                    .col(ColumnDef::new(Offers::Quantity).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Offers::ProductId)
                            .col(Offers::Seller),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offers_product")
                            .from(Offers::Table, Offers::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PriceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceHistory::ProductId).text().not_null())
                    .col(ColumnDef::new(PriceHistory::Price).double().not_null())
                    .col(
                        ColumnDef::new(PriceHistory::TradedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_history_product")
                            .from(PriceHistory::Table, PriceHistory::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Trade history is always queried per product
        manager
            .create_index(
                Index::create()
                    .name("idx_price_history_product_id")
                    .table(PriceHistory::Table)
                    .col(PriceHistory::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Category,
}

#[derive(Iden)]
enum Offers {
    Table,
    ProductId,
    Seller,
    Price,
    Quantity,
}

#[derive(Iden)]
enum PriceHistory {
    Table,
    Id,
    ProductId,
    Price,
    TradedAt,
}
