//! Initial schema migration.
//!
//! Creates every table used by the shop:
//!
//! - `categories`, `farms`: catalog groupings referenced by products
//! - `products`: the catalog itself, with nullable category/farm references
//! - `carousel_images`: storefront banner slides
//! - `config_entries`: key/value shop branding and contact details
//! - `social_links`, `pages`: storefront footer links and info pages
//! - `orders`, `order_items`: placed orders and their lines
//! - `bot_users`: Telegram users known to the bot

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Farms {
    Table,
    Id,
    Name,
    Description,
    Location,
    Contact,
    CreatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    PriceCents,
    ImageUrl,
    CategoryId,
    FarmId,
    Stock,
    IsAvailable,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CarouselImages {
    Table,
    Id,
    ImageUrl,
    Title,
    OrderIndex,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum ConfigEntries {
    Table,
    Key,
    Value,
    UpdatedAt,
}

#[derive(Iden)]
enum SocialLinks {
    Table,
    Id,
    Name,
    Url,
    Icon,
    IsActive,
    SortOrder,
}

#[derive(Iden)]
enum Pages {
    Table,
    Id,
    Slug,
    Title,
    Content,
    IsActive,
    UpdatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    CustomerName,
    CustomerPhone,
    TelegramId,
    ShippingAddress,
    Notes,
    TotalCents,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    UnitPriceCents,
    TotalCents,
}

#[derive(Iden)]
enum BotUsers {
    Table,
    TelegramId,
    Username,
    FirstName,
    LastName,
    LanguageCode,
    NotificationsEnabled,
    Blocked,
    BlockedAt,
    LastSeen,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Categories and farms
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).text())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Farms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Farms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Farms::Name).string().not_null())
                    .col(ColumnDef::new(Farms::Description).text())
                    .col(ColumnDef::new(Farms::Location).string())
                    .col(ColumnDef::new(Farms::Contact).string())
                    .col(
                        ColumnDef::new(Farms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).text())
                    .col(
                        ColumnDef::new(Products::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::ImageUrl).string())
                    .col(ColumnDef::new(Products::CategoryId).integer())
                    .col(ColumnDef::new(Products::FarmId).integer())
                    .col(
                        ColumnDef::new(Products::Stock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-farm_id")
                            .from(Products::Table, Products::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-category_id")
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-products-farm_id")
                    .table(Products::Table)
                    .col(Products::FarmId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Storefront content
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CarouselImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarouselImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CarouselImages::ImageUrl).string().not_null())
                    .col(ColumnDef::new(CarouselImages::Title).string())
                    .col(
                        ColumnDef::new(CarouselImages::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CarouselImages::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CarouselImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigEntries::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConfigEntries::Value).text().not_null())
                    .col(
                        ColumnDef::new(ConfigEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SocialLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialLinks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SocialLinks::Name).string().not_null())
                    .col(ColumnDef::new(SocialLinks::Url).string().not_null())
                    .col(
                        ColumnDef::new(SocialLinks::Icon)
                            .string()
                            .not_null()
                            .default("🔗"),
                    )
                    .col(
                        ColumnDef::new(SocialLinks::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SocialLinks::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pages::Slug).string().not_null())
                    .col(ColumnDef::new(Pages::Title).string().not_null())
                    .col(ColumnDef::new(Pages::Content).text().not_null())
                    .col(
                        ColumnDef::new(Pages::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Pages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pages-slug-unique")
                    .table(Pages::Table)
                    .col(Pages::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                    .col(ColumnDef::new(Orders::CustomerPhone).string())
                    .col(ColumnDef::new(Orders::TelegramId).big_integer())
                    .col(ColumnDef::new(Orders::ShippingAddress).text())
                    .col(ColumnDef::new(Orders::Notes).text())
                    .col(ColumnDef::new(Orders::TotalCents).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-telegram_id")
                    .table(Orders::Table)
                    .col(Orders::TelegramId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(OrderItems::UnitPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderItems::TotalCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_items-order_id")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_items-product_id")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-order_items-order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Telegram bot users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BotUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BotUsers::TelegramId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BotUsers::Username).string())
                    .col(ColumnDef::new(BotUsers::FirstName).string())
                    .col(ColumnDef::new(BotUsers::LastName).string())
                    .col(ColumnDef::new(BotUsers::LanguageCode).string())
                    .col(
                        ColumnDef::new(BotUsers::NotificationsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BotUsers::Blocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BotUsers::BlockedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(BotUsers::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BotUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BotUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CarouselImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Farms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
