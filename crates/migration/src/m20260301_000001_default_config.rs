//! Seeds the shop configuration keys the storefront and the bot read.
//!
//! Existing keys are left untouched so the migration can run against a
//! database that was populated by hand.

use chrono::Utc;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ConfigEntries {
    Table,
    Key,
    Value,
    UpdatedAt,
}

const DEFAULTS: &[(&str, &str)] = &[
    ("shop_name", "Boutique"),
    ("shop_description", "Fresh products from local farms"),
    ("welcome_message", "🛍️ Welcome {firstname}!"),
    ("contact_info", ""),
    ("telegram_username", ""),
    ("whatsapp_link", ""),
    ("theme_color", "glow"),
    ("background_image", ""),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now();
        for (key, value) in DEFAULTS {
            let stmt = Query::insert()
                .into_table(ConfigEntries::Table)
                .columns([
                    ConfigEntries::Key,
                    ConfigEntries::Value,
                    ConfigEntries::UpdatedAt,
                ])
                .values_panic([(*key).into(), (*value).into(), now.into()])
                .on_conflict(
                    OnConflict::column(ConfigEntries::Key)
                        .do_nothing()
                        .to_owned(),
                )
                .to_owned();
            manager.exec_stmt(stmt).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let keys = DEFAULTS.iter().map(|(key, _)| *key);
        let stmt = Query::delete()
            .from_table(ConfigEntries::Table)
            .and_where(Expr::col(ConfigEntries::Key).is_in(keys))
            .to_owned();
        manager.exec_stmt(stmt).await
    }
}
