use sea_orm::{PaginatorTrait, QueryFilter, prelude::*};

use crate::{OrderStatus, ResultEngine, categories, farms, orders, products};

use super::Engine;

/// Dashboard counters for the admin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShopStats {
    pub products: u64,
    pub available_products: u64,
    pub categories: u64,
    pub farms: u64,
    pub orders: u64,
    pub pending_orders: u64,
    pub bot_users: u64,
    pub broadcast_eligible: u64,
}

impl Engine {
    /// `exclude` is the admin chat, left out of the broadcast audience.
    pub async fn stats(&self, exclude: Option<i64>) -> ResultEngine<ShopStats> {
        let db = &self.database;
        let users = self.bot_user_counts(exclude).await?;
        Ok(ShopStats {
            products: products::Entity::find().count(db).await?,
            available_products: products::Entity::find()
                .filter(products::Column::IsAvailable.eq(true))
                .count(db)
                .await?,
            categories: categories::Entity::find().count(db).await?,
            farms: farms::Entity::find().count(db).await?,
            orders: orders::Entity::find().count(db).await?,
            pending_orders: orders::Entity::find()
                .filter(orders::Column::Status.eq(OrderStatus::Pending.as_str()))
                .count(db)
                .await?,
            bot_users: users.total,
            broadcast_eligible: users.eligible,
        })
    }
}
