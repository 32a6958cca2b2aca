use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::ResultEngine;

mod bot_users;
mod carousel;
mod categories;
mod config;
mod farms;
mod orders;
mod pages;
mod products;
mod social_links;
mod stats;

pub use bot_users::{BotUserCounts, BotUserProfile};
pub use carousel::CarouselInput;
pub use farms::FarmInput;
pub use orders::{NewOrder, OrderDetail, OrderLine};
pub use pages::PageInput;
pub use products::{ProductFilter, ProductInput, ProductRow};
pub use social_links::SocialLinkInput;
pub use stats::ShopStats;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every shop operation.
///
/// Cheap to share behind an `Arc`: it only holds the connection pool.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Check the database answers.
    pub async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }

    /// Name of the backend in use (`sqlite`, `postgres`, ...).
    pub fn backend_name(&self) -> String {
        format!("{:?}", self.database.get_database_backend()).to_lowercase()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
