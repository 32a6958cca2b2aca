//! Domain engine of the boutique: catalog, storefront content, orders and the
//! Telegram audience.
//!
//! Every operation lives on [`Engine`] and goes through the [`Store`] adapter,
//! so the relational backend is chosen by the connection URL alone.

pub use bot_users::Model as BotUser;
pub use carousel_images::Model as CarouselImage;
pub use categories::Model as Category;
pub use error::EngineError;
pub use farms::Model as Farm;
pub use ops::{
    BotUserCounts, BotUserProfile, CarouselInput, Engine, EngineBuilder, FarmInput, NewOrder,
    OrderDetail, OrderLine, PageInput, ProductFilter, ProductInput, ProductRow, ShopStats,
    SocialLinkInput,
};
pub use order_items::Model as OrderItem;
pub use orders::{Model as Order, OrderStatus};
pub use pages::Model as Page;
pub use price::Price;
pub use social_links::Model as SocialLink;
pub use store::Store;

pub mod bot_users;
pub mod carousel_images;
pub mod categories;
pub mod config_entries;
mod error;
pub mod farms;
mod ops;
pub mod order_items;
pub mod orders;
pub mod pages;
mod price;
pub mod products;
pub mod social_links;
mod store;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
