//! JSON shapes of the boutique HTTP API.
//!
//! Prices always leave the server as decimal strings (`"12.50"`); on input a
//! JSON number is accepted too, see [`PriceValue`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price as sent by clients: `"12.50"` or `12.5`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(f64),
}

/// Generic acknowledgement for deletes.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

/// Every non-2xx response carries this body.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub database: String,
}

pub mod product {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Product {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub price: String,
        pub image_url: Option<String>,
        pub category_id: Option<i32>,
        pub category_name: Option<String>,
        pub farm_id: Option<i32>,
        pub farm_name: Option<String>,
        pub stock: i32,
        pub is_available: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductList {
        pub products: Vec<Product>,
    }

    /// Query string of `GET /api/products`.
    ///
    /// `category` and `farm` take an id or a name; `all` means no filter.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductQuery {
        pub category: Option<String>,
        pub farm: Option<String>,
        pub search: Option<String>,
    }

    /// Body of product create and replace.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductWrite {
        pub name: String,
        pub description: Option<String>,
        pub price: PriceValue,
        pub image_url: Option<String>,
        pub category_id: Option<i32>,
        pub farm_id: Option<i32>,
        #[serde(default)]
        pub stock: i32,
        pub is_available: Option<bool>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub categories: Vec<Category>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryWrite {
        pub name: String,
        pub description: Option<String>,
    }
}

pub mod farm {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Farm {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub location: Option<String>,
        pub contact: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FarmList {
        pub farms: Vec<Farm>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FarmWrite {
        pub name: String,
        pub description: Option<String>,
        pub location: Option<String>,
        pub contact: Option<String>,
    }
}

pub mod carousel {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CarouselImage {
        pub id: i32,
        pub image_url: String,
        pub title: Option<String>,
        pub order_index: i32,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarouselList {
        pub images: Vec<CarouselImage>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarouselWrite {
        pub image_url: String,
        pub title: Option<String>,
        pub order_index: Option<i32>,
        pub active: Option<bool>,
    }
}

pub mod config {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShopConfig {
        pub config: BTreeMap<String, String>,
    }
}

pub mod social {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SocialLink {
        pub id: i32,
        pub name: String,
        pub url: String,
        pub icon: String,
        pub is_active: bool,
        pub sort_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SocialLinkList {
        pub links: Vec<SocialLink>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SocialLinkWrite {
        pub name: String,
        pub url: String,
        pub icon: Option<String>,
        pub is_active: Option<bool>,
        pub sort_order: Option<i32>,
    }
}

pub mod page {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Page {
        pub slug: String,
        pub title: String,
        pub content: String,
        pub is_active: bool,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PageList {
        pub pages: Vec<Page>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PageWrite {
        pub title: String,
        #[serde(default)]
        pub content: String,
        pub is_active: Option<bool>,
    }
}

pub mod order {
    use super::*;

    /// Lifecycle of an order. The admin may set any status.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OrderStatus {
        Pending,
        Confirmed,
        Shipped,
        Delivered,
        Cancelled,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OrderItemNew {
        pub product_id: i32,
        pub quantity: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderNew {
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub telegram_id: Option<i64>,
        pub shipping_address: Option<String>,
        pub notes: Option<String>,
        pub items: Vec<OrderItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderCreated {
        pub order_id: i32,
        pub total: String,
        pub status: OrderStatus,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Order {
        pub id: i32,
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub telegram_id: Option<i64>,
        pub shipping_address: Option<String>,
        pub notes: Option<String>,
        pub total: String,
        pub status: OrderStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OrderItem {
        pub product_id: i32,
        pub quantity: i32,
        pub unit_price: String,
        pub total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderDetail {
        #[serde(flatten)]
        pub order: Order,
        pub items: Vec<OrderItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderList {
        pub orders: Vec<Order>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OrderQuery {
        pub status: Option<OrderStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderStatusUpdate {
        pub status: OrderStatus,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub expires_at: DateTime<Utc>,
    }
}

pub mod upload {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UploadResponse {
        /// Public URL of the stored object.
        pub url: String,
        /// Object key inside the store (`images/...`).
        pub key: String,
        pub size: usize,
        pub content_type: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Stats {
        pub products: u64,
        pub available_products: u64,
        pub categories: u64,
        pub farms: u64,
        pub orders: u64,
        pub pending_orders: u64,
        pub bot_users: u64,
        pub broadcast_eligible: u64,
    }
}
