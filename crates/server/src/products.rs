//! Product API endpoints.

use api_types::{
    PriceValue, Success,
    product::{Product, ProductList, ProductQuery, ProductWrite},
};
use axum::{extract::State, http::StatusCode};
use engine::{Price, ProductFilter, ProductInput, ProductRow};

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub(crate) fn parse_price(value: &PriceValue) -> Result<Price, ServerError> {
    let price = match value {
        PriceValue::Text(text) => text.parse::<Price>(),
        PriceValue::Number(number) => Price::from_decimal(*number),
    };
    Ok(price?)
}

fn map_product(row: ProductRow) -> Result<Product, ServerError> {
    Ok(Product {
        price: row.price()?.to_string(),
        id: row.id,
        name: row.name,
        description: row.description,
        image_url: row.image_url,
        category_id: row.category_id,
        category_name: row.category_name,
        farm_id: row.farm_id,
        farm_name: row.farm_name,
        stock: row.stock,
        is_available: row.is_available,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_products(rows: Vec<ProductRow>) -> Result<ProductList, ServerError> {
    let products = rows
        .into_iter()
        .map(map_product)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProductList { products })
}

fn product_input(payload: ProductWrite) -> Result<ProductInput, ServerError> {
    Ok(ProductInput {
        price: parse_price(&payload.price)?,
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        category_id: payload.category_id,
        farm_id: payload.farm_id,
        stock: payload.stock,
        is_available: payload.is_available.unwrap_or(true),
    })
}

/// `GET /api/products`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>, ServerError> {
    let filter = ProductFilter {
        category: query.category,
        farm: query.farm,
        search: query.search,
        ..Default::default()
    };
    let rows = state.engine.products(&filter).await?;
    Ok(Json(map_products(rows)?))
}

/// `GET /api/products/{id}`; unavailable products are not public.
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ServerError> {
    let row = state.engine.product(id).await?;
    if !row.is_available {
        return Err(ServerError::NotFound("product not exists".to_string()));
    }
    Ok(Json(map_product(row)?))
}

/// `GET /api/admin/products`
pub async fn admin_list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>, ServerError> {
    let filter = ProductFilter {
        category: query.category,
        farm: query.farm,
        search: query.search,
        include_unavailable: true,
        ..Default::default()
    };
    let rows = state.engine.products(&filter).await?;
    Ok(Json(map_products(rows)?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductWrite>,
) -> Result<(StatusCode, Json<Product>), ServerError> {
    let row = state.engine.create_product(product_input(payload)?).await?;
    Ok((StatusCode::CREATED, Json(map_product(row)?)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductWrite>,
) -> Result<Json<Product>, ServerError> {
    let row = state
        .engine
        .update_product(id, product_input(payload)?)
        .await?;
    Ok(Json(map_product(row)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_product(id).await?;
    Ok(Json(Success { success: true }))
}
