//! Order placement and order management.

use api_types::order::{
    Order, OrderCreated, OrderDetail, OrderItem, OrderList, OrderNew, OrderQuery, OrderStatus,
    OrderStatusUpdate,
};
use axum::{extract::State, http::StatusCode};
use engine::{NewOrder, OrderLine};

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

fn status_from_engine(status: engine::OrderStatus) -> OrderStatus {
    match status {
        engine::OrderStatus::Pending => OrderStatus::Pending,
        engine::OrderStatus::Confirmed => OrderStatus::Confirmed,
        engine::OrderStatus::Shipped => OrderStatus::Shipped,
        engine::OrderStatus::Delivered => OrderStatus::Delivered,
        engine::OrderStatus::Cancelled => OrderStatus::Cancelled,
    }
}

fn status_to_engine(status: OrderStatus) -> engine::OrderStatus {
    match status {
        OrderStatus::Pending => engine::OrderStatus::Pending,
        OrderStatus::Confirmed => engine::OrderStatus::Confirmed,
        OrderStatus::Shipped => engine::OrderStatus::Shipped,
        OrderStatus::Delivered => engine::OrderStatus::Delivered,
        OrderStatus::Cancelled => engine::OrderStatus::Cancelled,
    }
}

fn map_order(order: engine::Order) -> Result<Order, ServerError> {
    Ok(Order {
        total: order.total()?.to_string(),
        status: status_from_engine(order.order_status()?),
        id: order.id,
        customer_name: order.customer_name,
        customer_phone: order.customer_phone,
        telegram_id: order.telegram_id,
        shipping_address: order.shipping_address,
        notes: order.notes,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}

fn map_item(item: engine::OrderItem) -> Result<OrderItem, ServerError> {
    Ok(OrderItem {
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: engine::Price::from_cents(item.unit_price_cents)?.to_string(),
        total: engine::Price::from_cents(item.total_cents)?.to_string(),
    })
}

fn map_detail(detail: engine::OrderDetail) -> Result<OrderDetail, ServerError> {
    Ok(OrderDetail {
        order: map_order(detail.order)?,
        items: detail
            .items
            .into_iter()
            .map(map_item)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// `POST /api/orders`
pub async fn place(
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<OrderCreated>), ServerError> {
    let detail = state
        .engine
        .place_order(NewOrder {
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            telegram_id: payload.telegram_id,
            shipping_address: payload.shipping_address,
            notes: payload.notes,
            items: payload
                .items
                .into_iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        })
        .await?;

    let order = map_order(detail.order)?;
    tracing::info!(order_id = order.id, total = %order.total, "order placed");
    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            order_id: order.id,
            total: order.total,
            status: order.status,
        }),
    ))
}

/// `GET /api/admin/orders?status=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderList>, ServerError> {
    let orders = state
        .engine
        .orders(query.status.map(status_to_engine))
        .await?
        .into_iter()
        .map(map_order)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(OrderList { orders }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetail>, ServerError> {
    let detail = state.engine.order(id).await?;
    Ok(Json(map_detail(detail)?))
}

/// `PUT /api/admin/orders/{id}/status`
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderStatusUpdate>,
) -> Result<Json<Order>, ServerError> {
    let order = state
        .engine
        .set_order_status(id, status_to_engine(payload.status))
        .await?;
    Ok(Json(map_order(order)?))
}
