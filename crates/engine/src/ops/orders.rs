use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, Order, OrderItem, OrderStatus, Price, ResultEngine, Store, order_items, orders,
    products,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Clone, Debug, Default)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub telegram_id: Option<i64>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Collapse repeated products into one line, keeping first-seen order.
fn merge_lines(lines: &[OrderLine]) -> ResultEngine<Vec<OrderLine>> {
    if lines.is_empty() {
        return Err(EngineError::InvalidInput("order has no items".to_string()));
    }
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    let mut positions: BTreeMap<i32, usize> = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "quantity for product {} must be > 0",
                line.product_id
            )));
        }
        match positions.get(&line.product_id) {
            Some(&index) => {
                let entry = &mut merged[index];
                entry.quantity = entry.quantity.checked_add(line.quantity).ok_or_else(|| {
                    EngineError::InvalidAmount("quantity too large".to_string())
                })?;
            }
            None => {
                positions.insert(line.product_id, merged.len());
                merged.push(*line);
            }
        }
    }
    Ok(merged)
}

impl Engine {
    /// Places an order and takes its quantities out of stock.
    ///
    /// Each decrement is a conditional update (`stock >= quantity`) inside the
    /// order transaction, so two concurrent orders can never oversell a
    /// product: the loser gets [`EngineError::InsufficientStock`] and nothing
    /// of its order is written.
    pub async fn place_order(&self, order: NewOrder) -> ResultEngine<OrderDetail> {
        let customer_name = normalize_required_name(&order.customer_name, "customer")?;
        let lines = merge_lines(&order.items)?;
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let mut priced = Vec::with_capacity(lines.len());
            let mut total = Price::ZERO;
            for line in &lines {
                let product = db_tx
                    .find_one::<products::Entity>(line.product_id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::InvalidReference(format!(
                            "product {} not exists",
                            line.product_id
                        ))
                    })?;
                if !product.is_available {
                    return Err(EngineError::InvalidInput(format!(
                        "product {} is not available",
                        product.name
                    )));
                }

                let updated = products::Entity::update_many()
                    .col_expr(
                        products::Column::Stock,
                        Expr::col(products::Column::Stock).sub(line.quantity),
                    )
                    .col_expr(products::Column::UpdatedAt, Expr::value(now))
                    .filter(products::Column::Id.eq(product.id))
                    .filter(products::Column::Stock.gte(line.quantity))
                    .exec(&db_tx)
                    .await?;
                if updated.rows_affected == 0 {
                    return Err(EngineError::InsufficientStock(format!(
                        "only {} left for {}",
                        product.stock, product.name
                    )));
                }

                let unit_price = product.price()?;
                let line_total = unit_price
                    .checked_mul(line.quantity)
                    .ok_or_else(|| EngineError::InvalidAmount("order total too large".to_string()))?;
                total = total
                    .checked_add(line_total)
                    .ok_or_else(|| EngineError::InvalidAmount("order total too large".to_string()))?;
                priced.push((*line, unit_price, line_total));
            }

            let saved = db_tx
                .create(orders::ActiveModel {
                    customer_name: ActiveValue::Set(customer_name),
                    customer_phone: ActiveValue::Set(normalize_optional_text(
                        order.customer_phone.as_deref(),
                    )),
                    telegram_id: ActiveValue::Set(order.telegram_id),
                    shipping_address: ActiveValue::Set(normalize_optional_text(
                        order.shipping_address.as_deref(),
                    )),
                    notes: ActiveValue::Set(normalize_optional_text(order.notes.as_deref())),
                    total_cents: ActiveValue::Set(total.cents()),
                    status: ActiveValue::Set(OrderStatus::Pending.as_str().to_string()),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                })
                .await?;

            let mut items = Vec::with_capacity(priced.len());
            for (line, unit_price, line_total) in priced {
                let item = db_tx
                    .create(order_items::ActiveModel {
                        order_id: ActiveValue::Set(saved.id),
                        product_id: ActiveValue::Set(line.product_id),
                        quantity: ActiveValue::Set(line.quantity),
                        unit_price_cents: ActiveValue::Set(unit_price.cents()),
                        total_cents: ActiveValue::Set(line_total.cents()),
                        ..Default::default()
                    })
                    .await?;
                items.push(item);
            }

            tracing::info!(
                order_id = saved.id,
                total = %total,
                items = items.len(),
                "order placed"
            );
            Ok(OrderDetail {
                order: saved,
                items,
            })
        })
    }

    /// Orders newest first, optionally restricted to one status.
    pub async fn orders(&self, status: Option<OrderStatus>) -> ResultEngine<Vec<Order>> {
        let mut query = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id);
        if let Some(status) = status {
            query = query.filter(orders::Column::Status.eq(status.as_str()));
        }
        self.database.find_many(query).await
    }

    /// Latest orders placed from a Telegram account.
    pub async fn orders_for_telegram_user(
        &self,
        telegram_id: i64,
        limit: u64,
    ) -> ResultEngine<Vec<Order>> {
        self.database
            .find_many(
                orders::Entity::find()
                    .filter(orders::Column::TelegramId.eq(telegram_id))
                    .order_by_desc(orders::Column::CreatedAt)
                    .order_by_desc(orders::Column::Id)
                    .limit(limit),
            )
            .await
    }

    pub async fn order(&self, id: i32) -> ResultEngine<OrderDetail> {
        let order = self
            .database
            .find_one::<orders::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))?;
        let items = self
            .database
            .find_many(
                order_items::Entity::find()
                    .filter(order_items::Column::OrderId.eq(id))
                    .order_by_asc(order_items::Column::Id),
            )
            .await?;
        Ok(OrderDetail { order, items })
    }

    /// Moves an order to `status`. Stock is not given back on cancellation.
    pub async fn set_order_status(&self, id: i32, status: OrderStatus) -> ResultEngine<Order> {
        self.database
            .find_one::<orders::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))?;
        let active = orders::ActiveModel {
            id: ActiveValue::Unchanged(id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let order = self.database.update(active).await?;
        tracing::info!(order_id = id, status = status.as_str(), "order status changed");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i32, quantity: i32) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn repeated_products_are_merged() {
        let merged = merge_lines(&[line(1, 2), line(2, 1), line(1, 3)]).unwrap();
        assert_eq!(merged, vec![line(1, 5), line(2, 1)]);
    }

    #[test]
    fn empty_or_non_positive_lines_are_rejected() {
        assert!(matches!(merge_lines(&[]), Err(EngineError::InvalidInput(_))));
        assert!(matches!(
            merge_lines(&[line(1, 0)]),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            merge_lines(&[line(1, -2)]),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
