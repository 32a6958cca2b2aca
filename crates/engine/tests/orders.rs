use engine::{
    BotUserProfile, Engine, EngineError, NewOrder, OrderLine, OrderStatus, Price, ProductInput,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn product_with_stock(engine: &Engine, name: &str, price: &str, stock: i32) -> i32 {
    engine
        .create_product(ProductInput {
            name: name.to_string(),
            description: None,
            price: price.parse::<Price>().unwrap(),
            image_url: None,
            category_id: None,
            farm_id: None,
            stock,
            is_available: true,
        })
        .await
        .unwrap()
        .id
}

fn order(items: Vec<OrderLine>) -> NewOrder {
    NewOrder {
        customer_name: "Alice".to_string(),
        customer_phone: Some("+100".to_string()),
        telegram_id: Some(7),
        items,
        ..Default::default()
    }
}

#[tokio::test]
async fn placing_order_decrements_stock_and_totals_lines() {
    let (engine, _db) = engine_with_db().await;
    let apple = product_with_stock(&engine, "Apple", "1.20", 10).await;
    let honey = product_with_stock(&engine, "Honey", "6.50", 2).await;

    let placed = engine
        .place_order(order(vec![
            OrderLine {
                product_id: apple,
                quantity: 3,
            },
            OrderLine {
                product_id: honey,
                quantity: 2,
            },
        ]))
        .await
        .unwrap();

    assert_eq!(placed.order.total().unwrap().to_string(), "16.60");
    assert_eq!(placed.order.order_status().unwrap(), OrderStatus::Pending);
    assert_eq!(placed.items.len(), 2);
    assert_eq!(engine.product(apple).await.unwrap().stock, 7);
    assert_eq!(engine.product(honey).await.unwrap().stock, 0);

    let detail = engine.order(placed.order.id).await.unwrap();
    assert_eq!(detail, placed);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_whole_order() {
    let (engine, _db) = engine_with_db().await;
    let apple = product_with_stock(&engine, "Apple", "1.20", 10).await;
    let honey = product_with_stock(&engine, "Honey", "6.50", 1).await;

    let err = engine
        .place_order(order(vec![
            OrderLine {
                product_id: apple,
                quantity: 4,
            },
            OrderLine {
                product_id: honey,
                quantity: 2,
            },
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert_eq!(engine.product(apple).await.unwrap().stock, 10);
    assert_eq!(engine.product(honey).await.unwrap().stock, 1);
    assert!(engine.orders(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn sequential_orders_cannot_oversell() {
    let (engine, _db) = engine_with_db().await;
    let honey = product_with_stock(&engine, "Honey", "6.50", 3).await;
    let line = || {
        vec![OrderLine {
            product_id: honey,
            quantity: 2,
        }]
    };

    engine.place_order(order(line())).await.unwrap();
    let err = engine.place_order(order(line())).await.unwrap_err();

    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert_eq!(engine.product(honey).await.unwrap().stock, 1);
}

#[tokio::test]
async fn unknown_product_is_an_invalid_reference() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .place_order(order(vec![OrderLine {
            product_id: 404,
            quantity: 1,
        }]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));
}

#[tokio::test]
async fn ordered_product_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let apple = product_with_stock(&engine, "Apple", "1.20", 10).await;
    engine
        .place_order(order(vec![OrderLine {
            product_id: apple,
            quantity: 1,
        }]))
        .await
        .unwrap();

    let err = engine.delete_product(apple).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));
}

#[tokio::test]
async fn order_status_and_user_history() {
    let (engine, _db) = engine_with_db().await;
    engine
        .upsert_bot_user(BotUserProfile {
            telegram_id: 7,
            ..Default::default()
        })
        .await
        .unwrap();
    let apple = product_with_stock(&engine, "Apple", "1.00", 10).await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        let placed = engine
            .place_order(order(vec![OrderLine {
                product_id: apple,
                quantity: 1,
            }]))
            .await
            .unwrap();
        ids.push(placed.order.id);
    }

    let shipped = engine
        .set_order_status(ids[0], OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.order_status().unwrap(), OrderStatus::Shipped);

    let history = engine.orders_for_telegram_user(7, 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, ids[2]);

    let pending = engine.orders(Some(OrderStatus::Pending)).await.unwrap();
    assert_eq!(pending.len(), 2);

    let stats = engine.stats(None).await.unwrap();
    assert_eq!(stats.orders, 3);
    assert_eq!(stats.pending_orders, 2);
    assert_eq!(stats.products, 1);
    assert_eq!(stats.bot_users, 1);
}
