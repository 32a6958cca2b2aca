use engine::{
    CarouselInput, Engine, EngineError, FarmInput, PageInput, Price, ProductFilter, ProductInput,
    SocialLinkInput,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::collections::BTreeMap;

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

fn product(name: &str, price: &str, category_id: Option<i32>, farm_id: Option<i32>) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        price: price.parse::<Price>().unwrap(),
        image_url: None,
        category_id,
        farm_id,
        stock: 5,
        is_available: true,
    }
}

#[tokio::test]
async fn created_category_is_listed_by_name() {
    let (engine, _db) = engine_with_db().await;

    engine.create_category("Vegetables", None).await.unwrap();
    engine
        .create_category("  Fruits ", Some("seasonal"))
        .await
        .unwrap();

    let names: Vec<String> = engine
        .categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Fruits".to_string(), "Vegetables".to_string()]);
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.create_category("   ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn deleting_category_clears_product_reference() {
    let (engine, _db) = engine_with_db().await;
    let fruits = engine.create_category("Fruits", None).await.unwrap();
    let apple = engine
        .create_product(product("Apple", "1.20", Some(fruits.id), None))
        .await
        .unwrap();
    assert_eq!(apple.category_name.as_deref(), Some("Fruits"));

    engine.delete_category(fruits.id).await.unwrap();

    let apple = engine.product(apple.id).await.unwrap();
    assert_eq!(apple.category_id, None);
    assert_eq!(apple.category_name, None);
    assert!(engine.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_farm_clears_product_reference() {
    let (engine, _db) = engine_with_db().await;
    let farm = engine
        .create_farm(FarmInput {
            name: "Green Acres".to_string(),
            location: Some("Valley".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let milk = engine
        .create_product(product("Milk", "0.99", None, Some(farm.id)))
        .await
        .unwrap();

    engine.delete_farm(farm.id).await.unwrap();

    assert_eq!(engine.product(milk.id).await.unwrap().farm_id, None);
    let err = engine.delete_farm(farm.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn product_with_unknown_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .create_product(product("Ghost", "1", Some(42), None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));
    assert!(engine.products(&ProductFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn products_filter_by_category_id_or_name() {
    let (engine, _db) = engine_with_db().await;
    let fruits = engine.create_category("Fruits", None).await.unwrap();
    let dairy = engine.create_category("Dairy", None).await.unwrap();
    engine
        .create_product(product("Apple", "1.20", Some(fruits.id), None))
        .await
        .unwrap();
    engine
        .create_product(product("Pear", "1.50", Some(fruits.id), None))
        .await
        .unwrap();
    engine
        .create_product(product("Cheese", "7.00", Some(dairy.id), None))
        .await
        .unwrap();

    let by_id = engine
        .products(&ProductFilter {
            category: Some(fruits.id.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_id.len(), 2);
    assert!(by_id.iter().all(|p| p.category_id == Some(fruits.id)));

    let by_name = engine
        .products(&ProductFilter {
            category: Some("dairy".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Cheese");

    let all = engine
        .products(&ProductFilter {
            category: Some("all".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    // newest first
    assert_eq!(all[0].name, "Cheese");
}

#[tokio::test]
async fn unavailable_products_are_hidden_from_public_listing() {
    let (engine, _db) = engine_with_db().await;
    let mut hidden = product("Hidden", "2", None, None);
    hidden.is_available = false;
    engine.create_product(hidden).await.unwrap();
    engine
        .create_product(product("Shown", "2", None, None))
        .await
        .unwrap();

    let public = engine.products(&ProductFilter::default()).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].name, "Shown");

    let admin = engine
        .products(&ProductFilter {
            include_unavailable: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(admin.len(), 2);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let (engine, _db) = engine_with_db().await;
    for name in ["100% juice", "Apple juice", "cold_brew", "coldXbrew"] {
        engine
            .create_product(product(name, "3", None, None))
            .await
            .unwrap();
    }
    let search = |term: &str| ProductFilter {
        search: Some(term.to_string()),
        ..Default::default()
    };

    let names = |rows: Vec<engine::ProductRow>| {
        let mut names: Vec<String> = rows.into_iter().map(|p| p.name).collect();
        names.sort();
        names
    };
    assert_eq!(
        names(engine.products(&search("%")).await.unwrap()),
        vec!["100% juice"]
    );
    assert_eq!(
        names(engine.products(&search("cold_")).await.unwrap()),
        vec!["cold_brew"]
    );
    assert_eq!(
        names(engine.products(&search("juice")).await.unwrap()),
        vec!["100% juice", "Apple juice"]
    );
}

#[tokio::test]
async fn update_product_replaces_fields() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_product(product("Apple", "1.20", None, None))
        .await
        .unwrap();

    let mut input = product("Green apple", "1.35", None, None);
    input.stock = 0;
    let updated = engine.update_product(created.id, input).await.unwrap();

    assert_eq!(updated.name, "Green apple");
    assert_eq!(updated.price().unwrap().to_string(), "1.35");
    assert_eq!(updated.stock, 0);
    assert!(!updated.in_stock());

    let err = engine
        .update_product(999, product("x", "1", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn negative_stock_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let mut input = product("Apple", "1", None, None);
    input.stock = -1;
    let err = engine.create_product(input).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn carousel_lists_active_slides_in_order() {
    let (engine, _db) = engine_with_db().await;
    for (url, order_index, active) in [("b.jpg", 2, true), ("a.jpg", 1, true), ("c.jpg", 0, false)] {
        engine
            .create_carousel_image(CarouselInput {
                image_url: url.to_string(),
                title: None,
                order_index,
                active,
            })
            .await
            .unwrap();
    }

    let public: Vec<String> = engine
        .carousel_images(false)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.image_url)
        .collect();
    assert_eq!(public, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    assert_eq!(engine.carousel_images(true).await.unwrap().len(), 3);
}

#[tokio::test]
async fn config_is_seeded_and_upserted() {
    let (engine, _db) = engine_with_db().await;
    let config = engine.shop_config().await.unwrap();
    assert!(config.contains_key("shop_name"));
    assert!(config.contains_key("welcome_message"));

    let mut changes = BTreeMap::new();
    changes.insert("shop_name".to_string(), "Farm Box".to_string());
    changes.insert("opening_hours".to_string(), "9-18".to_string());
    let config = engine.set_config(changes).await.unwrap();

    assert_eq!(config.get("shop_name").map(String::as_str), Some("Farm Box"));
    assert_eq!(config.get("opening_hours").map(String::as_str), Some("9-18"));
    assert_eq!(
        engine.config_value("shop_name").await.unwrap().as_deref(),
        Some("Farm Box")
    );
}

#[tokio::test]
async fn social_links_default_icon_and_visibility() {
    let (engine, _db) = engine_with_db().await;
    let link = engine
        .create_social_link(SocialLinkInput {
            name: "Instagram".to_string(),
            url: "https://instagram.com/shop".to_string(),
            icon: None,
            is_active: true,
            sort_order: 1,
        })
        .await
        .unwrap();
    assert_eq!(link.icon, "🔗");

    engine
        .create_social_link(SocialLinkInput {
            name: "Old".to_string(),
            url: "https://example.org".to_string(),
            icon: Some("📎".to_string()),
            is_active: false,
            sort_order: 0,
        })
        .await
        .unwrap();

    assert_eq!(engine.social_links(false).await.unwrap().len(), 1);
    assert_eq!(engine.social_links(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn pages_upsert_by_slug_and_hide_inactive() {
    let (engine, _db) = engine_with_db().await;
    let page = engine
        .upsert_page(
            "about",
            PageInput {
                title: "About".to_string(),
                content: "Hello".to_string(),
                is_active: true,
            },
        )
        .await
        .unwrap();
    let replaced = engine
        .upsert_page(
            "About",
            PageInput {
                title: "About us".to_string(),
                content: "Hello again".to_string(),
                is_active: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.id, replaced.id);
    assert_eq!(engine.pages().await.unwrap().len(), 1);

    let err = engine.page("about").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_page("about").await.unwrap();
    assert!(engine.pages().await.unwrap().is_empty());
}
