use std::collections::HashMap;

use engine::{Engine, EngineError, FarmInput, Price, ProductInput};
use serde::Deserialize;

/// JSON dump accepted by `boutique_admin import`.
///
/// Products reference categories and farms by name; names must appear in
/// the same file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub categories: Vec<CategoryEntry>,
    pub farms: Vec<FarmEntry>,
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FarmEntry {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub farm: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub farms: usize,
    pub products: usize,
}

fn resolve(
    ids: &HashMap<String, i32>,
    name: Option<&str>,
    kind: &str,
) -> Result<Option<i32>, EngineError> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    ids.get(&name.to_lowercase())
        .copied()
        .map(Some)
        .ok_or_else(|| EngineError::InvalidReference(format!("unknown {kind}: {name}")))
}

impl Catalog {
    /// Creates every entry in order: categories, farms, then products.
    pub async fn import(self, engine: &Engine) -> Result<ImportSummary, EngineError> {
        let mut summary = ImportSummary::default();

        let mut category_ids = HashMap::new();
        for entry in self.categories {
            let category = engine
                .create_category(&entry.name, entry.description.as_deref())
                .await?;
            category_ids.insert(category.name.to_lowercase(), category.id);
            summary.categories += 1;
        }

        let mut farm_ids = HashMap::new();
        for entry in self.farms {
            let farm = engine
                .create_farm(FarmInput {
                    name: entry.name,
                    description: entry.description,
                    location: entry.location,
                    contact: entry.contact,
                })
                .await?;
            farm_ids.insert(farm.name.to_lowercase(), farm.id);
            summary.farms += 1;
        }

        for entry in self.products {
            let input = ProductInput {
                category_id: resolve(&category_ids, entry.category.as_deref(), "category")?,
                farm_id: resolve(&farm_ids, entry.farm.as_deref(), "farm")?,
                name: entry.name,
                description: entry.description,
                price: entry.price,
                image_url: entry.image_url,
                stock: entry.stock,
                is_available: entry.is_available,
            };
            engine.create_product(input).await?;
            summary.products += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use engine::ProductFilter;
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    async fn new_engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    #[tokio::test]
    async fn import_links_products_by_name() {
        let engine = new_engine().await;
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "categories": [{"name": "Fruits"}],
                "farms": [{"name": "Green Hill", "location": "Valley"}],
                "products": [
                    {"name": "Apple", "price": "1.20", "category": "fruits", "farm": "Green Hill", "stock": 5},
                    {"name": "Gift card", "price": 10}
                ]
            }"#,
        )
        .unwrap();

        let summary = catalog.import(&engine).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                categories: 1,
                farms: 1,
                products: 2
            }
        );

        let products = engine.products(&ProductFilter::default()).await.unwrap();
        let apple = products.iter().find(|p| p.name == "Apple").unwrap();
        assert_eq!(apple.category_name.as_deref(), Some("Fruits"));
        assert_eq!(apple.farm_name.as_deref(), Some("Green Hill"));
        assert_eq!(apple.price_cents, 120);
        let card = products.iter().find(|p| p.name == "Gift card").unwrap();
        assert!(card.category_id.is_none());
        assert!(card.is_available);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let engine = new_engine().await;
        let catalog: Catalog = serde_json::from_str(
            r#"{"products": [{"name": "Pear", "price": "2", "category": "Missing"}]}"#,
        )
        .unwrap();

        let err = catalog.import(&engine).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidReference(_)));
    }
}
