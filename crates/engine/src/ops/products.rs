use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait, prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::{
    EngineError, Price, ResultEngine, Store, categories, farms, order_items, products,
    util::{normalize_optional_text, normalize_required_name, require_non_negative},
};

use super::{Engine, with_tx};

/// A product joined with the names of its category and farm.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub farm_id: Option<i32>,
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub farm_name: Option<String>,
}

impl ProductRow {
    pub fn price(&self) -> ResultEngine<Price> {
        Price::from_cents(self.price_cents)
    }

    pub fn in_stock(&self) -> bool {
        self.is_available && self.stock > 0
    }
}

/// Listing filters.
///
/// `category` and `farm` take either a numeric id or a name (case
/// insensitive); blank or `all` disables the filter.
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub farm: Option<String>,
    pub search: Option<String>,
    pub include_unavailable: bool,
    pub in_stock_only: bool,
    pub limit: Option<u64>,
}

/// Fields accepted when creating or replacing a product.
#[derive(Clone, Debug)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub farm_id: Option<i32>,
    pub stock: i32,
    pub is_available: bool,
}

enum Reference {
    Id(i32),
    Name(String),
}

fn parse_reference(value: Option<&str>) -> Option<Reference> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(match value.parse::<i32>() {
        Ok(id) => Reference::Id(id),
        Err(_) => Reference::Name(value.to_lowercase()),
    })
}

/// `%term%`, with `%` and `_` inside `term` matched literally.
fn contains_literal(term: &str) -> LikeExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}

fn product_rows() -> Select<products::Entity> {
    products::Entity::find()
        .column_as(categories::Column::Name, "category_name")
        .column_as(farms::Column::Name, "farm_name")
        .join(JoinType::LeftJoin, products::Relation::Category.def())
        .join(JoinType::LeftJoin, products::Relation::Farm.def())
}

impl Engine {
    /// Products matching `filter`, newest first.
    pub async fn products(&self, filter: &ProductFilter) -> ResultEngine<Vec<ProductRow>> {
        let mut query = product_rows();

        if !filter.include_unavailable {
            query = query.filter(products::Column::IsAvailable.eq(true));
        }
        if filter.in_stock_only {
            query = query.filter(products::Column::Stock.gt(0));
        }
        match parse_reference(filter.category.as_deref()) {
            Some(Reference::Id(id)) => query = query.filter(products::Column::CategoryId.eq(id)),
            Some(Reference::Name(name)) => {
                query = query.filter(
                    Expr::expr(Func::lower(Expr::col((
                        categories::Entity,
                        categories::Column::Name,
                    ))))
                    .eq(name),
                )
            }
            None => {}
        }
        match parse_reference(filter.farm.as_deref()) {
            Some(Reference::Id(id)) => query = query.filter(products::Column::FarmId.eq(id)),
            Some(Reference::Name(name)) => {
                query = query.filter(
                    Expr::expr(Func::lower(Expr::col((farms::Entity, farms::Column::Name))))
                        .eq(name),
                )
            }
            None => {}
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(products::Column::Name.like(contains_literal(&search)))
                    .add(products::Column::Description.like(contains_literal(&search))),
            );
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let rows = query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .into_model::<ProductRow>()
            .all(&self.database)
            .await?;
        Ok(rows)
    }

    /// One product with its category and farm names.
    pub async fn product(&self, id: i32) -> ResultEngine<ProductRow> {
        Self::product_row(&self.database, id).await
    }

    async fn product_row<C: ConnectionTrait>(db: &C, id: i32) -> ResultEngine<ProductRow> {
        product_rows()
            .filter(products::Column::Id.eq(id))
            .into_model::<ProductRow>()
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
    }

    async fn check_references<C: ConnectionTrait>(
        db: &C,
        category_id: Option<i32>,
        farm_id: Option<i32>,
    ) -> ResultEngine<()> {
        if let Some(id) = category_id
            && db.find_one::<categories::Entity>(id).await?.is_none()
        {
            return Err(EngineError::InvalidReference(format!(
                "category {id} not exists"
            )));
        }
        if let Some(id) = farm_id
            && db.find_one::<farms::Entity>(id).await?.is_none()
        {
            return Err(EngineError::InvalidReference(format!("farm {id} not exists")));
        }
        Ok(())
    }

    fn product_active(input: ProductInput) -> ResultEngine<products::ActiveModel> {
        Ok(products::ActiveModel {
            name: ActiveValue::Set(normalize_required_name(&input.name, "product")?),
            description: ActiveValue::Set(normalize_optional_text(input.description.as_deref())),
            price_cents: ActiveValue::Set(input.price.cents()),
            image_url: ActiveValue::Set(normalize_optional_text(input.image_url.as_deref())),
            category_id: ActiveValue::Set(input.category_id),
            farm_id: ActiveValue::Set(input.farm_id),
            stock: ActiveValue::Set(require_non_negative(input.stock, "stock")?),
            is_available: ActiveValue::Set(input.is_available),
            ..Default::default()
        })
    }

    pub async fn create_product(&self, input: ProductInput) -> ResultEngine<ProductRow> {
        let (category_id, farm_id) = (input.category_id, input.farm_id);
        let mut active = Self::product_active(input)?;
        let now = Utc::now();
        active.created_at = ActiveValue::Set(now);
        active.updated_at = ActiveValue::Set(now);

        with_tx!(self, |db_tx| {
            Self::check_references(&db_tx, category_id, farm_id).await?;
            let model = db_tx.create(active).await?;
            tracing::info!(product_id = model.id, name = %model.name, "product created");
            Self::product_row(&db_tx, model.id).await
        })
    }

    /// Replaces every editable field of a product.
    pub async fn update_product(&self, id: i32, input: ProductInput) -> ResultEngine<ProductRow> {
        let (category_id, farm_id) = (input.category_id, input.farm_id);
        let mut active = Self::product_active(input)?;
        active.id = ActiveValue::Unchanged(id);
        active.updated_at = ActiveValue::Set(Utc::now());

        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<products::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
            Self::check_references(&db_tx, category_id, farm_id).await?;
            db_tx.update(active).await?;
            Self::product_row(&db_tx, id).await
        })
    }

    /// Deletes a product unless some order still lists it.
    pub async fn delete_product(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<products::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;

            let ordered = db_tx
                .find_many(
                    order_items::Entity::find()
                        .filter(order_items::Column::ProductId.eq(id))
                        .limit(1),
                )
                .await?;
            if !ordered.is_empty() {
                return Err(EngineError::InUse(format!(
                    "product {id} is referenced by orders; mark it unavailable instead"
                )));
            }

            db_tx.delete::<products::Entity>(id).await?;
            Ok(())
        })
    }
}
