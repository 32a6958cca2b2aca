use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Category, EngineError, ResultEngine, Store, categories, products,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// All categories ordered by name.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        self.database
            .find_many(categories::Entity::find().order_by_asc(categories::Column::Name))
            .await
    }

    pub async fn category(&self, id: i32) -> ResultEngine<Category> {
        self.database
            .find_one::<categories::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    /// Creates a category. Names are not required to be unique.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let active = categories::ActiveModel {
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(description)),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        self.database.create(active).await
    }

    pub async fn update_category(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<categories::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            let active = categories::ActiveModel {
                id: ActiveValue::Unchanged(id),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_optional_text(description)),
                ..Default::default()
            };
            db_tx.update(active).await
        })
    }

    /// Deletes a category; products referencing it keep existing with no
    /// category.
    pub async fn delete_category(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<categories::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

            let cleared = products::Entity::update_many()
                .col_expr(products::Column::CategoryId, Expr::value(Option::<i32>::None))
                .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(products::Column::CategoryId.eq(id))
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                category_id = id,
                products = cleared.rows_affected,
                "cleared category reference"
            );

            db_tx.delete::<categories::Entity>(id).await?;
            Ok(())
        })
    }
}
