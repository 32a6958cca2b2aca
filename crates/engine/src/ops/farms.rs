use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    EngineError, Farm, ResultEngine, Store, farms, products,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// Fields accepted when creating or replacing a farm.
#[derive(Clone, Debug, Default)]
pub struct FarmInput {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

impl FarmInput {
    fn into_active(self) -> ResultEngine<farms::ActiveModel> {
        Ok(farms::ActiveModel {
            name: ActiveValue::Set(normalize_required_name(&self.name, "farm")?),
            description: ActiveValue::Set(normalize_optional_text(self.description.as_deref())),
            location: ActiveValue::Set(normalize_optional_text(self.location.as_deref())),
            contact: ActiveValue::Set(normalize_optional_text(self.contact.as_deref())),
            ..Default::default()
        })
    }
}

impl Engine {
    /// All farms ordered by name.
    pub async fn farms(&self) -> ResultEngine<Vec<Farm>> {
        self.database
            .find_many(farms::Entity::find().order_by_asc(farms::Column::Name))
            .await
    }

    pub async fn farm(&self, id: i32) -> ResultEngine<Farm> {
        self.database
            .find_one::<farms::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("farm not exists".to_string()))
    }

    pub async fn create_farm(&self, input: FarmInput) -> ResultEngine<Farm> {
        let mut active = input.into_active()?;
        active.created_at = ActiveValue::Set(Utc::now());
        self.database.create(active).await
    }

    pub async fn update_farm(&self, id: i32, input: FarmInput) -> ResultEngine<Farm> {
        let mut active = input.into_active()?;
        active.id = ActiveValue::Unchanged(id);
        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<farms::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("farm not exists".to_string()))?;
            db_tx.update(active).await
        })
    }

    /// Deletes a farm; products keep existing with no farm.
    pub async fn delete_farm(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            db_tx
                .find_one::<farms::Entity>(id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("farm not exists".to_string()))?;

            products::Entity::update_many()
                .col_expr(products::Column::FarmId, Expr::value(Option::<i32>::None))
                .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(products::Column::FarmId.eq(id))
                .exec(&db_tx)
                .await?;

            db_tx.delete::<farms::Entity>(id).await?;
            Ok(())
        })
    }
}
