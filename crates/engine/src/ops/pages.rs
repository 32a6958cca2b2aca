use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Page, ResultEngine, Store, pages,
    util::{normalize_required_text, normalize_slug},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct PageInput {
    pub title: String,
    pub content: String,
    pub is_active: bool,
}

impl Engine {
    async fn page_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> ResultEngine<Option<Page>> {
        let found = db
            .find_many(pages::Entity::find().filter(pages::Column::Slug.eq(slug)))
            .await?;
        Ok(found.into_iter().next())
    }

    /// A page as the storefront sees it: inactive pages do not exist.
    pub async fn page(&self, slug: &str) -> ResultEngine<Page> {
        let slug = normalize_slug(slug)?;
        Self::page_by_slug(&self.database, &slug)
            .await?
            .filter(|page| page.is_active)
            .ok_or_else(|| EngineError::KeyNotFound(format!("page {slug} not exists")))
    }

    pub async fn pages(&self) -> ResultEngine<Vec<Page>> {
        self.database
            .find_many(pages::Entity::find().order_by_asc(pages::Column::Slug))
            .await
    }

    /// Creates the page or replaces its title, content and visibility.
    pub async fn upsert_page(&self, slug: &str, input: PageInput) -> ResultEngine<Page> {
        let slug = normalize_slug(slug)?;
        let title = normalize_required_text(&input.title, "title")?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            match Self::page_by_slug(&db_tx, &slug).await? {
                Some(existing) => {
                    let active = pages::ActiveModel {
                        id: ActiveValue::Unchanged(existing.id),
                        title: ActiveValue::Set(title),
                        content: ActiveValue::Set(input.content),
                        is_active: ActiveValue::Set(input.is_active),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    db_tx.update(active).await
                }
                None => {
                    let active = pages::ActiveModel {
                        slug: ActiveValue::Set(slug),
                        title: ActiveValue::Set(title),
                        content: ActiveValue::Set(input.content),
                        is_active: ActiveValue::Set(input.is_active),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    db_tx.create(active).await
                }
            }
        })
    }

    pub async fn delete_page(&self, slug: &str) -> ResultEngine<()> {
        let slug = normalize_slug(slug)?;
        let page = Self::page_by_slug(&self.database, &slug)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("page {slug} not exists")))?;
        self.database.delete::<pages::Entity>(page.id).await?;
        Ok(())
    }
}
