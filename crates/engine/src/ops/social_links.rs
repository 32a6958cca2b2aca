use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, SocialLink, Store, social_links,
    util::{normalize_optional_text, normalize_required_name, normalize_required_text},
};

use super::Engine;

#[derive(Clone, Debug)]
pub struct SocialLinkInput {
    pub name: String,
    pub url: String,
    /// Falls back to the generic link icon when blank.
    pub icon: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl SocialLinkInput {
    fn into_active(self) -> ResultEngine<social_links::ActiveModel> {
        let icon = normalize_optional_text(self.icon.as_deref())
            .unwrap_or_else(|| social_links::DEFAULT_ICON.to_string());
        Ok(social_links::ActiveModel {
            name: ActiveValue::Set(normalize_required_name(&self.name, "social link")?),
            url: ActiveValue::Set(normalize_required_text(&self.url, "url")?),
            icon: ActiveValue::Set(icon),
            is_active: ActiveValue::Set(self.is_active),
            sort_order: ActiveValue::Set(self.sort_order),
            ..Default::default()
        })
    }
}

impl Engine {
    pub async fn social_links(&self, include_inactive: bool) -> ResultEngine<Vec<SocialLink>> {
        let mut query = social_links::Entity::find()
            .order_by_asc(social_links::Column::SortOrder)
            .order_by_asc(social_links::Column::Id);
        if !include_inactive {
            query = query.filter(social_links::Column::IsActive.eq(true));
        }
        self.database.find_many(query).await
    }

    pub async fn create_social_link(&self, input: SocialLinkInput) -> ResultEngine<SocialLink> {
        self.database.create(input.into_active()?).await
    }

    pub async fn update_social_link(
        &self,
        id: i32,
        input: SocialLinkInput,
    ) -> ResultEngine<SocialLink> {
        self.database
            .find_one::<social_links::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("social link not exists".to_string()))?;
        let mut active = input.into_active()?;
        active.id = ActiveValue::Unchanged(id);
        self.database.update(active).await
    }

    pub async fn delete_social_link(&self, id: i32) -> ResultEngine<()> {
        if !self.database.delete::<social_links::Entity>(id).await? {
            return Err(EngineError::KeyNotFound("social link not exists".to_string()));
        }
        Ok(())
    }
}
