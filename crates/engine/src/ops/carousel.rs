use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{
    CarouselImage, EngineError, ResultEngine, Store, carousel_images,
    util::{normalize_optional_text, normalize_required_text},
};

use super::Engine;

#[derive(Clone, Debug)]
pub struct CarouselInput {
    pub image_url: String,
    pub title: Option<String>,
    pub order_index: i32,
    pub active: bool,
}

impl CarouselInput {
    fn into_active(self) -> ResultEngine<carousel_images::ActiveModel> {
        Ok(carousel_images::ActiveModel {
            image_url: ActiveValue::Set(normalize_required_text(&self.image_url, "image_url")?),
            title: ActiveValue::Set(normalize_optional_text(self.title.as_deref())),
            order_index: ActiveValue::Set(self.order_index),
            active: ActiveValue::Set(self.active),
            ..Default::default()
        })
    }
}

impl Engine {
    /// Carousel slides by `order_index`; the storefront only sees active ones.
    pub async fn carousel_images(&self, include_inactive: bool) -> ResultEngine<Vec<CarouselImage>> {
        let mut query = carousel_images::Entity::find()
            .order_by_asc(carousel_images::Column::OrderIndex)
            .order_by_asc(carousel_images::Column::Id);
        if !include_inactive {
            query = query.filter(carousel_images::Column::Active.eq(true));
        }
        self.database.find_many(query).await
    }

    pub async fn create_carousel_image(&self, input: CarouselInput) -> ResultEngine<CarouselImage> {
        let mut active = input.into_active()?;
        active.created_at = ActiveValue::Set(Utc::now());
        self.database.create(active).await
    }

    pub async fn update_carousel_image(
        &self,
        id: i32,
        input: CarouselInput,
    ) -> ResultEngine<CarouselImage> {
        self.database
            .find_one::<carousel_images::Entity>(id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("carousel image not exists".to_string()))?;
        let mut active = input.into_active()?;
        active.id = ActiveValue::Unchanged(id);
        self.database.update(active).await
    }

    pub async fn delete_carousel_image(&self, id: i32) -> ResultEngine<()> {
        if !self.database.delete::<carousel_images::Entity>(id).await? {
            return Err(EngineError::KeyNotFound(
                "carousel image not exists".to_string(),
            ));
        }
        Ok(())
    }
}
