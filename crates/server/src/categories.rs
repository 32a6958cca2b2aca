//! Category API endpoints.

use api_types::{
    Success,
    category::{Category, CategoryList, CategoryWrite},
};
use axum::{extract::State, http::StatusCode};

use crate::{ServerError, extract::{Json, Path}, server::ServerState};

fn map_category(category: engine::Category) -> Category {
    Category {
        id: category.id,
        name: category.name,
        description: category.description,
        created_at: category.created_at,
    }
}

/// `GET /api/categories`
pub async fn list(State(state): State<ServerState>) -> Result<Json<CategoryList>, ServerError> {
    let categories = state
        .engine
        .categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(CategoryList { categories }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryWrite>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let category = state
        .engine
        .create_category(&payload.name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryWrite>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .update_category(id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(Json(map_category(category)))
}

/// Products of a deleted category stay, without category.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_category(id).await?;
    Ok(Json(Success { success: true }))
}
