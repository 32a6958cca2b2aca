use api_types::{
    Success,
    page::{Page, PageList, PageWrite},
};
use axum::extract::State;
use engine::PageInput;

use crate::{ServerError, extract::{Json, Path}, server::ServerState};

fn map_page(page: engine::Page) -> Page {
    Page {
        slug: page.slug,
        title: page.title,
        content: page.content,
        is_active: page.is_active,
        updated_at: page.updated_at,
    }
}

/// `GET /api/pages/{slug}`
pub async fn get(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, ServerError> {
    let page = state.engine.page(&slug).await?;
    Ok(Json(map_page(page)))
}

pub async fn admin_list(State(state): State<ServerState>) -> Result<Json<PageList>, ServerError> {
    let pages = state
        .engine
        .pages()
        .await?
        .into_iter()
        .map(map_page)
        .collect();
    Ok(Json(PageList { pages }))
}

/// `PUT /api/admin/pages/{slug}` creates or replaces the page.
pub async fn upsert(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(payload): Json<PageWrite>,
) -> Result<Json<Page>, ServerError> {
    let page = state
        .engine
        .upsert_page(
            &slug,
            PageInput {
                title: payload.title,
                content: payload.content,
                is_active: payload.is_active.unwrap_or(true),
            },
        )
        .await?;
    Ok(Json(map_page(page)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_page(&slug).await?;
    Ok(Json(Success { success: true }))
}
