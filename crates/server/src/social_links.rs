use api_types::{
    Success,
    social::{SocialLink, SocialLinkList, SocialLinkWrite},
};
use axum::{extract::State, http::StatusCode};
use engine::SocialLinkInput;

use crate::{ServerError, extract::{Json, Path}, server::ServerState};

fn map_link(link: engine::SocialLink) -> SocialLink {
    SocialLink {
        id: link.id,
        name: link.name,
        url: link.url,
        icon: link.icon,
        is_active: link.is_active,
        sort_order: link.sort_order,
    }
}

fn link_input(payload: SocialLinkWrite) -> SocialLinkInput {
    SocialLinkInput {
        name: payload.name,
        url: payload.url,
        icon: payload.icon,
        is_active: payload.is_active.unwrap_or(true),
        sort_order: payload.sort_order.unwrap_or(0),
    }
}

async fn links(state: &ServerState, include_inactive: bool) -> Result<SocialLinkList, ServerError> {
    let links = state
        .engine
        .social_links(include_inactive)
        .await?
        .into_iter()
        .map(map_link)
        .collect();
    Ok(SocialLinkList { links })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<SocialLinkList>, ServerError> {
    Ok(Json(links(&state, false).await?))
}

pub async fn admin_list(
    State(state): State<ServerState>,
) -> Result<Json<SocialLinkList>, ServerError> {
    Ok(Json(links(&state, true).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SocialLinkWrite>,
) -> Result<(StatusCode, Json<SocialLink>), ServerError> {
    let link = state.engine.create_social_link(link_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_link(link))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SocialLinkWrite>,
) -> Result<Json<SocialLink>, ServerError> {
    let link = state
        .engine
        .update_social_link(id, link_input(payload))
        .await?;
    Ok(Json(map_link(link)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_social_link(id).await?;
    Ok(Json(Success { success: true }))
}
