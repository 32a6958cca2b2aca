use api_types::{
    Success,
    carousel::{CarouselImage, CarouselList, CarouselWrite},
};
use axum::{extract::State, http::StatusCode};
use engine::CarouselInput;

use crate::{ServerError, extract::{Json, Path}, server::ServerState};

fn map_image(image: engine::CarouselImage) -> CarouselImage {
    CarouselImage {
        id: image.id,
        image_url: image.image_url,
        title: image.title,
        order_index: image.order_index,
        active: image.active,
        created_at: image.created_at,
    }
}

fn carousel_input(payload: CarouselWrite) -> CarouselInput {
    CarouselInput {
        image_url: payload.image_url,
        title: payload.title,
        order_index: payload.order_index.unwrap_or(0),
        active: payload.active.unwrap_or(true),
    }
}

async fn images(state: &ServerState, include_inactive: bool) -> Result<CarouselList, ServerError> {
    let images = state
        .engine
        .carousel_images(include_inactive)
        .await?
        .into_iter()
        .map(map_image)
        .collect();
    Ok(CarouselList { images })
}

/// `GET /api/carousel`: active slides only.
pub async fn list(State(state): State<ServerState>) -> Result<Json<CarouselList>, ServerError> {
    Ok(Json(images(&state, false).await?))
}

pub async fn admin_list(
    State(state): State<ServerState>,
) -> Result<Json<CarouselList>, ServerError> {
    Ok(Json(images(&state, true).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CarouselWrite>,
) -> Result<(StatusCode, Json<CarouselImage>), ServerError> {
    let image = state
        .engine
        .create_carousel_image(carousel_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_image(image))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CarouselWrite>,
) -> Result<Json<CarouselImage>, ServerError> {
    let image = state
        .engine
        .update_carousel_image(id, carousel_input(payload))
        .await?;
    Ok(Json(map_image(image)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_carousel_image(id).await?;
    Ok(Json(Success { success: true }))
}
