//! Farm API endpoints.

use api_types::{
    Success,
    farm::{Farm, FarmList, FarmWrite},
};
use axum::{extract::State, http::StatusCode};
use engine::FarmInput;

use crate::{ServerError, extract::{Json, Path}, server::ServerState};

fn map_farm(farm: engine::Farm) -> Farm {
    Farm {
        id: farm.id,
        name: farm.name,
        description: farm.description,
        location: farm.location,
        contact: farm.contact,
        created_at: farm.created_at,
    }
}

fn farm_input(payload: FarmWrite) -> FarmInput {
    FarmInput {
        name: payload.name,
        description: payload.description,
        location: payload.location,
        contact: payload.contact,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<FarmList>, ServerError> {
    let farms = state
        .engine
        .farms()
        .await?
        .into_iter()
        .map(map_farm)
        .collect();
    Ok(Json(FarmList { farms }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FarmWrite>,
) -> Result<(StatusCode, Json<Farm>), ServerError> {
    let farm = state.engine.create_farm(farm_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_farm(farm))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<FarmWrite>,
) -> Result<Json<Farm>, ServerError> {
    let farm = state.engine.update_farm(id, farm_input(payload)).await?;
    Ok(Json(map_farm(farm)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_farm(id).await?;
    Ok(Json(Success { success: true }))
}
