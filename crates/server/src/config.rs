//! Shop configuration endpoints.

use std::collections::BTreeMap;

use api_types::config::ShopConfig;
use axum::extract::State;

use crate::{ServerError, extract::Json, server::ServerState};

/// `GET /api/config`
pub async fn get(State(state): State<ServerState>) -> Result<Json<ShopConfig>, ServerError> {
    let config = state.engine.shop_config().await?;
    Ok(Json(ShopConfig { config }))
}

/// `PUT /api/admin/config`: body is a flat `{key: value}` object.
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<Json<ShopConfig>, ServerError> {
    let keys = payload.len();
    let config = state.engine.set_config(payload).await?;
    tracing::info!(keys, "shop config updated");
    Ok(Json(ShopConfig { config }))
}
