use api_types::stats::Stats;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// `GET /api/admin/stats`
///
/// The admin's own Telegram account is not counted as a broadcast target.
pub async fn get(State(state): State<ServerState>) -> Result<Json<Stats>, ServerError> {
    let stats = state.engine.stats(state.admin_chat_id).await?;
    Ok(Json(Stats {
        products: stats.products,
        available_products: stats.available_products,
        categories: stats.categories,
        farms: stats.farms,
        orders: stats.orders,
        pending_orders: stats.pending_orders,
        bot_users: stats.bot_users,
        broadcast_eligible: stats.broadcast_eligible,
    }))
}
