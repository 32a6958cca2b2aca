//! Telegram webhook endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};

use api_types::Success;

use crate::{ServerError, server::ServerState};

pub(crate) const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Byte comparison whose duration does not depend on where the inputs differ.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// `POST /api/telegram-webhook`
///
/// Answers as soon as the update is handed over; processing happens on the
/// bot's own task.
pub async fn receive(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Success>, ServerError> {
    let Some(webhook) = state.webhook.as_ref() else {
        return Err(ServerError::NotFound("telegram bot is not configured".to_string()));
    };

    let given = headers
        .get(SECRET_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if !secrets_match(given, webhook.secret.as_bytes()) {
        tracing::warn!("telegram webhook called with a wrong secret");
        return Err(ServerError::Unauthorized("invalid webhook secret".to_string()));
    }

    webhook
        .handler
        .accept(&body)
        .map_err(|err| ServerError::Generic(format!("malformed update: {err}")))?;
    Ok(Json(Success { success: true }))
}
