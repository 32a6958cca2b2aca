use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorBody;
pub use auth::{AdminAuth, Claims, TokenError, hash_password, verify_password};
pub use server::{ServerState, TelegramWebhook, router, run_with_listener, spawn_with_listener};
pub use storage::{LocalDirStore, ObjectStore, StorageError};

mod auth;
mod carousel;
mod categories;
mod config;
mod extract;
mod farms;
mod orders;
mod pages;
mod products;
mod server;
mod social_links;
mod stats;
mod storage;
mod upload;
mod webhook;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing, malformed or expired credentials.
    Unauthorized(String),
    /// Request validation failure.
    Generic(String),
    NotFound(String),
    MethodNotAllowed,
    /// Logged in full, answered with a generic message.
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidReference(_)
        | EngineError::InsufficientStock(_)
        | EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed".to_string(),
            ),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<StorageError> for ServerError {
    fn from(value: StorageError) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_in_use_maps_to_409() {
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidReference("x".to_string()),
            EngineError::InsufficientStock("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized("expired".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_hides_details() {
        let res = ServerError::Internal("disk full at /srv".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
