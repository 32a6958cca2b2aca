use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use std::{path::PathBuf, sync::Arc};

use crate::{
    ServerError,
    auth::{self, AdminAuth},
    carousel, categories, config, farms, orders, pages, products, social_links, stats,
    storage::ObjectStore,
    upload, webhook,
};
use api_types::Health;
use engine::Engine;

/// Room for multipart framing on top of the file itself.
const UPLOAD_BODY_LIMIT: usize = upload::MAX_FILE_SIZE + 64 * 1024;

/// Receives raw Telegram updates posted to the webhook route.
///
/// `accept` only parses and hands the update over; it must not wait for the
/// update to be processed.
pub trait TelegramWebhook: Send + Sync {
    fn accept(&self, update: &[u8]) -> Result<(), serde_json::Error>;
}

#[derive(Clone)]
pub(crate) struct WebhookRoute {
    pub(crate) handler: Arc<dyn TelegramWebhook>,
    pub(crate) secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AdminAuth>,
    pub storage: Arc<dyn ObjectStore>,
    /// Telegram chat of the admin, left out of broadcast counts.
    pub admin_chat_id: Option<i64>,
    pub(crate) webhook: Option<WebhookRoute>,
    uploads_dir: Option<PathBuf>,
}

impl ServerState {
    pub fn new(engine: Arc<Engine>, auth: Arc<AdminAuth>, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            engine,
            auth,
            storage,
            admin_chat_id: None,
            webhook: None,
            uploads_dir: None,
        }
    }

    pub fn with_admin_chat(mut self, chat_id: i64) -> Self {
        self.admin_chat_id = Some(chat_id);
        self
    }

    /// Enables `POST /api/telegram-webhook`, guarded by `secret`.
    pub fn with_webhook(mut self, handler: Arc<dyn TelegramWebhook>, secret: String) -> Self {
        self.webhook = Some(WebhookRoute { handler, secret });
        self
    }

    /// Serves `dir` under `/uploads`.
    pub fn serve_uploads(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = Some(dir.into());
        self
    }
}

async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    let database = state.engine.backend_name();
    match state.engine.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok".to_string(),
                database,
            }),
        ),
        Err(err) => {
            tracing::error!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable".to_string(),
                    database,
                }),
            )
        }
    }
}

async fn not_found() -> ServerError {
    ServerError::NotFound("route not found".to_string())
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

fn admin_router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/products",
            get(products::admin_list).post(products::create),
        )
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/categories", post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/farms", post(farms::create))
        .route("/farms/{id}", put(farms::update).delete(farms::delete))
        .route(
            "/carousel",
            get(carousel::admin_list).post(carousel::create),
        )
        .route(
            "/carousel/{id}",
            put(carousel::update).delete(carousel::delete),
        )
        .route("/config", put(config::update))
        .route(
            "/social-links",
            get(social_links::admin_list).post(social_links::create),
        )
        .route(
            "/social-links/{id}",
            put(social_links::update).delete(social_links::delete),
        )
        .route("/pages", get(pages::admin_list))
        .route("/pages/{slug}", put(pages::upsert).delete(pages::delete))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/status", put(orders::set_status))
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/stats", get(stats::get))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
        // added after the auth layer, so it stays public
        .route("/login", post(auth::login))
}

pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(health))
        .route("/api/products", get(products::list))
        .route("/api/products/{id}", get(products::get))
        .route("/api/categories", get(categories::list))
        .route("/api/farms", get(farms::list))
        .route("/api/carousel", get(carousel::list))
        .route("/api/config", get(config::get))
        .route("/api/social-links", get(social_links::list))
        .route("/api/pages/{slug}", get(pages::get))
        .route("/api/orders", post(orders::place))
        .route("/api/telegram-webhook", post(webhook::receive))
        .nest("/api/admin", admin_router(state.clone()));

    if let Some(dir) = &state.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
