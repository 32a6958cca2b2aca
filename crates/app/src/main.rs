use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use server::{AdminAuth, LocalDirStore, ServerState};
use telegram_bot::BroadcastSettings;

mod settings;

const JANITOR_PERIOD: Duration = Duration::from_secs(60);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "boutique={level},telegram_bot={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.database.url).await?;
    let engine = Arc::new(engine::Engine::builder().database(db).build().await?);
    tracing::info!("database ready ({})", engine.backend_name());

    let bot = match &settings.telegram {
        Some(telegram) => {
            tracing::info!("Found telegram settings...");
            Some(build_bot(telegram, engine.clone())?)
        }
        None => None,
    };

    let webhook_secret = match (&settings.telegram, &settings.server) {
        (Some(telegram), Some(_)) if telegram.webhook_url.is_some() => Some(
            telegram
                .webhook_secret
                .clone()
                .filter(|secret| !secret.trim().is_empty())
                .ok_or("telegram.webhook_secret is required with telegram.webhook_url")?,
        ),
        (Some(telegram), None) if telegram.webhook_url.is_some() => {
            return Err("telegram.webhook_url needs the server section".into());
        }
        _ => None,
    };

    if let Some(server) = &settings.server {
        tracing::info!("Found server settings...");
        let auth = AdminAuth::new(
            &server.admin_password_hash,
            server.jwt_secret.as_bytes(),
            chrono::Duration::hours(server.token_ttl_hours),
        )?;
        let public_url = server.public_url.trim_end_matches('/');
        let storage = LocalDirStore::new(&server.uploads_dir, format!("{public_url}/uploads"));

        let mut state = ServerState::new(engine.clone(), Arc::new(auth), Arc::new(storage))
            .serve_uploads(&server.uploads_dir);
        if let Some(admin_id) = settings.telegram.as_ref().and_then(|t| t.admin_id) {
            state = state.with_admin_chat(admin_id);
        }
        if let (Some(bot), Some(secret)) = (&bot, &webhook_secret) {
            state = state.with_webhook(bot.webhook(), secret.clone());
        }

        let bind = server.bind.clone().unwrap_or_else(|| "127.0.0.1".to_string());
        let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, server.port)).await?;
        tasks.spawn(async move {
            if let Err(err) = server::run_with_listener(state, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    if let Some(bot) = bot {
        if let Err(err) = bot.register_commands().await {
            tracing::warn!("failed to register bot commands: {err}");
        }
        bot.spawn_session_janitor(JANITOR_PERIOD);

        let webhook_url = settings
            .telegram
            .as_ref()
            .and_then(|t| t.webhook_url.as_deref());
        match (webhook_url, &webhook_secret) {
            (Some(url), Some(secret)) => bot.register_webhook(url, secret).await?,
            _ => {
                tasks.spawn(async move { bot.run().await });
            }
        }
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_bot(
    telegram: &settings::Telegram,
    engine: Arc<engine::Engine>,
) -> Result<telegram_bot::Bot, BoxError> {
    let defaults = BroadcastSettings::default();
    let broadcast = BroadcastSettings {
        batch_size: telegram.batch_size.unwrap_or(defaults.batch_size),
        batch_delay: telegram
            .batch_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.batch_delay),
        retry_delay: telegram
            .retry_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay),
    };

    let mut builder = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .engine(engine)
        .broadcast(broadcast);
    if let Some(admin_id) = telegram.admin_id {
        builder = builder.admin_id(admin_id);
    }
    if let Some(ttl) = telegram.session_ttl_secs {
        builder = builder.session_ttl(Duration::from_secs(ttl));
    }
    Ok(builder.build()?)
}

async fn connect_database(url: &str) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
