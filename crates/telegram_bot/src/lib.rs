//! Telegram bot of the shop.
//!
//! The bot reads the catalog and the shop configuration through the engine,
//! records every user it talks to and lets the admin broadcast announcements
//! to the users who opted in. Updates arrive either by long polling or through
//! the server's webhook route.

use std::{sync::Arc, time::Duration};

use engine::Engine;
use teloxide::{prelude::*, types::Update, utils::command::BotCommands};
use thiserror::Error;
use tokio::{sync::OnceCell, task::JoinHandle};

pub use broadcast::{
    BroadcastReport, BroadcastSettings, Broadcaster, DeliveryError, Messenger, ProgressSink,
};
pub use commands::Command;

mod broadcast;
mod commands;
mod handlers;
mod state;
mod ui;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("missing bot token")]
    MissingToken,
    #[error("missing engine")]
    MissingEngine,
    #[error("invalid webhook url: {0}")]
    InvalidWebhookUrl(String),
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}

#[derive(Clone)]
pub(crate) struct ConfigParameters {
    engine: Arc<Engine>,
    admin_id: Option<i64>,
    sessions: state::SessionStore,
    broadcast: BroadcastSettings,
    /// Filled by the first `getMe`, needed to parse `/cmd@botname`.
    bot_username: Arc<OnceCell<String>>,
}

pub struct Bot {
    bot: teloxide::Bot,
    parameters: ConfigParameters,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Long polling; returns when the dispatcher stops (ctrl-c).
    pub async fn run(&self) {
        tracing::info!("Starting telegram bot in polling mode...");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.parameters.clone()])
            .default_handler(|upd| async move {
                tracing::debug!("Unhandled update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    /// Points Telegram at `url`; Telegram then sends `secret` in the
    /// `X-Telegram-Bot-Api-Secret-Token` header of every update.
    pub async fn register_webhook(&self, url: &str, secret: &str) -> Result<(), BotError> {
        let url =
            reqwest::Url::parse(url).map_err(|e| BotError::InvalidWebhookUrl(e.to_string()))?;
        self.bot
            .set_webhook(url.clone())
            .secret_token(secret.to_string())
            .await?;
        tracing::info!("telegram webhook registered at {url}");
        Ok(())
    }

    pub async fn register_commands(&self) -> Result<(), BotError> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        Ok(())
    }

    /// Receiver for the server's webhook route.
    pub fn webhook(&self) -> Arc<dyn server::TelegramWebhook> {
        Arc::new(WebhookReceiver {
            bot: self.bot.clone(),
            parameters: self.parameters.clone(),
        })
    }

    /// Purges expired sessions every `every` until the task is aborted.
    pub fn spawn_session_janitor(&self, every: Duration) -> JoinHandle<()> {
        self.parameters.sessions.spawn_janitor(every)
    }
}

struct WebhookReceiver {
    bot: teloxide::Bot,
    parameters: ConfigParameters,
}

impl server::TelegramWebhook for WebhookReceiver {
    fn accept(&self, update: &[u8]) -> Result<(), serde_json::Error> {
        let update: Update = serde_json::from_slice(update)?;
        let bot = self.bot.clone();
        let parameters = self.parameters.clone();
        tokio::spawn(async move {
            if let Err(err) = handlers::handle_update(bot, update, parameters).await {
                tracing::error!("failed to handle telegram update: {err}");
            }
        });
        Ok(())
    }
}

#[derive(Debug)]
pub struct BotBuilder {
    token: String,
    engine: Option<Arc<Engine>>,
    admin_id: Option<i64>,
    broadcast: BroadcastSettings,
    session_ttl: Duration,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            token: String::new(),
            engine: None,
            admin_id: None,
            broadcast: BroadcastSettings::default(),
            session_ttl: state::DEFAULT_SESSION_TTL,
        }
    }
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    /// Telegram user id allowed to use `/admin` and broadcast.
    pub fn admin_id(mut self, admin_id: i64) -> BotBuilder {
        self.admin_id = Some(admin_id);
        self
    }

    pub fn broadcast(mut self, settings: BroadcastSettings) -> BotBuilder {
        self.broadcast = settings;
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> BotBuilder {
        self.session_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BotError::MissingToken);
        }
        let engine = self.engine.ok_or(BotError::MissingEngine)?;
        if self.admin_id.is_none() {
            tracing::warn!("no admin id configured, admin commands are disabled");
        }

        Ok(Bot {
            bot: teloxide::Bot::new(self.token),
            parameters: ConfigParameters {
                engine,
                admin_id: self.admin_id,
                sessions: state::SessionStore::new(self.session_ttl),
                broadcast: self.broadcast,
                bot_username: Arc::new(OnceCell::new()),
            },
        })
    }
}
