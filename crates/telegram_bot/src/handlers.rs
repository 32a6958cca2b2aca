use async_trait::async_trait;
use engine::{BotUserProfile, EngineError, ProductFilter};
use teloxide::{
    ApiError, RequestError,
    prelude::*,
    types::{InlineKeyboardMarkup, ParseMode, UpdateKind, User},
    utils::command::BotCommands,
};

use crate::{
    ConfigParameters,
    broadcast::{BroadcastReport, Broadcaster, DeliveryError, Messenger, ProgressSink},
    commands::{Callback, Command},
    state::{PendingAction, SessionStore},
    ui,
};

const PRODUCTS_SHOWN: u64 = 10;
const ORDERS_SHOWN: u64 = 5;

pub(crate) async fn handle_update(
    bot: Bot,
    update: Update,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    match update.kind {
        UpdateKind::Message(msg) => handle_message(bot, msg, cfg).await,
        UpdateKind::CallbackQuery(q) => handle_callback(bot, q, cfg).await,
        _ => {
            tracing::debug!(update_id = update.id.0, "ignoring update");
            Ok(())
        }
    }
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(user_id) = remember_user(&cfg, from).await else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(command) = parse_command(&bot, &cfg, text).await {
        return match command {
            Command::Start(payload) => {
                if !payload.is_empty() {
                    tracing::debug!(user_id, payload = %payload, "start with deep link");
                }
                show_home(&bot, chat_id, &cfg, &from.first_name, false).await
            }
            Command::Help => {
                bot.send_message(chat_id, ui::help_text(&Command::descriptions().to_string()))
                    .parse_mode(ParseMode::Html)
                    .await?;
                Ok(())
            }
            Command::Products => show_products(&bot, chat_id, &cfg, false).await,
            Command::Notifications => show_notifications(&bot, chat_id, user_id, &cfg).await,
            Command::Admin => {
                if !is_admin(&cfg, user_id) {
                    bot.send_message(chat_id, "❌ Access denied.").await?;
                    return Ok(());
                }
                let (text, kb) = ui::render_admin();
                send_hub(&bot, chat_id, &cfg.sessions, text, kb).await
            }
        };
    }

    let pending = cfg.sessions.get(chat_id).await.pending;
    if pending == Some(PendingAction::Broadcast) && is_admin(&cfg, user_id) {
        cfg.sessions.update(chat_id, |s| s.pending = None).await;
        spawn_broadcast(bot, chat_id, user_id, cfg, text.to_string());
    }

    Ok(())
}

/// `None` for plain text and for commands this bot does not know or that are
/// addressed to another bot.
async fn parse_command(bot: &Bot, cfg: &ConfigParameters, text: &str) -> Option<Command> {
    if !text.starts_with('/') {
        return None;
    }
    let username = cfg
        .bot_username
        .get_or_try_init(|| async { bot.get_me().await.map(|me| me.username().to_string()) })
        .await;
    match username {
        Ok(username) => Command::parse(text, username).ok(),
        Err(err) => {
            tracing::warn!("failed to fetch bot username: {err}");
            None
        }
    }
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let Some(user_id) = remember_user(&cfg, &q.from).await else {
        return Ok(());
    };

    let Some(callback) = q.data.as_deref().and_then(Callback::parse) else {
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    };

    if callback.is_admin_only() && !is_admin(&cfg, user_id) {
        let _ = bot
            .answer_callback_query(q.id.clone())
            .text("❌ Access denied.")
            .await;
        return Ok(());
    }
    let _ = bot.answer_callback_query(q.id.clone()).await;

    // the pressed message becomes the one to edit
    let message_id = message.id();
    cfg.sessions
        .update(chat_id, |s| s.hub_message_id = Some(message_id))
        .await;

    match callback {
        Callback::Home => show_home(&bot, chat_id, &cfg, &q.from.first_name, true).await?,
        Callback::Products => show_products(&bot, chat_id, &cfg, true).await?,
        Callback::Orders => {
            let orders = match cfg
                .engine
                .orders_for_telegram_user(user_id, ORDERS_SHOWN)
                .await
            {
                Ok(orders) => orders,
                Err(err) => return report_error(&bot, chat_id, err).await,
            };
            let (text, kb) = ui::render_orders(&orders);
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
        Callback::Info | Callback::Support => {
            let config = match cfg.engine.shop_config().await {
                Ok(config) => config,
                Err(err) => return report_error(&bot, chat_id, err).await,
            };
            let (text, kb) = if callback == Callback::Info {
                ui::render_info(&config)
            } else {
                ui::render_support(&config)
            };
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
        Callback::Notifications(enabled) => {
            if let Err(err) = cfg.engine.set_notifications(user_id, enabled).await {
                return report_error(&bot, chat_id, err).await;
            }
            tracing::info!(user_id, enabled, "notification preference changed");
            let (text, kb) = ui::render_notifications_changed(enabled);
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
        Callback::AdminBroadcast => {
            let counts = match cfg.engine.bot_user_counts(Some(user_id)).await {
                Ok(counts) => counts,
                Err(err) => return report_error(&bot, chat_id, err).await,
            };
            cfg.sessions
                .update(chat_id, |s| s.pending = Some(PendingAction::Broadcast))
                .await;
            let (text, kb) = ui::render_broadcast_prompt(&counts);
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
        Callback::AdminStats => {
            let stats = match cfg.engine.stats(Some(user_id)).await {
                Ok(stats) => stats,
                Err(err) => return report_error(&bot, chat_id, err).await,
            };
            let (text, kb) = ui::render_admin_stats(&stats);
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
        Callback::AdminCancel => {
            cfg.sessions.update(chat_id, |s| s.pending = None).await;
            let (text, kb) = ui::render_admin();
            edit_or_send(&bot, chat_id, &cfg.sessions, text, Some(kb)).await?;
        }
    }

    Ok(())
}

async fn show_home(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    first_name: &str,
    edit: bool,
) -> ResponseResult<()> {
    let config = match cfg.engine.shop_config().await {
        Ok(config) => config,
        Err(err) => return report_error(bot, chat_id, err).await,
    };
    let (text, kb) = ui::render_home(&config, first_name);
    if edit {
        edit_or_send(bot, chat_id, &cfg.sessions, text, Some(kb)).await
    } else {
        send_hub(bot, chat_id, &cfg.sessions, text, kb).await
    }
}

async fn show_products(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    edit: bool,
) -> ResponseResult<()> {
    let filter = ProductFilter {
        in_stock_only: true,
        limit: Some(PRODUCTS_SHOWN),
        ..Default::default()
    };
    let products = match cfg.engine.products(&filter).await {
        Ok(products) => products,
        Err(err) => return report_error(bot, chat_id, err).await,
    };
    let (text, kb) = ui::render_products(&products);
    if edit {
        edit_or_send(bot, chat_id, &cfg.sessions, text, Some(kb)).await
    } else {
        send_hub(bot, chat_id, &cfg.sessions, text, kb).await
    }
}

async fn show_notifications(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    let enabled = match cfg.engine.bot_user(user_id).await {
        Ok(user) => user.is_none_or(|u| u.notifications_enabled),
        Err(err) => return report_error(bot, chat_id, err).await,
    };
    let (text, kb) = ui::render_notifications(enabled);
    send_hub(bot, chat_id, &cfg.sessions, text, kb).await
}

fn spawn_broadcast(bot: Bot, chat_id: ChatId, admin_id: i64, cfg: ConfigParameters, text: String) {
    tokio::spawn(async move {
        let sink = AdminProgress {
            bot: bot.clone(),
            chat_id,
            sessions: cfg.sessions.clone(),
        };
        let message = ui::compose_broadcast(&text);
        let result = Broadcaster::new(&cfg.engine, &bot, &sink, cfg.broadcast)
            .run(&message, Some(admin_id))
            .await;
        if let Err(err) = result {
            tracing::error!("broadcast aborted: {err}");
            sink.show(format!("❌ Broadcast failed: {err}"), None).await;
        }
    });
}

/// Reports broadcast progress by editing the admin's hub message.
struct AdminProgress {
    bot: Bot,
    chat_id: ChatId,
    sessions: SessionStore,
}

impl AdminProgress {
    async fn show(&self, text: String, kb: Option<InlineKeyboardMarkup>) {
        if let Err(err) = edit_or_send(&self.bot, self.chat_id, &self.sessions, text, kb).await {
            tracing::warn!("failed to update broadcast progress: {err}");
        }
    }
}

#[async_trait]
impl ProgressSink for AdminProgress {
    async fn no_targets(&self) {
        self.show(ui::no_targets_text(), Some(ui::admin_keyboard()))
            .await;
    }

    async fn started(&self, total: usize) {
        self.show(ui::started_text(total), None).await;
    }

    async fn progress(&self, report: &BroadcastReport) {
        self.show(ui::progress_text(report), None).await;
    }

    async fn finished(&self, report: &BroadcastReport) {
        self.show(ui::report_text(report), Some(ui::admin_keyboard()))
            .await;
    }
}

fn classify(err: RequestError) -> DeliveryError {
    match err {
        RequestError::RetryAfter(_) => DeliveryError::RateLimited,
        RequestError::Api(ApiError::BotBlocked | ApiError::UserDeactivated) => {
            DeliveryError::Blocked
        }
        other => DeliveryError::Other(other.to_string()),
    }
}

#[async_trait]
impl Messenger for Bot {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

async fn send_hub(
    bot: &Bot,
    chat_id: ChatId,
    sessions: &SessionStore,
    text: String,
    kb: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(kb)
        .await?;
    sessions
        .update(chat_id, |s| s.hub_message_id = Some(sent.id))
        .await;
    Ok(())
}

async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    sessions: &SessionStore,
    text: String,
    kb: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let session = sessions.get(chat_id).await;
    if let Some(message_id) = session.hub_message_id {
        let mut edit = bot
            .edit_message_text(chat_id, message_id, text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(kb) = kb.clone() {
            edit = edit.reply_markup(kb);
        }
        match edit.await {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return Ok(()),
            Err(err) => tracing::debug!("hub message not editable, sending a new one: {err}"),
        }
    }

    let mut send = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
    if let Some(kb) = kb {
        send = send.reply_markup(kb);
    }
    let sent = send.await?;
    sessions
        .update(chat_id, |s| s.hub_message_id = Some(sent.id))
        .await;
    Ok(())
}

async fn report_error(bot: &Bot, chat_id: ChatId, err: EngineError) -> ResponseResult<()> {
    tracing::error!("bot request failed: {err}");
    bot.send_message(chat_id, "⚠️ Something went wrong, please try again later.")
        .await?;
    Ok(())
}

/// Upserts the sender and returns their id; failures are only logged.
async fn remember_user(cfg: &ConfigParameters, from: &User) -> Option<i64> {
    let telegram_id = i64::try_from(from.id.0).ok()?;
    let profile = BotUserProfile {
        telegram_id,
        username: from.username.clone(),
        first_name: Some(from.first_name.clone()),
        last_name: from.last_name.clone(),
        language_code: from.language_code.clone(),
    };
    if let Err(err) = cfg.engine.upsert_bot_user(profile).await {
        tracing::error!(telegram_id, "failed to record bot user: {err}");
    }
    Some(telegram_id)
}

fn is_admin(cfg: &ConfigParameters, user_id: i64) -> bool {
    cfg.admin_id == Some(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_block_are_classified() {
        let retry = RequestError::RetryAfter(teloxide::types::Seconds::from_seconds(3));
        assert_eq!(classify(retry), DeliveryError::RateLimited);
        assert_eq!(
            classify(RequestError::Api(ApiError::BotBlocked)),
            DeliveryError::Blocked
        );
        assert_eq!(
            classify(RequestError::Api(ApiError::UserDeactivated)),
            DeliveryError::Blocked
        );
        assert!(matches!(
            classify(RequestError::Api(ApiError::ChatNotFound)),
            DeliveryError::Other(_)
        ));
    }
}
