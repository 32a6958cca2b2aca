use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{BotUser, EngineError, ResultEngine, Store, bot_users, util::normalize_optional_text};

use super::{Engine, with_tx};

/// Profile fields Telegram sends with every update.
#[derive(Clone, Debug, Default)]
pub struct BotUserProfile {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotUserCounts {
    pub total: u64,
    pub eligible: u64,
    pub blocked: u64,
    pub opted_out: u64,
}

fn eligible_filter(exclude: Option<i64>) -> sea_orm::Select<bot_users::Entity> {
    let mut query = bot_users::Entity::find()
        .filter(bot_users::Column::NotificationsEnabled.eq(true))
        .filter(bot_users::Column::Blocked.eq(false));
    if let Some(excluded) = exclude {
        query = query.filter(bot_users::Column::TelegramId.ne(excluded));
    }
    query
}

impl Engine {
    /// Records a user seen by the bot.
    ///
    /// Refreshes the profile and `last_seen`; a user talking to the bot again
    /// is no longer considered blocked. The notification preference is kept.
    pub async fn upsert_bot_user(&self, profile: BotUserProfile) -> ResultEngine<BotUser> {
        let now = Utc::now();
        let id = profile.telegram_id;
        let mut active = bot_users::ActiveModel {
            telegram_id: ActiveValue::Set(id),
            username: ActiveValue::Set(normalize_optional_text(profile.username.as_deref())),
            first_name: ActiveValue::Set(normalize_optional_text(profile.first_name.as_deref())),
            last_name: ActiveValue::Set(normalize_optional_text(profile.last_name.as_deref())),
            language_code: ActiveValue::Set(normalize_optional_text(
                profile.language_code.as_deref(),
            )),
            blocked: ActiveValue::Set(false),
            blocked_at: ActiveValue::Set(None),
            last_seen: ActiveValue::Set(now),
            ..Default::default()
        };

        with_tx!(self, |db_tx| {
            if db_tx.find_one::<bot_users::Entity>(id).await?.is_some() {
                active.telegram_id = ActiveValue::Unchanged(id);
                db_tx.update(active).await
            } else {
                active.notifications_enabled = ActiveValue::Set(true);
                active.created_at = ActiveValue::Set(now);
                let user = db_tx.create(active).await?;
                tracing::info!(telegram_id = id, "new bot user");
                Ok(user)
            }
        })
    }

    pub async fn bot_user(&self, telegram_id: i64) -> ResultEngine<Option<BotUser>> {
        self.database.find_one::<bot_users::Entity>(telegram_id).await
    }

    pub async fn set_notifications(
        &self,
        telegram_id: i64,
        enabled: bool,
    ) -> ResultEngine<BotUser> {
        self.database
            .find_one::<bot_users::Entity>(telegram_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bot user not exists".to_string()))?;
        let active = bot_users::ActiveModel {
            telegram_id: ActiveValue::Unchanged(telegram_id),
            notifications_enabled: ActiveValue::Set(enabled),
            ..Default::default()
        };
        self.database.update(active).await
    }

    /// Chat ids a broadcast goes to: opted in, not blocked, `exclude` left out.
    pub async fn broadcast_targets(&self, exclude: Option<i64>) -> ResultEngine<Vec<i64>> {
        let ids = eligible_filter(exclude)
            .select_only()
            .column(bot_users::Column::TelegramId)
            .order_by_asc(bot_users::Column::TelegramId)
            .into_tuple::<i64>()
            .all(&self.database)
            .await?;
        Ok(ids)
    }

    /// Flags a user who blocked the bot so later broadcasts skip them.
    pub async fn mark_blocked(&self, telegram_id: i64) -> ResultEngine<()> {
        let result = bot_users::Entity::update_many()
            .col_expr(bot_users::Column::Blocked, sea_orm::sea_query::Expr::value(true))
            .col_expr(
                bot_users::Column::BlockedAt,
                sea_orm::sea_query::Expr::value(Some(Utc::now())),
            )
            .filter(bot_users::Column::TelegramId.eq(telegram_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("bot user not exists".to_string()));
        }
        tracing::info!(telegram_id, "bot user marked as blocked");
        Ok(())
    }

    pub async fn bot_user_counts(&self, exclude: Option<i64>) -> ResultEngine<BotUserCounts> {
        let total = bot_users::Entity::find().count(&self.database).await?;
        let eligible = eligible_filter(exclude).count(&self.database).await?;
        let blocked = bot_users::Entity::find()
            .filter(bot_users::Column::Blocked.eq(true))
            .count(&self.database)
            .await?;
        let opted_out = bot_users::Entity::find()
            .filter(bot_users::Column::NotificationsEnabled.eq(false))
            .count(&self.database)
            .await?;
        Ok(BotUserCounts {
            total,
            eligible,
            blocked,
            opted_out,
        })
    }
}
