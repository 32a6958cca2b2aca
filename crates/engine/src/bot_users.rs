//! Telegram users known to the bot.
//!
//! A user is a broadcast target while `notifications_enabled` is set and
//! `blocked` is not. `blocked` is set when Telegram reports that the user
//! blocked the bot and cleared when the user talks to the bot again.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bot_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub notifications_enabled: bool,
    pub blocked: bool,
    pub blocked_at: Option<DateTimeUtc>,
    pub last_seen: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn is_broadcast_target(&self) -> bool {
        self.notifications_enabled && !self.blocked
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
