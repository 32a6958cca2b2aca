//! Commands and callback payloads understood by the bot.

use teloxide::utils::command::{BotCommands, ParseError};

/// Keeps whatever follows `/start`, e.g. a deep-link payload.
fn start_payload(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

/// Commands shown in the Telegram command menu.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the shop menu.", parse_with = start_payload)]
    Start(String),
    #[command(description = "show this message.")]
    Help,
    #[command(description = "list products in stock.")]
    Products,
    #[command(description = "manage broadcast notifications.")]
    Notifications,
    #[command(description = "admin menu.")]
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Callback {
    Home,
    Products,
    Orders,
    Info,
    Support,
    Notifications(bool),
    AdminBroadcast,
    AdminStats,
    AdminCancel,
}

impl Callback {
    pub(crate) fn parse(data: &str) -> Option<Self> {
        match data {
            "nav:home" => Some(Self::Home),
            "products" => Some(Self::Products),
            "orders" => Some(Self::Orders),
            "info" => Some(Self::Info),
            "support" => Some(Self::Support),
            "notif:on" => Some(Self::Notifications(true)),
            "notif:off" => Some(Self::Notifications(false)),
            "admin:broadcast" => Some(Self::AdminBroadcast),
            "admin:stats" => Some(Self::AdminStats),
            "admin:cancel" => Some(Self::AdminCancel),
            _ => None,
        }
    }

    pub(crate) fn data(self) -> &'static str {
        match self {
            Self::Home => "nav:home",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Info => "info",
            Self::Support => "support",
            Self::Notifications(true) => "notif:on",
            Self::Notifications(false) => "notif:off",
            Self::AdminBroadcast => "admin:broadcast",
            Self::AdminStats => "admin:stats",
            Self::AdminCancel => "admin:cancel",
        }
    }

    pub(crate) fn is_admin_only(self) -> bool {
        matches!(
            self,
            Self::AdminBroadcast | Self::AdminStats | Self::AdminCancel
        )
    }
}
