use std::collections::BTreeMap;

use engine::{BotUserCounts, Order, ProductRow, ShopStats};
use teloxide::{
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::html::escape,
};

use crate::{broadcast::BroadcastReport, commands::Callback};

const DEFAULT_WELCOME: &str = "🛍️ Welcome {firstname}!";

fn button(text: &str, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, callback.data())
}

fn back_home() -> Vec<InlineKeyboardButton> {
    vec![button("🔙 Menu", Callback::Home)]
}

fn config_value<'a>(config: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub(crate) fn main_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("🛍️ Products", Callback::Products)],
        vec![button("📦 My orders", Callback::Orders)],
        vec![
            button("ℹ️ Info", Callback::Info),
            button("💬 Support", Callback::Support),
        ],
    ])
}

/// Welcome text from the `welcome_message` config key with `{firstname}`
/// replaced by the escaped first name.
pub(crate) fn render_home(
    config: &BTreeMap<String, String>,
    first_name: &str,
) -> (String, InlineKeyboardMarkup) {
    let template = config_value(config, "welcome_message").unwrap_or(DEFAULT_WELCOME);
    let text = escape(template).replace("{firstname}", &escape(first_name));
    (text, main_keyboard())
}

pub(crate) fn help_text(descriptions: &str) -> String {
    format!(
        "{}\n\nUse the buttons below the messages to browse the shop.",
        escape(descriptions)
    )
}

pub(crate) fn render_products(products: &[ProductRow]) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("🛍️ <b>Products</b>\n");
    if products.is_empty() {
        text.push_str("\nNo products available right now.");
    }
    for product in products {
        let price = product
            .price()
            .map(|price| price.to_string())
            .unwrap_or_else(|_| "-".to_string());
        text.push_str(&format!("\n• <b>{}</b> {}", escape(&product.name), price));
        if let Some(farm) = product.farm_name.as_deref() {
            text.push_str(&format!(" · {}", escape(farm)));
        }
        if let Some(category) = product.category_name.as_deref() {
            text.push_str(&format!(" <i>({})</i>", escape(category)));
        }
    }
    (text, InlineKeyboardMarkup::new(vec![back_home()]))
}

pub(crate) fn render_orders(orders: &[Order]) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("📦 <b>Your orders</b>\n");
    if orders.is_empty() {
        text.push_str("\nYou have not placed any order yet.");
    }
    for order in orders {
        let total = order
            .total()
            .map(|total| total.to_string())
            .unwrap_or_else(|_| "-".to_string());
        text.push_str(&format!(
            "\n#{} · {} · {} · {}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            total,
            escape(&order.status)
        ));
    }
    (text, InlineKeyboardMarkup::new(vec![back_home()]))
}

pub(crate) fn render_info(config: &BTreeMap<String, String>) -> (String, InlineKeyboardMarkup) {
    let name = config_value(config, "shop_name").unwrap_or("Boutique");
    let mut text = format!("ℹ️ <b>{}</b>", escape(name));
    if let Some(description) = config_value(config, "shop_description") {
        text.push_str(&format!("\n\n{}", escape(description)));
    }
    (text, InlineKeyboardMarkup::new(vec![back_home()]))
}

pub(crate) fn render_support(config: &BTreeMap<String, String>) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("💬 <b>Support</b>\n");
    let mut any = false;
    if let Some(contact) = config_value(config, "contact_info") {
        text.push_str(&format!("\n{}", escape(contact)));
        any = true;
    }
    if let Some(username) = config_value(config, "telegram_username") {
        let username = username.trim_start_matches('@');
        text.push_str(&format!("\nTelegram: @{}", escape(username)));
        any = true;
    }
    if let Some(link) = config_value(config, "whatsapp_link") {
        text.push_str(&format!("\nWhatsApp: {}", escape(link)));
        any = true;
    }
    if !any {
        text.push_str("\nNo contact information configured.");
    }
    (text, InlineKeyboardMarkup::new(vec![back_home()]))
}

pub(crate) fn render_notifications(enabled: bool) -> (String, InlineKeyboardMarkup) {
    let status = if enabled { "✅ On" } else { "❌ Off" };
    let toggle = if enabled {
        button("🔕 Turn off", Callback::Notifications(false))
    } else {
        button("🔔 Turn on", Callback::Notifications(true))
    };
    (
        format!("🔔 <b>Notifications</b>\n\nCurrent state: {status}"),
        InlineKeyboardMarkup::new(vec![vec![toggle], back_home()]),
    )
}

pub(crate) fn render_notifications_changed(enabled: bool) -> (String, InlineKeyboardMarkup) {
    let text = if enabled {
        "✅ Notifications enabled.\n\nYou will receive the shop announcements."
    } else {
        "🔕 Notifications disabled.\n\nYou will no longer receive announcements."
    };
    (text.to_string(), InlineKeyboardMarkup::new(vec![back_home()]))
}

pub(crate) fn admin_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("📢 Broadcast", Callback::AdminBroadcast)],
        vec![button("📊 Stats", Callback::AdminStats)],
        back_home(),
    ])
}

pub(crate) fn render_admin() -> (String, InlineKeyboardMarkup) {
    ("🔧 <b>Admin menu</b>".to_string(), admin_keyboard())
}

pub(crate) fn render_admin_stats(stats: &ShopStats) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "📊 <b>Stats</b>\n\n\
         Products: {} ({} available)\n\
         Categories: {}\n\
         Farms: {}\n\
         Orders: {} ({} pending)\n\
         Bot users: {}\n\
         Broadcast eligible: {}",
        stats.products,
        stats.available_products,
        stats.categories,
        stats.farms,
        stats.orders,
        stats.pending_orders,
        stats.bot_users,
        stats.broadcast_eligible,
    );
    (text, admin_keyboard())
}

pub(crate) fn render_broadcast_prompt(counts: &BotUserCounts) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "📢 <b>Broadcast</b>\n\n\
         Total users: {}\n\
         Eligible (notifications on): {}\n\n\
         📝 Send the message to broadcast:",
        counts.total, counts.eligible
    );
    (
        text,
        InlineKeyboardMarkup::new(vec![vec![button("❌ Cancel", Callback::AdminCancel)]]),
    )
}

/// Wraps the admin's text for delivery; the text itself is escaped.
pub(crate) fn compose_broadcast(message: &str) -> String {
    format!(
        "📢 <b>Message from the shop:</b>\n\n{}\n\n━━━━━━━━━━━━━━━━━━\n<i>Manage notifications: /notifications</i>",
        escape(message)
    )
}

pub(crate) fn no_targets_text() -> String {
    "⚠️ No eligible users for this message.\nUsers must have notifications enabled.".to_string()
}

pub(crate) fn started_text(total: usize) -> String {
    format!("📤 Sending to {total} users...")
}

pub(crate) fn progress_text(report: &BroadcastReport) -> String {
    format!(
        "📤 <b>Sending...</b>\n\n\
         Progress: {}%\n\
         ✅ Sent: {}/{}\n\
         ❌ Failed: {}\n\
         🚫 Blocked: {}",
        report.progress_percent(),
        report.sent,
        report.total,
        report.failed,
        report.blocked
    )
}

pub(crate) fn report_text(report: &BroadcastReport) -> String {
    format!(
        "✅ <b>Broadcast finished</b>\n\n\
         • Success rate: {}%\n\
         • Sent: {}\n\
         • Failed: {}\n\
         • Blocked: {}\n\
         • Total: {}",
        report.success_rate(),
        report.sent,
        report.failed,
        report.blocked,
        report.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_substitutes_escaped_first_name() {
        let mut config = BTreeMap::new();
        config.insert(
            "welcome_message".to_string(),
            "Hi {firstname}, welcome!".to_string(),
        );
        let (text, _) = render_home(&config, "<Ada>");
        assert_eq!(text, "Hi &lt;Ada&gt;, welcome!");
    }

    #[test]
    fn welcome_falls_back_to_default() {
        let (text, _) = render_home(&BTreeMap::new(), "Ada");
        assert_eq!(text, "🛍️ Welcome Ada!");
    }

    #[test]
    fn broadcast_text_is_escaped_and_wrapped() {
        let text = compose_broadcast("50% off <today>");
        assert!(text.contains("50% off &lt;today&gt;"));
        assert!(text.contains("/notifications"));
    }

    #[test]
    fn notification_toggle_points_to_opposite_state() {
        let (_, kb) = render_notifications(true);
        let first = &kb.inline_keyboard[0][0];
        assert_eq!(first.text, "🔕 Turn off");
    }

    #[test]
    fn report_includes_success_rate() {
        let report = BroadcastReport {
            total: 4,
            processed: 4,
            sent: 2,
            failed: 1,
            blocked: 1,
        };
        let text = report_text(&report);
        assert!(text.contains("Success rate: 50%"));
        assert!(text.contains("Blocked: 1"));
    }
}
