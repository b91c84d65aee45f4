use chrono::{DateTime, Utc};
use foodwise_db::models::{Item, NotificationSettings};
use serde::Serialize;

use super::message::days_until;

/// The in-app feed is computed fresh on every read and never persisted;
/// read state lives client-side. This is a separate feature from the
/// scheduled push alerts and shares no state with them.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDigest {
    pub id: &'static str,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub time: DateTime<Utc>,
    pub read: bool,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Expired,
    ExpiringSoon,
    LowStock,
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Bucket a user's items into alert digests. `items` is the user's full
/// inventory; `reminder_days` is the resolved policy window. Expired items
/// never double-count into the expiring-soon bucket.
pub fn build_feed(
    items: &[Item],
    settings: &NotificationSettings,
    reminder_days: i64,
    now: DateTime<Utc>,
) -> Vec<AlertDigest> {
    let mut feed = Vec::new();

    let expired: Vec<Item> = items
        .iter()
        .filter(|item| item.expiry_date.to_chrono() < now)
        .cloned()
        .collect();
    if !expired.is_empty() {
        feed.push(AlertDigest {
            id: "expired",
            kind: AlertKind::Expired,
            title: "Items Expired".to_string(),
            message: format!(
                "You have {} expired item{} in your inventory",
                expired.len(),
                plural(expired.len())
            ),
            time: now,
            read: false,
            items: expired,
        });
    }

    let expiring: Vec<Item> = items
        .iter()
        .filter(|item| {
            let days = days_until(item.expiry_date.to_chrono(), now);
            days > 0 && days <= reminder_days
        })
        .cloned()
        .collect();
    if !expiring.is_empty() {
        feed.push(AlertDigest {
            id: "expiring-soon",
            kind: AlertKind::ExpiringSoon,
            title: "Items Expiring Soon".to_string(),
            message: format!(
                "You have {} item{} expiring in the next {} days",
                expiring.len(),
                plural(expiring.len()),
                reminder_days
            ),
            time: now,
            read: false,
            items: expiring,
        });
    }

    if settings.low_stock_notifications {
        let low_stock: Vec<Item> = items
            .iter()
            .filter(|item| item.is_low_stock())
            .cloned()
            .collect();
        if !low_stock.is_empty() {
            feed.push(AlertDigest {
                id: "low-stock",
                kind: AlertKind::LowStock,
                title: "Low Stock Items".to_string(),
                message: format!(
                    "You have {} item{} with low stock",
                    low_stock.len(),
                    plural(low_stock.len())
                ),
                time: now,
                read: false,
                items: low_stock,
            });
        }
    }

    feed
}
