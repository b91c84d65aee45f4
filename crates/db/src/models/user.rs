use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Optional contact channels. A missing channel makes the corresponding
    /// notification channel unavailable, regardless of stored settings.
    /// Stored as absent, not null, so the sparse unique email index holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Canonical per-user notification preference record, embedded in the user
/// document. Absent or partial stored records deserialize to these defaults,
/// so a user created before a field existed still resolves a full record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    #[serde(default = "bool_true")]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,
    #[serde(default = "bool_true")]
    pub expiry_notifications: bool,
    #[serde(default = "bool_true")]
    pub low_stock_notifications: bool,
    #[serde(default)]
    pub daily_digest: bool,
    #[serde(default = "default_reminder_days")]
    pub reminder_days: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            expiry_notifications: true,
            low_stock_notifications: true,
            daily_digest: false,
            reminder_days: default_reminder_days(),
        }
    }
}

fn bool_true() -> bool {
    true
}

fn default_reminder_days() -> i64 {
    3
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn has_mobile(&self) -> bool {
        self.mobile.as_deref().is_some_and(|m| !m.is_empty())
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }
}
