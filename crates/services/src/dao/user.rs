use bson::{doc, oid::ObjectId, DateTime};
use foodwise_db::models::{NotificationSettings, User};
use mongodb::Database;
use serde::Deserialize;

use super::base::{BaseDao, DaoError, DaoResult};

/// Partial update of the canonical preference record. Absent fields keep
/// their current value; defaults are applied in one place (the model), not
/// at call sites.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationSettingsUpdate {
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub expiry_notifications: Option<bool>,
    pub low_stock_notifications: Option<bool>,
    pub daily_digest: Option<bool>,
    pub reminder_days: Option<i64>,
}

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        email: Option<String>,
        mobile: Option<String>,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            name,
            email,
            mobile,
            notification_settings: NotificationSettings::default(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Users reachable by at least one channel: non-empty mobile OR email.
    /// Per-channel opt-outs are resolved later by the notification policy.
    pub async fn find_notifiable(&self) -> DaoResult<Vec<User>> {
        self.base
            .find_many(
                doc! {
                    "$or": [
                        { "mobile": { "$type": "string", "$ne": "" } },
                        { "email": { "$type": "string", "$ne": "" } },
                    ]
                },
                None,
            )
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        name: Option<String>,
        email: Option<String>,
        mobile: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = name {
            update.insert("name", name);
        }
        if let Some(email) = email {
            update.insert("email", email);
        }
        if let Some(mobile) = mobile {
            update.insert("mobile", mobile);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }

    /// Get-or-default: a user without a stored record resolves to the
    /// documented defaults (materialized by serde), nothing is written.
    pub async fn notification_settings(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<NotificationSettings> {
        let user = self.base.find_by_id(user_id).await?;
        Ok(user.notification_settings)
    }

    /// Merge a partial update onto the current record and persist the full
    /// subdocument in one write.
    pub async fn update_notification_settings(
        &self,
        user_id: ObjectId,
        update: NotificationSettingsUpdate,
    ) -> DaoResult<NotificationSettings> {
        let mut settings = self.notification_settings(user_id).await?;

        if let Some(v) = update.email_notifications {
            settings.email_notifications = v;
        }
        if let Some(v) = update.sms_notifications {
            settings.sms_notifications = v;
        }
        if let Some(v) = update.expiry_notifications {
            settings.expiry_notifications = v;
        }
        if let Some(v) = update.low_stock_notifications {
            settings.low_stock_notifications = v;
        }
        if let Some(v) = update.daily_digest {
            settings.daily_digest = v;
        }
        if let Some(v) = update.reminder_days {
            if v < 0 {
                return Err(DaoError::Validation(
                    "reminder_days must be non-negative".to_string(),
                ));
            }
            settings.reminder_days = v;
        }

        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "notification_settings": bson::to_bson(&settings)? } },
            )
            .await?;

        Ok(settings)
    }
}
