use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use foodwise_db::models::{Item, User};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dao::{DaoResult, ItemDao, UserDao};

use super::dispatch::Dispatcher;
use super::message::compose_expiry_digest;
use super::policy::resolve_policy;

const EMAIL_SUBJECT: &str = "FoodWise: items expiring soon";

// ---- Store seams ---------------------------------------------------------

#[async_trait]
pub trait UserSource: Send + Sync {
    /// All users reachable by at least one channel.
    async fn notifiable_users(&self) -> DaoResult<Vec<User>>;
}

#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Items expiring within `(now, now + window_days]`, soonest first.
    async fn expiring_items(&self, owner_id: ObjectId, window_days: i64)
        -> DaoResult<Vec<Item>>;
}

#[async_trait]
impl UserSource for UserDao {
    async fn notifiable_users(&self) -> DaoResult<Vec<User>> {
        self.find_notifiable().await
    }
}

#[async_trait]
impl InventorySource for ItemDao {
    async fn expiring_items(
        &self,
        owner_id: ObjectId,
        window_days: i64,
    ) -> DaoResult<Vec<Item>> {
        self.find_expiring_items(owner_id, window_days).await
    }
}

// ---- Sweep ---------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub users_checked: usize,
    pub notifications_sent: usize,
    pub failures: usize,
}

/// One full pass over all candidate users. Per-user work runs inside its
/// own failure boundary; a storage or dispatch failure for one user never
/// aborts the rest of the sweep.
pub struct ExpirySweep {
    users: Arc<dyn UserSource>,
    inventory: Arc<dyn InventorySource>,
    dispatcher: Arc<Dispatcher>,
    default_reminder_days: i64,
}

impl ExpirySweep {
    pub fn new(
        users: Arc<dyn UserSource>,
        inventory: Arc<dyn InventorySource>,
        dispatcher: Arc<Dispatcher>,
        default_reminder_days: i64,
    ) -> Self {
        Self {
            users,
            inventory,
            dispatcher,
            default_reminder_days,
        }
    }

    pub async fn run(&self) -> SweepSummary {
        let users = match self.users.notifiable_users().await {
            Ok(users) => users,
            Err(err) => {
                error!(%err, "Failed to load notifiable users, skipping sweep");
                return SweepSummary {
                    users_checked: 0,
                    notifications_sent: 0,
                    failures: 1,
                };
            }
        };

        info!(candidates = users.len(), "Starting expiry notification sweep");

        let mut summary = SweepSummary::default();
        for user in &users {
            summary.users_checked += 1;
            match self.process_user(user).await {
                Ok((sent, failed)) => {
                    summary.notifications_sent += sent;
                    summary.failures += failed;
                }
                Err(err) => {
                    error!(user = %user.name, %err, "User sweep step failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            users_checked = summary.users_checked,
            notifications_sent = summary.notifications_sent,
            failures = summary.failures,
            "Expiry notification sweep completed"
        );

        summary
    }

    /// Returns `(sent, failed)` dispatch counts for one user; `Err` only
    /// for storage failures, which the sweep records and moves past.
    async fn process_user(&self, user: &User) -> DaoResult<(usize, usize)> {
        let Some(policy) = resolve_policy(user, self.default_reminder_days) else {
            debug!(user = %user.name, "Expiry notifications disabled, skipping");
            return Ok((0, 0));
        };

        if !policy.sms_enabled && !policy.email_enabled {
            debug!(user = %user.name, "No enabled channels, skipping");
            return Ok((0, 0));
        }

        let Some(user_id) = user.id else {
            return Ok((0, 0));
        };

        let items = self
            .inventory
            .expiring_items(user_id, policy.reminder_days)
            .await?;

        let Some(message) = compose_expiry_digest(&user.name, &items, Utc::now()) else {
            debug!(
                user = %user.name,
                window_days = policy.reminder_days,
                "No items expiring within the reminder window"
            );
            return Ok((0, 0));
        };

        info!(
            user = %user.name,
            expiring = items.len(),
            "User has items expiring soon"
        );

        let mut sent = 0;
        let mut failed = 0;

        if policy.sms_enabled {
            if let Some(mobile) = user.mobile.as_deref() {
                let outcome = self.dispatcher.send_sms(mobile, &message).await;
                if outcome.success {
                    sent += 1;
                } else {
                    failed += 1;
                }
            }
        }

        if policy.email_enabled {
            if let Some(email) = user.email.as_deref() {
                let outcome = self
                    .dispatcher
                    .send_email(email, EMAIL_SUBJECT, &message)
                    .await;
                if outcome.success {
                    sent += 1;
                } else {
                    failed += 1;
                }
            }
        }

        Ok((sent, failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::DaoError;
    use crate::notify::dispatch::{LogOnlyEmail, ProviderError, SmsProvider, SmsReceipt};
    use bson::DateTime;
    use chrono::Duration;
    use std::sync::Mutex;

    fn user(name: &str, mobile: Option<&str>, sms: bool) -> User {
        let now = DateTime::now();
        User {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            email: None,
            mobile: mobile.map(String::from),
            notification_settings: foodwise_db::models::NotificationSettings {
                sms_notifications: sms,
                email_notifications: false,
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn expiring_item(owner_id: ObjectId, days: i64) -> Item {
        let now = DateTime::now();
        Item {
            id: Some(ObjectId::new()),
            owner_id,
            name: "Milk".to_string(),
            category: "dairy".to_string(),
            quantity: 1.0,
            unit: "l".to_string(),
            purchase_date: None,
            expiry_date: DateTime::from_chrono(Utc::now() + Duration::days(days)),
            low_stock_threshold: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct FixedUsers(Vec<User>);

    #[async_trait]
    impl UserSource for FixedUsers {
        async fn notifiable_users(&self) -> DaoResult<Vec<User>> {
            Ok(self.0.clone())
        }
    }

    /// Inventory that fails for one marked owner and yields one expiring
    /// item for everyone else.
    struct FlakyInventory {
        failing_owner: ObjectId,
    }

    #[async_trait]
    impl InventorySource for FlakyInventory {
        async fn expiring_items(
            &self,
            owner_id: ObjectId,
            _window_days: i64,
        ) -> DaoResult<Vec<Item>> {
            if owner_id == self.failing_owner {
                return Err(DaoError::Validation("storage unavailable".to_string()));
            }
            Ok(vec![expiring_item(owner_id, 2)])
        }
    }

    struct CountingSms {
        recipients: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SmsProvider for CountingSms {
        async fn send(&self, to: &str, _body: &str) -> Result<SmsReceipt, ProviderError> {
            self.recipients.lock().unwrap().push(to.to_string());
            Ok(SmsReceipt {
                sid: "SM1".to_string(),
                status: "queued".to_string(),
            })
        }
    }

    fn dispatcher(sms: Arc<dyn SmsProvider>) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(sms, Arc::new(LogOnlyEmail), "91".to_string()))
    }

    #[tokio::test]
    async fn one_failing_user_does_not_abort_the_sweep() {
        let a = user("Alice", Some("9876543210"), true);
        let b = user("Bob", Some("9876500000"), true);
        let c = user("Carol", Some("9876511111"), true);
        let failing_owner = b.id.unwrap();

        let sms = Arc::new(CountingSms {
            recipients: Mutex::new(Vec::new()),
        });
        let sweep = ExpirySweep::new(
            Arc::new(FixedUsers(vec![a, b, c])),
            Arc::new(FlakyInventory { failing_owner }),
            dispatcher(sms.clone()),
            3,
        );

        let summary = sweep.run().await;
        assert_eq!(summary.users_checked, 3);
        assert_eq!(summary.notifications_sent, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(
            sms.recipients.lock().unwrap().as_slice(),
            ["+919876543210", "+919876511111"]
        );
    }

    #[tokio::test]
    async fn users_with_disabled_expiry_notifications_are_skipped() {
        let mut muted = user("Mallory", Some("9876543210"), true);
        muted.notification_settings.expiry_notifications = false;

        let sms = Arc::new(CountingSms {
            recipients: Mutex::new(Vec::new()),
        });
        let failing_owner = ObjectId::new(); // nobody
        let sweep = ExpirySweep::new(
            Arc::new(FixedUsers(vec![muted])),
            Arc::new(FlakyInventory { failing_owner }),
            dispatcher(sms.clone()),
            3,
        );

        let summary = sweep.run().await;
        assert_eq!(summary.users_checked, 1);
        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.failures, 0);
        assert!(sms.recipients.lock().unwrap().is_empty());
    }

    struct EmptyInventory;

    #[async_trait]
    impl InventorySource for EmptyInventory {
        async fn expiring_items(&self, _: ObjectId, _: i64) -> DaoResult<Vec<Item>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn nothing_is_sent_when_no_items_are_expiring() {
        let sms = Arc::new(CountingSms {
            recipients: Mutex::new(Vec::new()),
        });
        let sweep = ExpirySweep::new(
            Arc::new(FixedUsers(vec![user("Alice", Some("9876543210"), true)])),
            Arc::new(EmptyInventory),
            dispatcher(sms.clone()),
            3,
        );

        let summary = sweep.run().await;
        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.failures, 0);
        assert!(sms.recipients.lock().unwrap().is_empty());
    }

    struct RejectingSms;

    #[async_trait]
    impl SmsProvider for RejectingSms {
        async fn send(&self, _: &str, _: &str) -> Result<SmsReceipt, ProviderError> {
            Err(ProviderError::Api {
                code: 21211,
                message: "The 'To' number is not a valid phone number.".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn dispatch_failure_is_counted_not_propagated() {
        let failing_owner = ObjectId::new();
        let sweep = ExpirySweep::new(
            Arc::new(FixedUsers(vec![user("Alice", Some("123"), true)])),
            Arc::new(FlakyInventory { failing_owner }),
            dispatcher(Arc::new(RejectingSms)),
            3,
        );

        let summary = sweep.run().await;
        assert_eq!(summary.users_checked, 1);
        assert_eq!(summary.notifications_sent, 0);
        assert_eq!(summary.failures, 1);
    }
}
