use foodwise_db::models::User;

/// The resolved, per-user, per-sweep decision: which channels are active
/// and which reminder window applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPolicy {
    pub sms_enabled: bool,
    pub email_enabled: bool,
    pub reminder_days: i64,
}

/// Resolve a user's effective notification policy.
///
/// Returns `None` when the user has globally disabled expiry notifications;
/// the sweep skips such users entirely, independent of per-channel flags.
/// A channel flag set to `true` without the matching contact info resolves
/// to a disabled channel, not an error. Pure function of the user record.
pub fn resolve_policy(user: &User, default_reminder_days: i64) -> Option<ChannelPolicy> {
    let settings = &user.notification_settings;

    if !settings.expiry_notifications {
        return None;
    }

    let reminder_days = if settings.reminder_days > 0 {
        settings.reminder_days
    } else {
        default_reminder_days
    };

    Some(ChannelPolicy {
        sms_enabled: settings.sms_notifications && user.has_mobile(),
        email_enabled: settings.email_notifications && user.has_email(),
        reminder_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodwise_db::models::NotificationSettings;

    fn user(email: Option<&str>, mobile: Option<&str>, settings: NotificationSettings) -> User {
        let now = bson::DateTime::now();
        User {
            id: Some(bson::oid::ObjectId::new()),
            name: "Alice".to_string(),
            email: email.map(String::from),
            mobile: mobile.map(String::from),
            notification_settings: settings,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sms_requires_mobile_number() {
        let settings = NotificationSettings {
            sms_notifications: true,
            ..Default::default()
        };
        let policy = resolve_policy(&user(None, None, settings.clone()), 3).unwrap();
        assert!(!policy.sms_enabled);

        let policy = resolve_policy(&user(None, Some(""), settings.clone()), 3).unwrap();
        assert!(!policy.sms_enabled);

        let policy = resolve_policy(&user(None, Some("9876543210"), settings), 3).unwrap();
        assert!(policy.sms_enabled);
    }

    #[test]
    fn email_requires_address() {
        let policy =
            resolve_policy(&user(None, None, NotificationSettings::default()), 3).unwrap();
        assert!(!policy.email_enabled);

        let policy = resolve_policy(
            &user(Some("a@b.com"), None, NotificationSettings::default()),
            3,
        )
        .unwrap();
        assert!(policy.email_enabled);
    }

    #[test]
    fn disabled_expiry_notifications_skip_user_entirely() {
        let settings = NotificationSettings {
            expiry_notifications: false,
            sms_notifications: true,
            email_notifications: true,
            ..Default::default()
        };
        assert_eq!(
            resolve_policy(&user(Some("a@b.com"), Some("9876543210"), settings), 3),
            None
        );
    }

    #[test]
    fn non_positive_reminder_days_fall_back_to_default() {
        let settings = NotificationSettings {
            reminder_days: 0,
            ..Default::default()
        };
        let policy = resolve_policy(&user(Some("a@b.com"), None, settings), 3).unwrap();
        assert_eq!(policy.reminder_days, 3);

        let settings = NotificationSettings {
            reminder_days: 7,
            ..Default::default()
        };
        let policy = resolve_policy(&user(Some("a@b.com"), None, settings), 3).unwrap();
        assert_eq!(policy.reminder_days, 7);
    }

    #[test]
    fn policy_is_pure() {
        let u = user(Some("a@b.com"), Some("9876543210"), Default::default());
        assert_eq!(resolve_policy(&u, 3), resolve_policy(&u, 3));
    }
}
