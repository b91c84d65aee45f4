use chrono::{DateTime, Utc};
use foodwise_db::models::Item;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole calendar days until `expiry`, by ceiling division of the
/// millisecond difference. An item expiring in 36 hours has 2 days left.
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (expiry - now).num_milliseconds();
    millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0)
}

/// Render the plain-text expiry digest for one user. Returns `None` when
/// there is nothing to send. Channel-specific formatting (HTML for email)
/// is the dispatcher's concern.
pub fn compose_expiry_digest(
    user_name: &str,
    items: &[Item],
    now: DateTime<Utc>,
) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let mut message = format!(
        "Hi {}, FoodWise reminder: You have {} item(s) expiring soon:\n\n",
        user_name,
        items.len()
    );

    for (index, item) in items.iter().enumerate() {
        let expiry = item.expiry_date.to_chrono();
        let days_left = days_until(expiry, now);
        let expiry_formatted = expiry.format("%b %-d");

        message.push_str(&format!(
            "{}. {} - {} day(s) left ({})\n",
            index + 1,
            item.name,
            days_left,
            expiry_formatted
        ));
    }

    message.push_str("\nOpen your FoodWise app to see more details.");
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use chrono::Duration;

    fn item(name: &str, expiry: DateTime<Utc>) -> Item {
        let now = bson::DateTime::now();
        Item {
            id: Some(ObjectId::new()),
            owner_id: ObjectId::new(),
            name: name.to_string(),
            category: "dairy".to_string(),
            quantity: 1.0,
            unit: "pcs".to_string(),
            purchase_date: None,
            expiry_date: bson::DateTime::from_chrono(expiry),
            low_stock_threshold: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_items_produce_no_message() {
        assert_eq!(compose_expiry_digest("Alice", &[], Utc::now()), None);
    }

    #[test]
    fn digest_has_one_numbered_line_per_item() {
        let now = Utc::now();
        let items = vec![
            item("Milk", now + Duration::days(1)),
            item("Yogurt", now + Duration::days(2)),
            item("Cheese", now + Duration::days(3)),
        ];

        let message = compose_expiry_digest("Alice", &items, now).unwrap();
        assert!(message.starts_with("Hi Alice, FoodWise reminder: You have 3 item(s)"));
        for n in 1..=3 {
            assert_eq!(
                message
                    .lines()
                    .filter(|l| l.starts_with(&format!("{n}. ")))
                    .count(),
                1
            );
        }
        assert!(message.contains("1. Milk - 1 day(s) left"));
        assert!(message.contains("3. Cheese - 3 day(s) left"));
        assert!(message.ends_with("Open your FoodWise app to see more details."));
    }

    #[test]
    fn days_until_rounds_up_partial_days() {
        let now = Utc::now();
        assert_eq!(days_until(now + Duration::hours(36), now), 2);
        assert_eq!(days_until(now + Duration::hours(24), now), 1);
        assert_eq!(days_until(now + Duration::minutes(1), now), 1);
    }

    #[test]
    fn days_until_is_non_positive_for_past_dates() {
        let now = Utc::now();
        assert_eq!(days_until(now - Duration::hours(12), now), 0);
        assert_eq!(days_until(now - Duration::hours(30), now), -1);
    }
}
