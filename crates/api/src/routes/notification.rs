use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use foodwise_db::models::NotificationSettings;
use foodwise_services::dao::user::NotificationSettingsUpdate;
use foodwise_services::notify::{build_feed, AlertDigest, AlertKind};
use serde::{Deserialize, Serialize};

use super::item::ItemResponse;
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct FeedEntryResponse {
    pub id: &'static str,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub time: String,
    pub read: bool,
    pub items: Vec<ItemResponse>,
}

impl From<AlertDigest> for FeedEntryResponse {
    fn from(digest: AlertDigest) -> Self {
        Self {
            id: digest.id,
            kind: digest.kind,
            title: digest.title,
            message: digest.message,
            time: digest.time.to_rfc3339(),
            read: digest.read,
            items: digest.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Computed fresh on every read; nothing is persisted. Read/unread state is
/// the client's concern (see the mark-read handlers below).
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FeedEntryResponse>>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let items = state.items.list_all(auth.user_id).await?;

    let settings = &user.notification_settings;
    let reminder_days = if settings.reminder_days > 0 {
        settings.reminder_days
    } else {
        state.settings.notifier.default_reminder_days
    };

    let feed = build_feed(&items, settings, reminder_days, Utc::now());
    Ok(Json(feed.into_iter().map(Into::into).collect()))
}

pub async fn mark_read(
    _auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Json<serde_json::Value> {
    // Feed entries are recomputed per read, so there is nothing to update
    // server-side; acknowledge so clients can track read state locally.
    Json(serde_json::json!({
        "message": "Notification marked as read",
        "id": notification_id,
    }))
}

pub async fn mark_all_read(_auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "All notifications marked as read" }))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state.users.notification_settings(auth.user_id).await?;
    Ok(Json(settings))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NotificationSettingsUpdate>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state
        .users
        .update_notification_settings(auth.user_id, body)
        .await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    #[serde(rename = "type")]
    pub channel: String,
}

/// Fire one real dispatch so the user can verify their channel setup. The
/// outcome is surfaced as data, mirroring the sweep's contract.
pub async fn send_test(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<TestNotificationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let settings = &user.notification_settings;

    let outcome = match body.channel.as_str() {
        "sms" => {
            let Some(mobile) = user.mobile.as_deref().filter(|m| !m.is_empty()) else {
                return Err(ApiError::BadRequest(
                    "Mobile number not found. Please add your mobile number in your profile."
                        .to_string(),
                ));
            };
            if !settings.sms_notifications {
                return Err(ApiError::BadRequest(
                    "SMS notifications are not enabled in your settings.".to_string(),
                ));
            }
            state
                .dispatcher
                .send_sms(
                    mobile,
                    "This is a test SMS notification from FoodWise. If you received this, \
                     your SMS notifications are working properly!",
                )
                .await
        }
        "email" => {
            let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) else {
                return Err(ApiError::BadRequest("Email not found".to_string()));
            };
            if !settings.email_notifications {
                return Err(ApiError::BadRequest(
                    "Email notifications are not enabled in your settings.".to_string(),
                ));
            }
            state
                .dispatcher
                .send_email(
                    email,
                    "FoodWise test notification",
                    "This is a test email notification from FoodWise. \
                     Your notification system is working!",
                )
                .await
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid notification type: {other}"
            )));
        }
    };

    Ok(Json(serde_json::json!({
        "success": outcome.success,
        "provider_id": outcome.provider_id,
        "error": outcome.error,
    })))
}
