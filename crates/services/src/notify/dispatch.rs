use async_trait::async_trait;
use foodwise_config::{EmailSettings, TwilioSettings};
use std::sync::Arc;
use tracing::{error, info};

use super::phone;

// ---- Provider seam -------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Structured provider rejection, e.g. Twilio 21211 (invalid number).
    #[error("provider error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct SmsReceipt {
    pub sid: String,
    pub status: String,
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// `to` is already normalized to `+`-prefixed form.
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError>;
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ProviderError>;
}

// ---- Twilio SMS ----------------------------------------------------------

pub struct TwilioSms {
    client: reqwest::Client,
    settings: TwilioSettings,
}

impl TwilioSms {
    pub fn new(settings: &TwilioSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings: settings.clone(),
        }
    }
}

#[async_trait]
impl SmsProvider for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.settings.account_sid
        );
        let params = [
            ("To", to),
            ("From", self.settings.from_number.as_str()),
            ("Body", body),
        ];

        let resp: serde_json::Value = self
            .client
            .post(&url)
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        // Twilio error payloads carry a numeric code and a message
        if let Some(code) = resp.get("code").and_then(|c| c.as_i64()) {
            return Err(ProviderError::Api {
                code,
                message: resp["message"]
                    .as_str()
                    .unwrap_or("Unknown Twilio error")
                    .to_string(),
            });
        }

        Ok(SmsReceipt {
            sid: resp["sid"].as_str().unwrap_or_default().to_string(),
            status: resp["status"].as_str().unwrap_or_default().to_string(),
        })
    }
}

// ---- HTTP email relay ----------------------------------------------------

pub struct HttpEmail {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpEmail {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailProvider for HttpEmail {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ProviderError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "to": to,
                "subject": subject,
                "html": html_body,
                "from": self.from,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let code = i64::from(resp.status().as_u16());
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api { code, message });
        }

        Ok(())
    }
}

// ---- Logging no-op providers (constrained/offline environments) ----------

/// Logs the send and reports success so caller logic stays exercised when
/// no SMS credentials are configured.
pub struct LogOnlySms;

#[async_trait]
impl SmsProvider for LogOnlySms {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError> {
        info!(%to, body, "[SMS NOTIFICATION] no provider configured, logging only");
        Ok(SmsReceipt {
            sid: "log-only".to_string(),
            status: "logged".to_string(),
        })
    }
}

pub struct LogOnlyEmail;

#[async_trait]
impl EmailProvider for LogOnlyEmail {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), ProviderError> {
        info!(%to, subject, "[EMAIL NOTIFICATION] no provider configured, logging only");
        Ok(())
    }
}

// ---- Dispatcher ----------------------------------------------------------

/// Outcome of one dispatch attempt. Failures are data, not errors: nothing
/// escapes the dispatcher boundary.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub success: bool,
    pub provider_id: Option<String>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn ok(provider_id: Option<String>) -> Self {
        Self {
            success: true,
            provider_id,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            provider_id: None,
            error: Some(error),
        }
    }
}

/// Sends a composed message through a channel. Explicitly constructed and
/// injected; holds the shared provider clients for the whole process.
pub struct Dispatcher {
    sms: Arc<dyn SmsProvider>,
    email: Arc<dyn EmailProvider>,
    default_country_code: String,
}

impl Dispatcher {
    pub fn new(
        sms: Arc<dyn SmsProvider>,
        email: Arc<dyn EmailProvider>,
        default_country_code: String,
    ) -> Self {
        Self {
            sms,
            email,
            default_country_code,
        }
    }

    /// Build the production dispatcher from settings, degrading to logging
    /// no-ops where credentials are absent.
    pub fn from_settings(
        twilio: &TwilioSettings,
        email: &EmailSettings,
        default_country_code: String,
    ) -> Self {
        let sms: Arc<dyn SmsProvider> = if twilio.account_sid.is_empty() {
            Arc::new(LogOnlySms)
        } else {
            Arc::new(TwilioSms::new(twilio))
        };

        let email_provider: Arc<dyn EmailProvider> = match (&email.api_url, &email.api_key) {
            (Some(url), Some(key)) => Arc::new(HttpEmail::new(
                url.clone(),
                key.clone(),
                email.from.clone(),
            )),
            _ => Arc::new(LogOnlyEmail),
        };

        Self::new(sms, email_provider, default_country_code)
    }

    /// Normalize the number and hand the body to the SMS provider. One
    /// external call, no retries; the next sweep tick is the retry.
    pub async fn send_sms(&self, to_raw_number: &str, body: &str) -> DispatchOutcome {
        let to = phone::normalize(to_raw_number, &self.default_country_code);

        match self.sms.send(&to, body).await {
            Ok(receipt) => {
                info!(%to, sid = %receipt.sid, status = %receipt.status, "SMS sent");
                DispatchOutcome::ok(Some(receipt.sid))
            }
            Err(err) => {
                error!(%to, %err, "Failed to send SMS");
                DispatchOutcome::failed(err.to_string())
            }
        }
    }

    /// Wrap the plain-text body for email and send. Same boundary contract
    /// as SMS: errors become a failed outcome.
    pub async fn send_email(&self, to_address: &str, subject: &str, body: &str) -> DispatchOutcome {
        let html_body = format!("<p>{}</p>", body.replace('\n', "<br>"));

        match self.email.send(to_address, subject, &html_body).await {
            Ok(()) => {
                info!(to = %to_address, subject, "Email sent");
                DispatchOutcome::ok(None)
            }
            Err(err) => {
                error!(to = %to_address, %err, "Failed to send email");
                DispatchOutcome::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSms {
        sent_to: Mutex<Vec<String>>,
        fail_with: Option<(i64, &'static str)>,
    }

    #[async_trait]
    impl SmsProvider for RecordingSms {
        async fn send(&self, to: &str, _body: &str) -> Result<SmsReceipt, ProviderError> {
            self.sent_to.lock().unwrap().push(to.to_string());
            if let Some((code, message)) = self.fail_with {
                return Err(ProviderError::Api {
                    code,
                    message: message.to_string(),
                });
            }
            Ok(SmsReceipt {
                sid: "SM123".to_string(),
                status: "queued".to_string(),
            })
        }
    }

    struct FailingEmail;

    #[async_trait]
    impl EmailProvider for FailingEmail {
        async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), ProviderError> {
            Err(ProviderError::Transport("connection refused".to_string()))
        }
    }

    fn dispatcher(sms: Arc<dyn SmsProvider>, email: Arc<dyn EmailProvider>) -> Dispatcher {
        Dispatcher::new(sms, email, "91".to_string())
    }

    #[tokio::test]
    async fn sms_number_is_normalized_before_provider_call() {
        let sms = Arc::new(RecordingSms {
            sent_to: Mutex::new(Vec::new()),
            fail_with: None,
        });
        let d = dispatcher(sms.clone(), Arc::new(LogOnlyEmail));

        let outcome = d.send_sms("987-654-3210", "hello").await;
        assert!(outcome.success);
        assert_eq!(outcome.provider_id.as_deref(), Some("SM123"));
        assert_eq!(sms.sent_to.lock().unwrap().as_slice(), ["+919876543210"]);
    }

    #[tokio::test]
    async fn provider_error_becomes_failed_outcome() {
        // 21211: invalid 'To' phone number
        let sms = Arc::new(RecordingSms {
            sent_to: Mutex::new(Vec::new()),
            fail_with: Some((21211, "The 'To' number is not a valid phone number.")),
        });
        let d = dispatcher(sms, Arc::new(LogOnlyEmail));

        let outcome = d.send_sms("9876543210", "hello").await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("21211"));
    }

    #[tokio::test]
    async fn email_transport_error_becomes_failed_outcome() {
        let d = dispatcher(Arc::new(LogOnlySms), Arc::new(FailingEmail));

        let outcome = d.send_email("a@b.com", "Expiry reminder", "body").await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn log_only_email_reports_success() {
        let d = dispatcher(Arc::new(LogOnlySms), Arc::new(LogOnlyEmail));

        let outcome = d.send_email("a@b.com", "Expiry reminder", "line1\nline2").await;
        assert!(outcome.success);
    }
}
