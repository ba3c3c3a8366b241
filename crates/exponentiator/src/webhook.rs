//! Webhook notifier: POSTs each notification as JSON.
//!
//! When a secret is configured the body is signed and the hex HMAC-SHA256 is
//! sent in `X-Webhook-Signature`.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ExponentiatorError;
use crate::hmac::{sign_body, SIGNATURE_HEADER};
use crate::notifier::Notifier;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationWebhook {
    pub service: String,
    pub subject: String,
    pub content: String,
    pub timestamp: i64,
}

/// Webhook URLs must use HTTPS; notification bodies carry wallet balances.
pub fn validate_webhook_url(url: &str) -> Result<(), ExponentiatorError> {
    if !url.starts_with("https://") {
        return Err(ExponentiatorError::Config(format!(
            "webhook URL must use https: {url}"
        )));
    }
    Ok(())
}

/// HTTP client for webhook delivery. Redirects are disabled.
pub fn webhook_client() -> Result<reqwest::Client, ExponentiatorError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| ExponentiatorError::Config(format!("failed to build HTTP client: {e}")))
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    hmac_secret: Option<Vec<u8>>,
    service_name: String,
}

impl WebhookNotifier {
    pub fn new(
        url: String,
        hmac_secret: Option<Vec<u8>>,
        service_name: String,
    ) -> Result<Self, ExponentiatorError> {
        validate_webhook_url(&url)?;
        if hmac_secret.is_none() {
            tracing::warn!("NOTIFY_WEBHOOK_SECRET not set, webhook notifications are unsigned");
        }
        Ok(Self {
            client: webhook_client()?,
            url,
            hmac_secret,
            service_name,
        })
    }

    /// Serialize `payload` and sign it when a secret is configured.
    pub fn encode(
        &self,
        payload: &NotificationWebhook,
    ) -> Result<(Vec<u8>, Option<String>), ExponentiatorError> {
        let body = serde_json::to_vec(payload).map_err(|e| {
            ExponentiatorError::Notification(format!("failed to serialize webhook payload: {e}"))
        })?;
        let signature = self
            .hmac_secret
            .as_deref()
            .map(|secret| sign_body(secret, &body));
        Ok((body, signature))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, subject: &str, content: &str) -> Result<(), ExponentiatorError> {
        let payload = NotificationWebhook {
            service: self.service_name.clone(),
            subject: subject.trim().to_string(),
            content: content.trim().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        };
        let (body, signature) = self.encode(&payload)?;

        let mut req = self
            .client
            .post(&self.url)
            .header("content-type", "application/json");
        if let Some(sig) = &signature {
            req = req.header(SIGNATURE_HEADER, sig.as_str());
        }

        let resp = req
            .body(body)
            .send()
            .await
            .map_err(|e| ExponentiatorError::Notification(format!("webhook delivery failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExponentiatorError::Notification(format!(
                "webhook returned HTTP {}",
                resp.status()
            )));
        }

        tracing::debug!(url = %self.url, status = %resp.status(), "webhook delivered");
        Ok(())
    }
}
