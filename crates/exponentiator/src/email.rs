//! SMTP notifier.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::ExponentiatorError;
use crate::notifier::Notifier;

pub const DEFAULT_SMTP_HOST: &str = "in-v3.mailjet.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings. Credentials and receiver are optional: without them the
/// notifier starts but every send is a logged no-op.
#[derive(Clone, Default)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Defaults to `username` when absent.
    pub sender: Option<String>,
    pub receiver: Option<String>,
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .finish()
    }
}

struct Delivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// Sends notifications as plain-text email over STARTTLS.
pub struct EmailNotifier {
    delivery: Option<Delivery>,
}

impl EmailNotifier {
    /// Build the notifier. Incomplete credentials log a warning and produce a
    /// notifier that drops messages; malformed addresses are an error.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, ExponentiatorError> {
        let (Some(username), Some(password), Some(receiver)) = (
            settings.username.as_deref(),
            settings.password.as_deref(),
            settings.receiver.as_deref(),
        ) else {
            tracing::warn!(
                "No email credentials exist, set EMAIL_USERNAME, EMAIL_PASSWORD and \
                 EMAIL_RECEIVER_ADDRESS to receive notifications"
            );
            return Ok(Self { delivery: None });
        };

        let sender = settings.sender.as_deref().unwrap_or(username);
        let from: Mailbox = sender
            .parse()
            .map_err(|e| ExponentiatorError::Config(format!("invalid email sender: {e}")))?;
        let to: Mailbox = receiver
            .parse()
            .map_err(|e| ExponentiatorError::Config(format!("invalid email receiver: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| ExponentiatorError::Config(format!("invalid SMTP host: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(std::time::Duration::from_secs(30)))
            .build();

        tracing::info!(host = %settings.host, port = settings.port, to = %to, "Email notifier ready");

        Ok(Self {
            delivery: Some(Delivery {
                transport,
                from,
                to,
            }),
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, content: &str) -> Result<(), ExponentiatorError> {
        let Some(delivery) = &self.delivery else {
            tracing::warn!(subject, "email notifier not configured, dropping notification");
            return Ok(());
        };

        let message = Message::builder()
            .from(delivery.from.clone())
            .to(delivery.to.clone())
            .subject(subject.trim())
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| ExponentiatorError::Notification(format!("failed to build email: {e}")))?;

        delivery
            .transport
            .send(message)
            .await
            .map_err(|e| ExponentiatorError::Notification(format!("SMTP delivery failed: {e}")))?;

        tracing::debug!(subject, "email notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: Some("agent@example.com".to_string()),
            password: Some("hunter2".to_string()),
            sender: None,
            receiver: Some("operator@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_drop_silently() {
        let notifier = EmailNotifier::from_settings(&EmailSettings {
            password: None,
            ..settings()
        })
        .unwrap();
        assert!(notifier.delivery.is_none());
        assert!(notifier.send("subject", "body").await.is_ok());
    }

    #[tokio::test]
    async fn test_complete_settings_configure_delivery() {
        let notifier = EmailNotifier::from_settings(&settings()).unwrap();
        assert!(notifier.delivery.is_some());
    }

    #[test]
    fn test_bad_receiver_is_config_error() {
        let result = EmailNotifier::from_settings(&EmailSettings {
            receiver: Some("not an address".to_string()),
            ..settings()
        });
        assert!(matches!(result, Err(ExponentiatorError::Config(_))));
    }

    #[test]
    fn test_debug_masks_password() {
        let debug = format!("{:?}", settings());
        assert!(!debug.contains("hunter2"));
    }
}
