//! Operator notification channel.
//!
//! The concrete channel is picked once at startup from [`NotifierKind`]:
//!
//! - [`crate::email::EmailNotifier`]: SMTP with STARTTLS
//! - [`crate::webhook::WebhookNotifier`]: signed JSON POST
//! - [`LogNotifier`]: tracing only, for dry runs

use std::str::FromStr;

use async_trait::async_trait;

use crate::error::ExponentiatorError;

/// Sends a subject + body message to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, content: &str) -> Result<(), ExponentiatorError>;
}

/// Which notifier to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifierKind {
    #[default]
    Email,
    Webhook,
    Log,
}

impl FromStr for NotifierKind {
    type Err = ExponentiatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "smtp" => Ok(NotifierKind::Email),
            "webhook" => Ok(NotifierKind::Webhook),
            "log" => Ok(NotifierKind::Log),
            other => Err(ExponentiatorError::Config(format!(
                "unknown NOTIFIER '{other}' (expected email, webhook or log)"
            ))),
        }
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, content: &str) -> Result<(), ExponentiatorError> {
        tracing::info!(subject = subject.trim(), content = content.trim(), "notification");
        Ok(())
    }
}

/// Subject lines, shared by every notifier.
pub mod subjects {
    pub const COMPOUNDING_OPPORTUNITY: &str = "Compounding Opportunity";
    pub const COMPOUNDING_ERROR: &str = "Compounding Error";
    pub const WITHDRAWAL_ERROR: &str = "Withdrawal Error";
}
