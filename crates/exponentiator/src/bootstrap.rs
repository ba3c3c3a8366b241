//! Wire an [`Exponentiator`] from configuration.
//!
//! Used by both the daemon and the HTTP trigger so they build the same
//! collaborators the same way.

use std::sync::Arc;

use crate::config::ExponentiatorConfig;
use crate::email::EmailNotifier;
use crate::error::ExponentiatorError;
use crate::notification_log::{NotificationLog, SystemClock};
use crate::notifier::{LogNotifier, Notifier, NotifierKind};
use crate::orchestrator::Exponentiator;
use crate::power::PowerNode;
use crate::price::PriceFeed;
use crate::spookyswap::SpookySwap;
use crate::webhook::WebhookNotifier;

/// Build the notifier selected by `NOTIFIER`.
pub fn build_notifier(config: &ExponentiatorConfig) -> Result<Arc<dyn Notifier>, ExponentiatorError> {
    let notifier: Arc<dyn Notifier> = match config.notifier {
        NotifierKind::Email => Arc::new(EmailNotifier::from_settings(&config.email)?),
        NotifierKind::Webhook => {
            let url = config.webhook_url.clone().ok_or_else(|| {
                ExponentiatorError::Config(
                    "NOTIFIER=webhook requires NOTIFY_WEBHOOK_URL".to_string(),
                )
            })?;
            Arc::new(WebhookNotifier::new(
                url,
                config.webhook_secret().map(<[u8]>::to_vec),
                config.service_name.clone(),
            )?)
        }
        NotifierKind::Log => Arc::new(LogNotifier),
    };
    tracing::info!(kind = ?config.notifier, "Notifier ready");
    Ok(notifier)
}

/// Resolve wallets and assemble the orchestrator.
///
/// Fails only on configuration a retry cannot fix: bad wallets, a bad RPC
/// URL or an incomplete notifier setup. The chain is first contacted by the
/// first cycle, which reconnects with backoff on its own.
pub fn bootstrap_exponentiator(
    config: &ExponentiatorConfig,
) -> Result<Exponentiator, ExponentiatorError> {
    let accounts = config.accounts()?;
    for account in &accounts {
        tracing::info!(wallet = account.name(), address = %account.address(), "Wallet loaded");
    }

    let notifier = build_notifier(config)?;

    let chain = config.chain();
    let price_feed = PriceFeed::new(config.coingecko_id.clone())?;
    let node = PowerNode::new(chain.clone(), price_feed)?
        .with_auto_compound(config.auto_compound)
        .with_connection_attempts(config.rpc_connection_attempts);
    if !config.auto_compound {
        tracing::warn!("AUTO_COMPOUND=false, opportunities are notified but never acted on");
    }
    let dex = SpookySwap::new(chain)?.with_slippage_bps(config.swap_slippage_bps);

    let log = NotificationLog::new(
        chrono::Duration::hours(config.renotify_hours),
        Arc::new(SystemClock),
    );

    Ok(Exponentiator::new(Arc::new(node), Arc::new(dex), notifier, accounts)
        .with_notification_log(log)
        .with_swap_amount(config.withdraw_swap_amount)
        .with_service_name(config.service_name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config(pairs: &[(&str, &str)]) -> ExponentiatorConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ExponentiatorConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_webhook_notifier_requires_url() {
        let config = config(&[("PRIVATE_KEY_MAP", KEY), ("NOTIFIER", "webhook")]);
        assert!(matches!(build_notifier(&config), Err(ExponentiatorError::Config(_))));
    }

    #[test]
    fn test_webhook_notifier_builds() {
        let config = config(&[
            ("PRIVATE_KEY_MAP", KEY),
            ("NOTIFIER", "webhook"),
            ("NOTIFY_WEBHOOK_URL", "https://hooks.example.com/exponentiator"),
        ]);
        assert!(build_notifier(&config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_rpc_surfaces_in_the_cycle() {
        let config = config(&[
            ("PRIVATE_KEY_MAP", KEY),
            ("NOTIFIER", "log"),
            ("RPC_URL", "http://127.0.0.1:1"),
            ("RPC_CONNECTION_ATTEMPTS", "1"),
        ]);
        let mut app = bootstrap_exponentiator(&config).unwrap();

        let err = app.execute_check(100).await.unwrap_err();
        assert!(err.is_connection());
        assert!(err.to_string().contains("after 1 attempts"));
    }

    #[test]
    fn test_bad_wallet_is_rejected() {
        let config = config(&[("PRIVATE_KEY_MAP", "main|not-a-key"), ("NOTIFIER", "log")]);
        let result = bootstrap_exponentiator(&config);
        assert!(matches!(result, Err(ExponentiatorError::Wallet(_))));
    }

    #[test]
    fn test_bad_rpc_url_is_rejected() {
        let config = config(&[
            ("PRIVATE_KEY_MAP", KEY),
            ("NOTIFIER", "log"),
            ("RPC_URL", "not a url"),
        ]);
        let result = bootstrap_exponentiator(&config);
        assert!(matches!(result, Err(ExponentiatorError::Config(_))));
    }
}
