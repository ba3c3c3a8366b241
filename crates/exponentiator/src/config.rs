use std::time::Duration;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;

use crate::constants::{PowerChainConfig, COINGECKO_ID, RPC_URL};
use crate::email::{EmailSettings, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::error::ExponentiatorError;
use crate::notifier::NotifierKind;
use crate::orchestrator::DEFAULT_RENOTIFY_HOURS;
use crate::spookyswap::DEFAULT_SLIPPAGE_BPS;
use crate::wallet::{parse_private_key_map, WalletAccount};

/// Runtime configuration, read from the environment.
#[derive(Clone)]
pub struct ExponentiatorConfig {
    pub service_name: String,
    /// Pause between daemon cycles.
    pub sleep_duration: Duration,
    private_key_map: String,
    encryption_secret: Option<String>,
    pub rpc_url: String,
    pub rpc_connection_attempts: u32,
    pub compound_pct: u32,
    pub withdraw_interval_hours: Option<u64>,
    /// `false` = notify-only: opportunities are reported, never acted on.
    pub auto_compound: bool,
    pub renotify_hours: i64,
    /// POWER (wei) swapped per eligible withdrawal.
    pub withdraw_swap_amount: U256,
    pub swap_slippage_bps: u32,
    pub notifier: NotifierKind,
    pub email: EmailSettings,
    pub webhook_url: Option<String>,
    webhook_secret: Option<String>,
    pub coingecko_id: String,
    pub port: u16,
}

impl ExponentiatorConfig {
    pub fn from_env() -> Result<Self, ExponentiatorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExponentiatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let private_key_map = var("PRIVATE_KEY_MAP").ok_or_else(|| {
            ExponentiatorError::Config(
                "a private key is missing, set PRIVATE_KEY_MAP".to_string(),
            )
        })?;

        let service_name = var("SERVICE_NAME").unwrap_or_else(|| "exponentiator".to_string());

        let sleep_secs: u64 = var("SLEEP_DURATION")
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let rpc_url = var("RPC_URL").unwrap_or_else(|| RPC_URL.to_string());

        let rpc_connection_attempts: u32 = var("RPC_CONNECTION_ATTEMPTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let compound_pct = match var("COMPOUND_PCT") {
            Some(raw) => parse_compound_pct(&raw)?,
            None => 100,
        };

        let withdraw_interval_hours = match var("WITHDRAW_INTERVAL_IN_HOURS") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                ExponentiatorError::Config(format!("invalid WITHDRAW_INTERVAL_IN_HOURS: {raw}"))
            })?),
            None => None,
        };

        let auto_compound = var("AUTO_COMPOUND")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let renotify_hours: i64 = var("RENOTIFY_HOURS")
            .and_then(|s| s.parse().ok())
            .filter(|h: &i64| *h >= 0)
            .unwrap_or(DEFAULT_RENOTIFY_HOURS);

        let withdraw_swap_amount = match var("WITHDRAW_SWAP_AMOUNT") {
            Some(raw) => parse_ether(&raw).map_err(|e| {
                ExponentiatorError::Config(format!("invalid WITHDRAW_SWAP_AMOUNT {raw}: {e}"))
            })?,
            None => crate::constants::WEI_PER_TOKEN,
        };

        let swap_slippage_bps: u32 = var("SWAP_SLIPPAGE_BPS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let notifier = match var("NOTIFIER") {
            Some(raw) => raw.parse()?,
            None => NotifierKind::default(),
        };

        let email = EmailSettings {
            host: var("EMAIL_SMTP_SERVER_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: var("EMAIL_SMTP_SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: var("EMAIL_USERNAME"),
            password: var("EMAIL_PASSWORD"),
            sender: var("EMAIL_SENDER_ADDRESS"),
            receiver: var("EMAIL_RECEIVER_ADDRESS"),
        };

        let port: u16 = var("PORT").and_then(|s| s.parse().ok()).unwrap_or(8080);

        Ok(Self {
            service_name,
            sleep_duration: Duration::from_secs(sleep_secs),
            private_key_map,
            encryption_secret: var("ENCRYPTION_SECRET"),
            rpc_url,
            rpc_connection_attempts,
            compound_pct,
            withdraw_interval_hours,
            auto_compound,
            renotify_hours,
            withdraw_swap_amount,
            swap_slippage_bps,
            notifier,
            email,
            webhook_url: var("NOTIFY_WEBHOOK_URL"),
            webhook_secret: var("NOTIFY_WEBHOOK_SECRET"),
            coingecko_id: var("COINGECKO_ID").unwrap_or_else(|| COINGECKO_ID.to_string()),
            port,
        })
    }

    /// Resolve `PRIVATE_KEY_MAP` into accounts, decrypting when
    /// `ENCRYPTION_SECRET` is set.
    pub fn accounts(&self) -> Result<Vec<WalletAccount>, ExponentiatorError> {
        parse_private_key_map(&self.private_key_map, self.encryption_secret.as_deref())
    }

    pub fn chain(&self) -> PowerChainConfig {
        PowerChainConfig {
            rpc_url: self.rpc_url.clone(),
            ..PowerChainConfig::default()
        }
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.webhook_secret.as_deref().map(str::as_bytes)
    }
}

/// Signed parse; negatives become 0 so the decision engines reject them.
pub fn parse_compound_pct(raw: &str) -> Result<u32, ExponentiatorError> {
    let pct: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ExponentiatorError::Config(format!("invalid compound percentage: {raw}")))?;
    Ok(clamp_compound_pct(pct))
}

pub fn clamp_compound_pct(pct: i64) -> u32 {
    u32::try_from(pct.max(0)).unwrap_or(u32::MAX)
}

impl std::fmt::Debug for ExponentiatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExponentiatorConfig")
            .field("service_name", &self.service_name)
            .field("sleep_duration", &self.sleep_duration)
            .field("private_key_map", &"***")
            .field("encryption_secret", &self.encryption_secret.as_ref().map(|_| "***"))
            .field("rpc_url", &self.rpc_url)
            .field("rpc_connection_attempts", &self.rpc_connection_attempts)
            .field("compound_pct", &self.compound_pct)
            .field("withdraw_interval_hours", &self.withdraw_interval_hours)
            .field("auto_compound", &self.auto_compound)
            .field("renotify_hours", &self.renotify_hours)
            .field("withdraw_swap_amount", &self.withdraw_swap_amount)
            .field("swap_slippage_bps", &self.swap_slippage_bps)
            .field("notifier", &self.notifier)
            .field("email", &self.email)
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("coingecko_id", &self.coingecko_id)
            .field("port", &self.port)
            .finish()
    }
}
