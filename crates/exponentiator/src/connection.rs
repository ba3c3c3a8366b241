//! RPC connection with bounded exponential backoff.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};

use crate::error::ExponentiatorError;

/// Probes before [`connect_with_backoff`] gives up.
pub const DEFAULT_CONNECTION_ATTEMPTS: u32 = 5;

/// Delay before retry `attempt` (1-based): 1s, 2s, 4s, ...
pub fn retry_delay(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_secs(2u64.saturating_pow(attempt.saturating_sub(1)))
}

/// Connect to `rpc_url` and probe it with `eth_blockNumber`.
///
/// Retries up to `attempts` times, sleeping [`retry_delay`] between tries,
/// then gives up with [`ExponentiatorError::Connection`].
pub async fn connect_with_backoff(
    rpc_url: &str,
    attempts: u32,
) -> Result<DynProvider, ExponentiatorError> {
    let url: reqwest::Url = rpc_url
        .parse()
        .map_err(|e| ExponentiatorError::Config(format!("invalid RPC_URL {rpc_url}: {e}")))?;
    let attempts = attempts.max(1);
    let mut last_err = String::new();

    for attempt in 1..=attempts {
        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        match provider.get_block_number().await {
            Ok(block) => {
                tracing::debug!(rpc = %url, block, "Connected to chain");
                return Ok(provider);
            }
            Err(e) => {
                last_err = e.to_string();
                tracing::warn!(rpc = %url, attempt, attempts, error = %e, "RPC connection attempt failed");
                if attempt < attempts {
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
            }
        }
    }

    Err(ExponentiatorError::Connection(format!(
        "unable to reach {url} after {attempts} attempts: {last_err}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1).as_secs(), 1);
        assert_eq!(retry_delay(2).as_secs(), 2);
        assert_eq!(retry_delay(4).as_secs(), 8);
    }

    #[tokio::test]
    async fn test_unreachable_rpc_is_connection_error() {
        let result = connect_with_backoff("http://127.0.0.1:1", 1).await;
        assert!(matches!(result, Err(ExponentiatorError::Connection(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_config_error() {
        let result = connect_with_backoff("not a url", 3).await;
        assert!(matches!(result, Err(ExponentiatorError::Config(_))));
    }
}
