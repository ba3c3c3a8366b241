//! SpookySwap (UniswapV2 router) swaps from POWER to FTM.

use std::time::Duration;

use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;

use crate::constants::PowerChainConfig;
use crate::dex::Dex;
use crate::error::ExponentiatorError;
use crate::power::{send_and_confirm, signing_provider};
use crate::wallet::WalletAccount;
use crate::{PowerToken, SwapRouter};

pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
const BPS_DENOMINATOR: u32 = 10_000;

/// Lowest acceptable output for a quote of `quoted` at `slippage_bps`.
pub fn min_amount_out(quoted: U256, slippage_bps: u32) -> U256 {
    let keep = BPS_DENOMINATOR.saturating_sub(slippage_bps.min(BPS_DENOMINATOR));
    quoted.saturating_mul(U256::from(keep)) / U256::from(BPS_DENOMINATOR)
}

pub struct SpookySwap {
    rpc_url: reqwest::Url,
    chain: PowerChainConfig,
    slippage_bps: u32,
    deadline: Duration,
}

impl SpookySwap {
    pub fn new(chain: PowerChainConfig) -> Result<Self, ExponentiatorError> {
        let rpc_url = chain.rpc_url.parse().map_err(|e| {
            ExponentiatorError::Config(format!("invalid RPC_URL {}: {e}", chain.rpc_url))
        })?;
        Ok(Self {
            rpc_url,
            chain,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            deadline: Duration::from_secs(3600),
        })
    }

    pub fn with_slippage_bps(mut self, bps: u32) -> Self {
        self.slippage_bps = bps.min(BPS_DENOMINATOR);
        self
    }
}

#[async_trait]
impl Dex for SpookySwap {
    async fn swap_to_native(
        &self,
        account: &WalletAccount,
        amount: U256,
    ) -> Result<TxHash, ExponentiatorError> {
        let provider = signing_provider(&self.rpc_url, account);
        let owner = account.address();
        let router_address = self.chain.swap_router;

        let token = PowerToken::new(self.chain.power_token, &provider);
        let allowance = token
            .allowance(owner, router_address)
            .call()
            .await
            .map_err(|e| ExponentiatorError::Transaction(format!("allowance lookup failed: {e}")))?;
        if allowance < amount {
            let tx_hash = send_and_confirm("approve", token.approve(router_address, amount).send()).await?;
            tracing::info!(wallet = account.name(), %tx_hash, "Approved router spend");
        }

        let path = vec![self.chain.power_token, self.chain.wrapped_native];
        let router = SwapRouter::new(router_address, &provider);
        let amounts = router
            .getAmountsOut(amount, path.clone())
            .call()
            .await
            .map_err(|e| ExponentiatorError::Transaction(format!("getAmountsOut failed: {e}")))?;
        let quoted = amounts.last().copied().ok_or_else(|| {
            ExponentiatorError::Transaction("router returned an empty quote".to_string())
        })?;
        let min_out = min_amount_out(quoted, self.slippage_bps);

        let deadline = U256::from(chrono::Utc::now().timestamp().max(0) as u64 + self.deadline.as_secs());
        let call = router.swapExactTokensForETH(amount, min_out, path, owner, deadline);
        let tx_hash = send_and_confirm("swapExactTokensForETH", call.send()).await?;

        tracing::info!(
            wallet = account.name(),
            amount = %alloy::primitives::utils::format_ether(amount),
            min_out = %alloy::primitives::utils::format_ether(min_out),
            %tx_hash,
            "Swapped rewards to FTM"
        );
        Ok(tx_hash)
    }
}
