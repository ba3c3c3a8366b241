//! POWER node protocol on Fantom, backed by alloy.
//!
//! Reads go through one shared [`DynProvider`], replaced by a freshly probed
//! one at the start of every cycle. Writes build a short-lived wallet
//! provider per account so each wallet signs its own transactions.

use std::future::Future;
use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::transports::RpcError;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::compounding::{split_node_names, CostTable};
use crate::connection::{connect_with_backoff, DEFAULT_CONNECTION_ATTEMPTS};
use crate::constants::{NodeTier, PowerChainConfig, NO_NODE_OWNER_REASON};
use crate::error::ExponentiatorError;
use crate::node::NodeManager;
use crate::price::PriceFeed;
use crate::wallet::WalletAccount;
use crate::{PowerNodeRegistry, PowerTiers, PowerToken};

pub(crate) const SEND_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Map an alloy contract-call error onto the error taxonomy.
///
/// An RPC error response carrying the `NO NODE OWNER` revert reason is
/// [`ExponentiatorError::NoNodeOwner`]; any other error response is a revert
/// ([`ExponentiatorError::ContractLogic`]); a transport failure is
/// [`ExponentiatorError::Connection`].
pub fn classify_call_error(label: &str, err: alloy::contract::Error) -> ExponentiatorError {
    let message = err.to_string();
    if message.contains(NO_NODE_OWNER_REASON) {
        return ExponentiatorError::NoNodeOwner(format!("{label}: {message}"));
    }
    match err {
        alloy::contract::Error::TransportError(RpcError::Transport(_)) => {
            ExponentiatorError::Connection(format!("{label} failed: {message}"))
        }
        _ => ExponentiatorError::ContractLogic(format!("{label} failed: {message}")),
    }
}

/// Send a transaction and wait for a successful receipt, both under timeouts.
pub(crate) async fn send_and_confirm<F, E>(label: &str, send: F) -> Result<TxHash, ExponentiatorError>
where
    F: Future<Output = Result<PendingTransactionBuilder<Ethereum>, E>>,
    E: std::fmt::Display,
{
    let pending = tokio::time::timeout(SEND_TIMEOUT, send)
        .await
        .map_err(|_| {
            ExponentiatorError::Transaction(format!(
                "{label} send timed out after {}s",
                SEND_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| ExponentiatorError::Transaction(format!("{label} send failed: {e}")))?;

    let receipt = tokio::time::timeout(RECEIPT_TIMEOUT, pending.get_receipt())
        .await
        .map_err(|_| {
            ExponentiatorError::Transaction(format!(
                "{label} receipt timed out after {}s",
                RECEIPT_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| ExponentiatorError::Transaction(format!("{label} receipt failed: {e}")))?;

    if !receipt.status() {
        return Err(ExponentiatorError::Transaction(format!("{label} reverted")));
    }

    Ok(receipt.transaction_hash)
}

/// Provider that signs with `account`.
pub(crate) fn signing_provider(rpc_url: &reqwest::Url, account: &WalletAccount) -> DynProvider {
    ProviderBuilder::new()
        .wallet(account.ethereum_wallet())
        .connect_http(rpc_url.clone())
        .erased()
}

pub struct PowerNode {
    provider: RwLock<DynProvider>,
    rpc_url: reqwest::Url,
    chain: PowerChainConfig,
    costs: CostTable,
    price_feed: PriceFeed,
    auto_compound: bool,
    connection_attempts: u32,
}

impl PowerNode {
    /// The provider is not probed here; [`NodeManager::ensure_connected`]
    /// does that before each cycle.
    pub fn new(chain: PowerChainConfig, price_feed: PriceFeed) -> Result<Self, ExponentiatorError> {
        let rpc_url: reqwest::Url = chain.rpc_url.parse().map_err(|e| {
            ExponentiatorError::Config(format!("invalid RPC_URL {}: {e}", chain.rpc_url))
        })?;
        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();
        Ok(Self {
            provider: RwLock::new(provider),
            rpc_url,
            chain,
            costs: CostTable::default(),
            price_feed,
            auto_compound: true,
            connection_attempts: DEFAULT_CONNECTION_ATTEMPTS,
        })
    }

    /// With auto-compound off, [`NodeManager::compound`] sends nothing and
    /// reports `false` so the operator is notified instead.
    pub fn with_auto_compound(mut self, enabled: bool) -> Self {
        self.auto_compound = enabled;
        self
    }

    pub fn with_cost_table(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_connection_attempts(mut self, attempts: u32) -> Self {
        self.connection_attempts = attempts;
        self
    }

    async fn reader(&self) -> DynProvider {
        self.provider.read().await.clone()
    }
}

#[async_trait]
impl NodeManager for PowerNode {
    fn cost_table(&self) -> &CostTable {
        &self.costs
    }

    fn primary_tier(&self) -> NodeTier {
        self.chain.active_tiers.first().copied().unwrap_or_default()
    }

    async fn ensure_connected(&self) -> Result<(), ExponentiatorError> {
        let provider = connect_with_backoff(&self.chain.rpc_url, self.connection_attempts).await?;
        *self.provider.write().await = provider;
        Ok(())
    }

    async fn wallet_balance(&self, owner: Address) -> Result<U256, ExponentiatorError> {
        let provider = self.reader().await;
        let token = PowerToken::new(self.chain.power_token, &provider);
        token
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| classify_call_error("balanceOf", e))
    }

    async fn node_count(&self, owner: Address) -> Result<u64, ExponentiatorError> {
        let provider = self.reader().await;
        let tiers = PowerTiers::new(self.chain.tier_contract, &provider);
        let count = tiers
            .getNodeNumberOf(owner)
            .call()
            .await
            .map_err(|e| classify_call_error("getNodeNumberOf", e))?;
        u64::try_from(count).map_err(|_| {
            ExponentiatorError::ContractLogic(format!("node count out of range: {count}"))
        })
    }

    async fn rewards_balance(&self, owner: Address) -> Result<U256, ExponentiatorError> {
        let provider = self.reader().await;
        let tiers = PowerTiers::new(self.chain.tier_contract, &provider);
        let mut total = U256::ZERO;
        for tier in &self.chain.active_tiers {
            let rewards = tiers
                .getRewardAmountOf(owner, tier.as_str().to_string())
                .call()
                .await
                .map_err(|e| classify_call_error("getRewardAmountOf", e))?;
            total = total.saturating_add(rewards);
        }
        Ok(total)
    }

    async fn node_names(&self, owner: Address) -> Result<Vec<String>, ExponentiatorError> {
        let provider = self.reader().await;
        let registry = PowerNodeRegistry::new(self.chain.node_registry, &provider);
        let raw = registry
            ._getNodesNames(owner)
            .call()
            .await
            .map_err(|e| classify_call_error("_getNodesNames", e))?;
        Ok(split_node_names(&raw))
    }

    async fn reward_price_usd(&self) -> Result<f64, ExponentiatorError> {
        self.price_feed.usd_price().await
    }

    async fn compound(
        &self,
        account: &WalletAccount,
        name: &str,
    ) -> Result<bool, ExponentiatorError> {
        if !self.auto_compound {
            tracing::info!(wallet = account.name(), name, "auto-compound disabled, no transaction sent");
            return Ok(false);
        }

        let provider = signing_provider(&self.rpc_url, account);
        let tiers = PowerTiers::new(self.chain.tier_contract, &provider);
        let mut compounded = false;
        for tier in &self.chain.active_tiers {
            let call = tiers.compoundTierInto(
                tier.as_str().to_string(),
                tier.as_str().to_string(),
                name.to_string(),
            );
            let tx_hash = send_and_confirm("compoundTierInto", call.send()).await?;
            tracing::info!(wallet = account.name(), name, %tier, %tx_hash, "Compounded rewards into new node");
            compounded = true;
        }
        Ok(compounded)
    }

    async fn claim_rewards(
        &self,
        account: &WalletAccount,
        compound_pct: u32,
    ) -> Result<(), ExponentiatorError> {
        if compound_pct >= 100 {
            tracing::debug!(wallet = account.name(), "everything compounded, nothing to claim");
            return Ok(());
        }

        let provider = signing_provider(&self.rpc_url, account);
        let tiers = PowerTiers::new(self.chain.tier_contract, &provider);
        for tier in &self.chain.active_tiers {
            let call = tiers.cashoutAll(tier.as_str().to_string());
            let tx_hash = send_and_confirm("cashoutAll", call.send()).await?;
            tracing::info!(wallet = account.name(), %tier, %tx_hash, compound_pct, "Claimed rewards");
        }
        Ok(())
    }
}
