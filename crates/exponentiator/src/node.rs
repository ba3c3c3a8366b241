//! Node manager trait: chain reads and node-side writes for one protocol.
//!
//! See [`crate::power::PowerNode`] for the POWER implementation.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::compounding::CostTable;
use crate::constants::NodeTier;
use crate::error::ExponentiatorError;
use crate::wallet::WalletAccount;

/// Reads and writes the orchestrator needs from a node protocol.
///
/// Reads that hit a wallet without nodes return
/// [`ExponentiatorError::NoNodeOwner`]; other reverts return
/// [`ExponentiatorError::ContractLogic`]; an unreachable RPC returns
/// [`ExponentiatorError::Connection`].
#[async_trait]
pub trait NodeManager: Send + Sync {
    /// Creation cost and reward rate per tier.
    fn cost_table(&self) -> &CostTable;

    /// Tier whose economics drive the compounding decision.
    fn primary_tier(&self) -> NodeTier;

    /// (Re)establish the chain connection. Called before every cycle's reads.
    ///
    /// Returns [`ExponentiatorError::Connection`] only after the
    /// implementation's own retries are exhausted.
    async fn ensure_connected(&self) -> Result<(), ExponentiatorError> {
        Ok(())
    }

    /// Reward-token balance held by `owner`, in wei.
    async fn wallet_balance(&self, owner: Address) -> Result<U256, ExponentiatorError>;

    /// Number of nodes owned by `owner`.
    async fn node_count(&self, owner: Address) -> Result<u64, ExponentiatorError>;

    /// Unclaimed rewards across all active tiers, in wei.
    async fn rewards_balance(&self, owner: Address) -> Result<U256, ExponentiatorError>;

    /// Names of all nodes owned by `owner`.
    async fn node_names(&self, owner: Address) -> Result<Vec<String>, ExponentiatorError>;

    /// USD price of one reward token.
    async fn reward_price_usd(&self) -> Result<f64, ExponentiatorError>;

    /// Compound rewards into a new node called `name`.
    ///
    /// `Ok(false)` means no transaction was sent and a human should act.
    async fn compound(
        &self,
        account: &WalletAccount,
        name: &str,
    ) -> Result<bool, ExponentiatorError>;

    /// Claim whatever `compound_pct` left uncompounded.
    async fn claim_rewards(
        &self,
        account: &WalletAccount,
        compound_pct: u32,
    ) -> Result<(), ExponentiatorError>;
}
