use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;

use crate::error::ExponentiatorError;
use crate::wallet::WalletAccount;

/// Exchange used to convert reward tokens into the chain's native token.
#[async_trait]
pub trait Dex: Send + Sync {
    /// Swap `amount` (wei) of the reward token held by `account` to native.
    async fn swap_to_native(
        &self,
        account: &WalletAccount,
        amount: U256,
    ) -> Result<TxHash, ExponentiatorError>;
}
