use thiserror::Error;

/// Errors returned by exponentiator operations.
#[derive(Debug, Error)]
pub enum ExponentiatorError {
    /// The wallet owns no nodes. Expected, not a failure.
    #[error("no node owner: {0}")]
    NoNodeOwner(String),

    /// A contract call reverted for any other reason.
    #[error("contract error: {0}")]
    ContractLogic(String),

    /// The RPC endpoint could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// A write transaction failed to send, confirm, or reverted.
    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("price error: {0}")]
    Price(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ExponentiatorError {
    /// Connectivity failures abort the whole cycle; everything else is
    /// scoped to a single wallet.
    pub fn is_connection(&self) -> bool {
        matches!(self, ExponentiatorError::Connection(_))
    }
}
