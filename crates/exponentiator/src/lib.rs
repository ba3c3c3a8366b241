//! Auto-compounding agent for POWER nodes on Fantom.
//!
//! Watches a set of wallets for accrued node rewards, compounds them into new
//! nodes once the threshold is crossed, and optionally swaps a withdrawal
//! portion of the idle balance to FTM. Operators hear about opportunities and
//! failures through a [`Notifier`].
//!
//! # Layers
//!
//! - **Decision engines** ([`compounding`], [`withdrawal`]) are pure functions
//!   over an [`Investment`] snapshot.
//! - **Orchestrator** ([`Exponentiator`]) reads snapshots, applies the engines
//!   and acts through the collaborator traits.
//! - **Run loop** ([`RunLoop`]) drives the orchestrator on a fixed interval
//!   with exponential backoff on failure.
//! - **Collaborators** ([`NodeManager`], [`Dex`], [`Notifier`]) wrap the
//!   chain and the operator channel. [`PowerNode`] and [`SpookySwap`] are the
//!   alloy-backed implementations.
//!
//! # Quick example
//!
//! ```no_run
//! use exponentiator::{bootstrap, ExponentiatorConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), exponentiator::ExponentiatorError> {
//! let config = ExponentiatorConfig::from_env()?;
//! let mut app = bootstrap::bootstrap_exponentiator(&config)?;
//! let status = app.execute_check(config.compound_pct).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

// Core types and decision engines
pub mod compounding;
pub mod constants;
pub mod error;
pub mod investment;
pub mod withdrawal;

// Orchestration
pub mod notification_log;
pub mod orchestrator;
pub mod run_loop;

// Collaborators
pub mod connection;
pub mod dex;
pub mod email;
pub mod hmac;
pub mod node;
pub mod notifier;
pub mod power;
pub mod price;
pub mod spookyswap;
pub mod wallet;
pub mod webhook;

// Wiring
pub mod bootstrap;
pub mod config;

use alloy::sol;

// POWER token (ERC-20). Only the calls the agent needs.
sol! {
    #[sol(rpc)]
    interface PowerToken {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// Tier manager: rewards, node counts, compounding and cashout per tier.
sol! {
    #[sol(rpc)]
    interface PowerTiers {
        function getRewardAmountOf(address account, string tierName) external view returns (uint256);
        function getNodeNumberOf(address account) external view returns (uint256);
        function compoundInto(string tierName, string nodeName) external;
        function compoundTierInto(string tierName, string compoundTierName, string nodeName) external;
        function cashoutAll(string tierName) external;
    }
}

// Node registry. Names come back as a single `#`-delimited string.
sol! {
    #[sol(rpc)]
    interface PowerNodeRegistry {
        function _getNodesNames(address account) external view returns (string);
    }
}

// UniswapV2-style router (SpookySwap).
sol! {
    #[sol(rpc)]
    interface SwapRouter {
        function getAmountsOut(uint256 amountIn, address[] path) external view returns (uint256[] amounts);
        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        ) external returns (uint256[] amounts);
    }
}

// Re-exports
pub use compounding::{can_compound, select_compounding_name, CostTable, TierEconomics};
pub use config::ExponentiatorConfig;
pub use constants::{NodeTier, PowerChainConfig};
pub use dex::Dex;
pub use error::ExponentiatorError;
pub use investment::Investment;
pub use node::NodeManager;
pub use notification_log::{Clock, NotificationLog, SystemClock};
pub use notifier::{Notifier, NotifierKind};
pub use orchestrator::Exponentiator;
pub use power::PowerNode;
pub use run_loop::{Backoff, RunLoop};
pub use spookyswap::SpookySwap;
pub use wallet::WalletAccount;
pub use withdrawal::{should_withdraw, WithdrawalDecision};
