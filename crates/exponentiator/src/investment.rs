use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::constants::NodeTier;

/// Point-in-time view of one wallet's position, read at the start of a check.
///
/// Never re-validated before acting: rewards or prices may move between the
/// read and the transaction landing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Investment {
    pub name: String,
    pub address: Address,
    /// POWER held by the wallet, in wei.
    pub balance: U256,
    pub node_count: u64,
    /// Unclaimed rewards across active tiers, in wei.
    pub rewards: U256,
    pub tier: NodeTier,
    /// USD price of one POWER at read time, when the price feed answered.
    pub power_price: Option<f64>,
}

impl Investment {
    /// USD value of the unclaimed rewards, if a price is known.
    pub fn rewards_in_usd(&self) -> Option<f64> {
        let rewards: f64 = format_ether(self.rewards).parse().ok()?;
        self.power_price.map(|price| rewards * price)
    }

    /// Human-readable summary used in notification bodies.
    pub fn summary(&self) -> String {
        format!(
            "Total Node count: {}\nTotal Rewards  : {}\nWallet Balance : {}",
            self.node_count,
            format_ether(self.rewards),
            format_ether(self.balance),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::utils::parse_ether;

    fn investment(price: Option<f64>) -> Investment {
        Investment {
            name: "main".to_string(),
            address: Address::ZERO,
            balance: parse_ether("12.5").unwrap(),
            node_count: 4,
            rewards: parse_ether("2").unwrap(),
            tier: NodeTier::Superhuman,
            power_price: price,
        }
    }

    #[test]
    fn test_rewards_in_usd() {
        let usd = investment(Some(1.5)).rewards_in_usd().unwrap();
        assert!((usd - 3.0).abs() < 1e-9);
        assert!(investment(None).rewards_in_usd().is_none());
    }

    #[test]
    fn test_summary_lists_counts_and_amounts() {
        let summary = investment(None).summary();
        assert!(summary.contains("Total Node count: 4"));
        assert!(summary.contains("Total Rewards  : 2.0"));
        assert!(summary.contains("Wallet Balance : 12.5"));
    }
}
