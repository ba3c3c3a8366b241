//! Withdrawal decision engine.

use alloy::primitives::U256;

use crate::compounding::CostTable;
use crate::investment::Investment;

/// Outcome of a withdrawal check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalDecision {
    pub eligible: bool,
    /// Uncompounded yield expected over the window, in wei.
    pub threshold: U256,
}

impl WithdrawalDecision {
    fn ineligible() -> Self {
        Self {
            eligible: false,
            threshold: U256::ZERO,
        }
    }
}

/// Decide whether enough uncompounded yield has piled up to swap some of it.
///
/// The threshold is the share of the window's theoretical generation that
/// was never meant to be compounded:
/// `node_count * daily_reward * interval_hours / 24 * (100 - compound_pct) / 100`.
/// Eligible iff `0 < threshold < balance`, i.e. the idle balance has grown
/// past it rather than already being swept.
pub fn should_withdraw(
    investment: &Investment,
    costs: &CostTable,
    compound_pct: u32,
    interval_hours: u64,
) -> WithdrawalDecision {
    if compound_pct > 100 {
        return WithdrawalDecision::ineligible();
    }
    let Some(economics) = costs.get(investment.tier) else {
        return WithdrawalDecision::ineligible();
    };

    // Multiply everything first so the division truncates once.
    let threshold = U256::from(investment.node_count)
        * economics.daily_reward
        * U256::from(interval_hours)
        * U256::from(100 - compound_pct)
        / U256::from(24u64 * 100);

    WithdrawalDecision {
        eligible: !threshold.is_zero() && threshold < investment.balance,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NodeTier;
    use alloy::primitives::utils::parse_ether;
    use alloy::primitives::Address;

    fn ether(value: &str) -> U256 {
        parse_ether(value).unwrap()
    }

    fn investment(node_count: u64, balance: &str) -> Investment {
        Investment {
            name: "main".to_string(),
            address: Address::ZERO,
            balance: ether(balance),
            node_count,
            rewards: U256::ZERO,
            tier: NodeTier::Superhuman,
            power_price: None,
        }
    }

    #[test]
    fn test_daily_window_at_80_pct() {
        let decision = should_withdraw(&investment(10, "2"), &CostTable::default(), 80, 24);
        assert_eq!(decision.threshold, ether("1.4"));
        assert!(decision.eligible);
    }

    #[test]
    fn test_balance_below_threshold_is_not_eligible() {
        let decision = should_withdraw(&investment(10, "1.4"), &CostTable::default(), 80, 24);
        assert_eq!(decision.threshold, ether("1.4"));
        assert!(!decision.eligible);
    }

    #[test]
    fn test_full_compounding_leaves_nothing_to_withdraw() {
        let decision = should_withdraw(&investment(10, "500"), &CostTable::default(), 100, 24);
        assert!(decision.threshold.is_zero());
        assert!(!decision.eligible);
    }

    #[test]
    fn test_no_nodes_means_no_threshold() {
        let decision = should_withdraw(&investment(0, "500"), &CostTable::default(), 50, 24);
        assert!(!decision.eligible);
    }

    #[test]
    fn test_threshold_scales_linearly() {
        let costs = CostTable::default();
        let base = should_withdraw(&investment(4, "0"), &costs, 50, 12).threshold;
        assert_eq!(
            should_withdraw(&investment(8, "0"), &costs, 50, 12).threshold,
            base * U256::from(2u64)
        );
        assert_eq!(
            should_withdraw(&investment(4, "0"), &costs, 50, 36).threshold,
            base * U256::from(3u64)
        );
        // (100 - 0) is twice (100 - 50)
        assert_eq!(
            should_withdraw(&investment(4, "0"), &costs, 0, 12).threshold,
            base * U256::from(2u64)
        );
    }

    #[test]
    fn test_out_of_range_pct_is_not_eligible() {
        let decision = should_withdraw(&investment(10, "500"), &CostTable::default(), 150, 24);
        assert_eq!(decision, WithdrawalDecision::ineligible());
    }
}
