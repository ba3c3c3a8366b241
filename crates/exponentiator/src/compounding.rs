//! Compounding decision engine and compounding-name selection.
//!
//! Both are pure over their inputs (the name selector takes its randomness
//! as an argument), so the orchestrator can be tested against fixed seeds.

use std::collections::HashMap;

use alloy::primitives::U256;
use rand::Rng;

use crate::constants::{NodeTier, FALLBACK_COMPOUNDING_NAME, NODE_NAME_SEPARATOR, WEI_PER_TOKEN};
use crate::investment::Investment;

/// Cost and yield of one node in a tier, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierEconomics {
    /// Rewards required to create one new node.
    pub creation_cost: U256,
    /// Rewards one node generates per day.
    pub daily_reward: U256,
}

/// Node creation cost and reward rate per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    tiers: HashMap<NodeTier, TierEconomics>,
}

impl CostTable {
    pub fn new() -> Self {
        Self {
            tiers: HashMap::new(),
        }
    }

    pub fn with_tier(mut self, tier: NodeTier, economics: TierEconomics) -> Self {
        self.tiers.insert(tier, economics);
        self
    }

    pub fn get(&self, tier: NodeTier) -> Option<&TierEconomics> {
        self.tiers.get(&tier)
    }
}

impl Default for CostTable {
    /// Superhuman nodes: 75 POWER to create, 0.7 POWER per day.
    fn default() -> Self {
        let superhuman = TierEconomics {
            creation_cost: U256::from(75u64) * WEI_PER_TOKEN,
            daily_reward: U256::from(700_000_000_000_000_000u64),
        };
        Self::new().with_tier(NodeTier::Superhuman, superhuman)
    }
}

/// Decide whether the rewards in `investment` justify creating a new node.
///
/// `compound_pct` is the share of rewards put into the new node; the rest is
/// left claimable. Values outside `(0, 100]` always return `false`.
///
/// The rule, with `cost` the tier's creation cost and
/// `true_cost = cost * 100 / compound_pct`:
///
/// - `rewards >= true_cost` compounds;
/// - otherwise, with at least `cost / 2` in rewards and
///   `rewards + balance >= true_cost`, compound when fully compounding or when
///   the idle balance alone exceeds `cost`;
/// - anything else waits.
pub fn can_compound(investment: &Investment, costs: &CostTable, compound_pct: u32) -> bool {
    if compound_pct == 0 || compound_pct > 100 {
        return false;
    }

    let Some(economics) = costs.get(investment.tier) else {
        return false;
    };

    let compounding_cost = economics.creation_cost;
    let pct = U256::from(compound_pct);
    let scaled_cost = compounding_cost.saturating_mul(U256::from(100u64));
    let rewards = investment.rewards;

    // Cross-multiplied so the true-cost comparison is exact.
    if rewards.saturating_mul(pct) >= scaled_cost {
        return true;
    }

    let covers_half = rewards.saturating_mul(U256::from(2u64)) >= compounding_cost;
    let topped_up = rewards.saturating_add(investment.balance).saturating_mul(pct) >= scaled_cost;
    if covers_half && topped_up {
        if compound_pct == 100 {
            return true;
        }
        // Partial compounding would draw on the withdrawal reserve; only do it
        // when the idle balance already covers a full node.
        return investment.balance > compounding_cost;
    }

    false
}

/// Split the registry's `#`-delimited name list, dropping empty segments.
pub fn split_node_names(raw: &str) -> Vec<String> {
    raw.split(NODE_NAME_SEPARATOR)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick a name for the next compounded node.
///
/// Seeds are names that do not end in an ASCII digit; other Unicode digits
/// such as `²` leave a name a seed. One seed is chosen uniformly
/// and suffixed with the number of existing names it prefixes (itself
/// included), e.g. `["alpha", "alpha_1", "beta"]` may yield `alpha_2`.
/// Without any seed the fallback `auto_compound` is returned.
pub fn select_compounding_name<R: Rng>(existing_names: &[String], rng: &mut R) -> String {
    let seeds: Vec<&String> = existing_names
        .iter()
        .filter(|name| {
            name.chars()
                .last()
                .map(|c| !c.is_ascii_digit())
                .unwrap_or(false)
        })
        .collect();

    if seeds.is_empty() {
        return FALLBACK_COMPOUNDING_NAME.to_string();
    }

    let seed = seeds[rng.random_range(0..seeds.len())];
    let descendants = existing_names
        .iter()
        .filter(|name| name.starts_with(seed.as_str()))
        .count();

    format!("{seed}_{descendants}")
}
