use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

/// Fantom opera chain ID.
pub const FANTOM_CHAIN_ID: u64 = 250;

/// Default public RPC endpoint for Fantom opera.
pub const RPC_URL: &str = "https://rpcapi.fantom.network/";

/// POWER token (ERC-20, 18 decimals).
pub const POWER_TOKEN: Address = address!("0x131c7afb4E5f5c94A27611f7210dfEc2215E85Ae");

/// Tier manager contract: rewards, node counts, compounding, cashout.
pub const TIER_CONTRACT: Address = address!("0x8cb77FFa9A7B82541E96db41C35e307d9d16A294");

/// Node registry contract: node name enumeration.
pub const NODE_REGISTRY: Address = address!("0xC8007751603bB3E45834A59af64190Bb618b4a83");

/// SpookySwap UniswapV2 router.
pub const SWAP_ROUTER: Address = address!("0xF491e7B69E4244ad4002BC14e878a34207E38c29");

/// Wrapped FTM, the native leg of every swap path.
pub const WRAPPED_NATIVE: Address = address!("0x21be370D5312f44cB42ce377BC9b8a0cEF1A4C83");

/// One whole POWER (18 decimals) in wei.
pub const WEI_PER_TOKEN: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// CoinGecko id used to price POWER in USD.
pub const COINGECKO_ID: &str = "power-nodes";

/// Revert reason the tier contract returns for wallets without nodes.
pub const NO_NODE_OWNER_REASON: &str = "NO NODE OWNER";

/// Fallback name when a wallet has no seed names to derive from.
pub const FALLBACK_COMPOUNDING_NAME: &str = "auto_compound";

/// Separator used by the registry when returning node names.
pub const NODE_NAME_SEPARATOR: char = '#';

/// Node tiers known to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeTier {
    /// "Nuclear" nodes, the only tier the agent compounds into.
    #[default]
    Superhuman,
    Human,
    Microscopic,
    Flatversal,
}

impl NodeTier {
    /// Tier name as the contracts expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTier::Superhuman => "SUPERHUMAN",
            NodeTier::Human => "HUMAN",
            NodeTier::Microscopic => "MICROSCOPIC",
            NodeTier::Flatversal => "FLATVERSAL",
        }
    }
}

impl std::fmt::Display for NodeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime chain configuration. Collaborators read addresses from here so
/// tests and forks can point them elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub power_token: Address,
    pub tier_contract: Address,
    pub node_registry: Address,
    pub swap_router: Address,
    pub wrapped_native: Address,
    /// Tiers whose rewards are summed and compounded, in order.
    pub active_tiers: Vec<NodeTier>,
}

impl Default for PowerChainConfig {
    /// Defaults to Fantom opera mainnet.
    fn default() -> Self {
        Self {
            chain_id: FANTOM_CHAIN_ID,
            rpc_url: RPC_URL.to_string(),
            power_token: POWER_TOKEN,
            tier_contract: TIER_CONTRACT,
            node_registry: NODE_REGISTRY,
            swap_router: SWAP_ROUTER,
            wrapped_native: WRAPPED_NATIVE,
            active_tiers: vec![NodeTier::Superhuman],
        }
    }
}
