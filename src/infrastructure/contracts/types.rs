use ethers::types::Address;
use serde::{Deserialize, Serialize};

// ============ CONTRACT CONFIGURATION TYPES ============

/// Native currency information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain-specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Short network name, used to key deployment records (`testnet`, `hardhat`).
    pub network: String,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
    /// Blocks to wait for before a write counts as confirmed.
    pub confirmations: usize,
    /// How often a pending transaction is polled for its receipt.
    pub poll_interval_ms: u64,
}

impl ChainConfig {
    /// Local development chains sign with node-managed accounts.
    pub fn is_local_dev(&self) -> bool {
        self.chain_id == super::config::HARDHAT_CHAIN_ID
    }
}

/// Contract addresses for a network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub guestbook: Option<Address>,
    pub campaign_factory: Option<Address>,
}

impl ContractAddresses {
    pub fn require_guestbook(&self) -> Result<Address, crate::domain::ContractError> {
        self.guestbook.ok_or_else(|| {
            crate::domain::ContractError::ConfigError(
                "Guestbook address not configured. Set GUESTBOOK_ADDRESS.".to_string(),
            )
        })
    }

    pub fn require_campaign_factory(&self) -> Result<Address, crate::domain::ContractError> {
        self.campaign_factory.ok_or_else(|| {
            crate::domain::ContractError::ConfigError(
                "CampaignFactory address not configured. Run the deploy tool or set CAMPAIGN_FACTORY_ADDRESS."
                    .to_string(),
            )
        })
    }
}
