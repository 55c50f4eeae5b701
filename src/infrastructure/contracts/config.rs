use crate::domain::services::ContractError;
use crate::infrastructure::contracts::types::{ChainConfig, NativeCurrency};

pub const CORE_TESTNET_CHAIN_ID: u64 = 1115;
pub const HARDHAT_CHAIN_ID: u64 = 31337;

/// Resolve a chain by id, optionally pointing it at a different RPC endpoint.
pub fn get_chain_config(chain_id: u64, rpc_override: Option<String>) -> Result<ChainConfig, ContractError> {
    let mut config = get_chain_config_by_id(chain_id)
        .ok_or_else(|| ContractError::ConfigError(format!("Unsupported chain ID: {}", chain_id)))?;

    if let Some(url) = rpc_override.filter(|u| !u.trim().is_empty()) {
        if !validate_url(&url) {
            return Err(ContractError::ConfigError(format!("Invalid RPC URL: {}", url)));
        }
        config.rpc_url = url;
    }

    Ok(config)
}

/// Get chain configuration by chain ID
pub fn get_chain_config_by_id(chain_id: u64) -> Option<ChainConfig> {
    get_supported_chains().into_iter().find(|c| c.chain_id == chain_id)
}

/// Get all supported chain configurations
pub fn get_supported_chains() -> Vec<ChainConfig> {
    vec![get_core_testnet_config(), get_hardhat_config()]
}

/// Validate if a chain ID is supported
pub fn is_chain_supported(chain_id: u64) -> bool {
    get_chain_config_by_id(chain_id).is_some()
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

/// Core testnet configuration
fn get_core_testnet_config() -> ChainConfig {
    ChainConfig {
        chain_id: CORE_TESTNET_CHAIN_ID,
        network: "testnet".to_string(),
        name: "Core Testnet".to_string(),
        rpc_url: "https://rpc.test.btcs.network".to_string(),
        explorer_url: "https://scan.test.btcs.network".to_string(),
        native_currency: NativeCurrency {
            name: "Test Core".to_string(),
            symbol: "TCORE".to_string(),
            decimals: 18,
        },
        confirmations: 1,
        poll_interval_ms: 3000,
    }
}

/// Hardhat local development configuration
fn get_hardhat_config() -> ChainConfig {
    ChainConfig {
        chain_id: HARDHAT_CHAIN_ID,
        network: "hardhat".to_string(),
        name: "Hardhat Local".to_string(),
        rpc_url: "http://localhost:8545".to_string(),
        explorer_url: String::new(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        confirmations: 1,
        poll_interval_ms: 500,
    }
}
