use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ethers::types::Address;
use tracing::debug;

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::config::CORE_TESTNET_CHAIN_ID;
use crate::infrastructure::contracts::types::{ChainConfig, ContractAddresses};

pub const GUESTBOOK: &str = "Guestbook";
pub const CAMPAIGN_FACTORY: &str = "CampaignFactory";

pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

// ============ KNOWN DEPLOYMENTS ============

const CORE_TESTNET_GUESTBOOK: &str = "0x1c1F252190A3c0680077F33235CF9E6F7f53E426";
const CORE_TESTNET_CAMPAIGN_FACTORY: &str = "0x79d03f62f8865c1Bc3d6d96c493f3C1986a88340";

/// Addresses supplied explicitly (environment or command line). They win over
/// everything else.
#[derive(Debug, Clone, Default)]
pub struct AddressOverrides {
    pub guestbook: Option<String>,
    pub campaign_factory: Option<String>,
}

impl AddressOverrides {
    pub fn from_env() -> Self {
        Self {
            guestbook: std::env::var("GUESTBOOK_ADDRESS").ok(),
            campaign_factory: std::env::var("CAMPAIGN_FACTORY_ADDRESS").ok(),
        }
    }
}

/// Directory holding `deployed_addresses_<network>.json` records.
pub fn deployments_dir_from_env() -> PathBuf {
    std::env::var("DEPLOYMENTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DEPLOYMENTS_DIR))
}

/// Load contract addresses for the current environment
pub fn load_addresses_from_env(chain: &ChainConfig) -> Result<ContractAddresses, ContractError> {
    resolve_addresses(chain, &AddressOverrides::from_env(), &deployments_dir_from_env())
}

/// Resolve contract addresses: explicit override, then the deployment record
/// for the chain's network, then the built-in deployment for that chain.
pub fn resolve_addresses(
    chain: &ChainConfig,
    overrides: &AddressOverrides,
    deployments_dir: &Path,
) -> Result<ContractAddresses, ContractError> {
    let recorded = match load_addresses_from_file(&record_path(deployments_dir, &chain.network)) {
        Ok(map) => map,
        Err(e) => {
            debug!("No usable deployment record for {}: {}", chain.network, e);
            BTreeMap::new()
        }
    };
    let builtin = builtin_addresses(chain.chain_id);

    let pick = |name: &str, explicit: &Option<String>, fallback: Option<&str>| -> Result<Option<Address>, ContractError> {
        if let Some(raw) = explicit.as_deref().filter(|s| !s.trim().is_empty()) {
            return parse_address(name, raw).map(Some);
        }
        if let Some(raw) = recorded.get(name) {
            return parse_address(name, raw).map(Some);
        }
        fallback.map(|raw| parse_address(name, raw)).transpose()
    };

    Ok(ContractAddresses {
        guestbook: pick(GUESTBOOK, &overrides.guestbook, builtin.0)?,
        campaign_factory: pick(CAMPAIGN_FACTORY, &overrides.campaign_factory, builtin.1)?,
    })
}

/// Record a freshly deployed contract for a network. Any earlier address for
/// the same contract is overwritten; other contracts in the record are kept.
pub fn save_deployed_address(
    deployments_dir: &Path,
    network: &str,
    contract_name: &str,
    address: Address,
) -> Result<PathBuf, ContractError> {
    fs::create_dir_all(deployments_dir).map_err(|e| {
        ContractError::DeployError(format!("Failed to create {}: {}", deployments_dir.display(), e))
    })?;

    let path = record_path(deployments_dir, network);
    let mut addresses = load_addresses_from_file(&path).unwrap_or_default();
    addresses.insert(contract_name.to_string(), format!("{:?}", address));

    let json = serde_json::to_string_pretty(&addresses)
        .map_err(|e| ContractError::DeployError(format!("Failed to encode addresses: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| ContractError::DeployError(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(path)
}

fn record_path(deployments_dir: &Path, network: &str) -> PathBuf {
    deployments_dir.join(format!("deployed_addresses_{}.json", network))
}

fn builtin_addresses(chain_id: u64) -> (Option<&'static str>, Option<&'static str>) {
    match chain_id {
        CORE_TESTNET_CHAIN_ID => (Some(CORE_TESTNET_GUESTBOOK), Some(CORE_TESTNET_CAMPAIGN_FACTORY)),
        _ => (None, None),
    }
}

// Load addresses from JSON file
fn load_addresses_from_file(file_path: &Path) -> Result<BTreeMap<String, String>, ContractError> {
    let content = fs::read_to_string(file_path).map_err(|e| {
        ContractError::ConfigError(format!("Failed to read addresses file {}: {}", file_path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ContractError::ConfigError(format!("Failed to parse addresses JSON from {}: {}", file_path.display(), e))
    })
}

fn parse_address(name: &str, raw: &str) -> Result<Address, ContractError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| ContractError::InvalidAddress(format!("Invalid address for {}: {}", name, e)))
}
