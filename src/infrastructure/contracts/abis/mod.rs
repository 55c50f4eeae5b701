use std::fs;
use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use tracing::debug;

use crate::domain::services::ContractError;

// Human-readable interfaces of the deployed contracts. Only the functions the
// clients call are listed.

const GUESTBOOK_ABI: &[&str] = &[
    "function getMessages() view returns (string[])",
    "function addMessage(string _msg)",
];

const CAMPAIGN_FACTORY_ABI: &[&str] = &[
    "function getAllCampaigns() view returns (address[])",
    "function createCampaign(string _title, string _description, uint256 _goal)",
];

const CAMPAIGN_ABI: &[&str] = &[
    "function title() view returns (string)",
    "function description() view returns (string)",
    "function goal() view returns (uint256)",
    "function raisedAmount() view returns (uint256)",
    "function contribute() payable",
];

/// Where the ABIs for the three contracts come from.
#[derive(Debug, Clone, Default)]
pub struct AbiSource {
    /// Directory of JSON ABI files (`Guestbook.Abi.json`, ...). Built-in
    /// interfaces are used for any file that is missing.
    pub dir: Option<PathBuf>,
}

impl AbiSource {
    pub fn from_env() -> Self {
        Self {
            dir: std::env::var("ABI_DIR").ok().map(PathBuf::from),
        }
    }

    pub fn guestbook(&self) -> Result<Abi, ContractError> {
        self.load("Guestbook.Abi.json", GUESTBOOK_ABI)
    }

    pub fn campaign_factory(&self) -> Result<Abi, ContractError> {
        self.load("CampaignFactory.Abi.json", CAMPAIGN_FACTORY_ABI)
    }

    pub fn campaign(&self) -> Result<Abi, ContractError> {
        self.load("Campaign.Abi.json", CAMPAIGN_ABI)
    }

    fn load(&self, filename: &str, builtin: &[&str]) -> Result<Abi, ContractError> {
        if let Some(dir) = &self.dir {
            let path = dir.join(filename);
            if path.exists() {
                debug!("Loading ABI from {}", path.display());
                return load_abi_file(&path);
            }
        }
        parse_human_readable(builtin)
    }
}

/// Parse a JSON ABI. Accepts a bare ABI array or an artifact object with an
/// `abi` field.
pub fn load_abi_file(path: &Path) -> Result<Abi, ContractError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ContractError::AbiError(format!("Failed to read ABI file {}: {}", path.display(), e)))?;
    parse_abi_json(&content)
        .map_err(|e| ContractError::AbiError(format!("Failed to parse ABI file {}: {}", path.display(), e)))
}

pub fn parse_abi_json(content: &str) -> Result<Abi, ContractError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ContractError::AbiError(e.to_string()))?;

    let abi = match value.get("abi") {
        Some(inner) => inner.clone(),
        None => value,
    };

    serde_json::from_value(abi).map_err(|e| ContractError::AbiError(e.to_string()))
}

fn parse_human_readable(signatures: &[&str]) -> Result<Abi, ContractError> {
    ethers::abi::parse_abi(signatures).map_err(|e| ContractError::AbiError(e.to_string()))
}
