use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::config::validate_url;

pub const DEFAULT_CONFIG_FILE: &str = "Deploy.toml";

/// Deployment-time settings: named networks, the Solidity compiler and the
/// project paths. Never read by the running clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub default_network: String,
    pub networks: BTreeMap<String, NetworkEntry>,
    pub solidity: SolidityConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// One named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub url: String,
    pub chain_id: u64,
    /// Environment variable holding the deployer's private key. Keys are never
    /// written to this file.
    #[serde(default = "default_key_env")]
    pub private_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityConfig {
    pub version: String,
    #[serde(default = "default_evm_version")]
    pub evm_version: String,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Compiler executable.
    #[serde(default = "default_solc")]
    pub solc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: default_runs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_sources")]
    pub sources: PathBuf,
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
    #[serde(default = "default_deployments")]
    pub deployments: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            artifacts: default_artifacts(),
            deployments: default_deployments(),
        }
    }
}

fn default_key_env() -> String {
    "PRIVATE_KEY".to_string()
}

fn default_evm_version() -> String {
    "paris".to_string()
}

fn default_solc() -> String {
    "solc".to_string()
}

fn default_runs() -> u32 {
    200
}

fn default_sources() -> PathBuf {
    PathBuf::from("contracts")
}

fn default_artifacts() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_deployments() -> PathBuf {
    PathBuf::from(crate::infrastructure::contracts::addresses::DEFAULT_DEPLOYMENTS_DIR)
}

impl DeployConfig {
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ContractError::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| ContractError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ContractError> {
        let config: DeployConfig = toml::from_str(content).map_err(|e| ContractError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The named network, or the default one when `name` is `None`.
    pub fn network(&self, name: Option<&str>) -> Result<(&str, &NetworkEntry), ContractError> {
        let name = name.unwrap_or(&self.default_network);
        self.networks
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| {
                let known: Vec<&str> = self.networks.keys().map(String::as_str).collect();
                ContractError::ConfigError(format!("Unknown network {:?} (known: {})", name, known.join(", ")))
            })
    }

    fn validate(&self) -> Result<(), ContractError> {
        if !self.networks.contains_key(&self.default_network) {
            return Err(ContractError::ConfigError(format!(
                "default_network {:?} is not defined under [networks]",
                self.default_network
            )));
        }
        for (name, network) in &self.networks {
            if !validate_url(&network.url) {
                return Err(ContractError::ConfigError(format!(
                    "Network {} has an invalid url: {}",
                    name, network.url
                )));
            }
        }
        if self.solidity.version.trim().is_empty() {
            return Err(ContractError::ConfigError("solidity.version is empty".to_string()));
        }
        Ok(())
    }
}
