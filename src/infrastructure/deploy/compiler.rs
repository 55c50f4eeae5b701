use std::fs;
use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::services::ContractError;
use crate::infrastructure::deploy::config::SolidityConfig;

/// ABI and creation bytecode of one compiled contract.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Runs the external `solc` executable with the configured settings.
pub struct SolcCompiler {
    settings: SolidityConfig,
}

impl SolcCompiler {
    pub fn new(settings: SolidityConfig) -> Self {
        Self { settings }
    }

    /// Arguments for a combined-JSON build of `source`.
    pub fn build_args(&self, source: &Path) -> Vec<String> {
        let mut args = vec![
            "--combined-json".to_string(),
            "abi,bin".to_string(),
            "--evm-version".to_string(),
            self.settings.evm_version.clone(),
        ];
        if self.settings.optimizer.enabled {
            args.push("--optimize".to_string());
            args.push("--optimize-runs".to_string());
            args.push(self.settings.optimizer.runs.to_string());
        }
        args.push(source.display().to_string());
        args
    }

    /// Make sure the installed compiler is the configured version.
    pub async fn check_version(&self) -> Result<String, ContractError> {
        let output = Command::new(&self.settings.solc)
            .arg("--version")
            .output()
            .await
            .map_err(|e| ContractError::DeployError(format!("Failed to run {}: {}", self.settings.solc, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = parse_solc_version(&stdout)
            .ok_or_else(|| ContractError::DeployError(format!("Unrecognised solc output: {}", stdout.trim())))?;

        if version != self.settings.version {
            return Err(ContractError::DeployError(format!(
                "solc {} is installed but {} is configured",
                version, self.settings.version
            )));
        }
        Ok(version)
    }

    /// Compile `source` and write the combined JSON to `artifacts_dir`.
    pub async fn compile(&self, source: &Path, artifacts_dir: &Path) -> Result<PathBuf, ContractError> {
        self.check_version().await?;

        let args = self.build_args(source);
        debug!("Running {} {}", self.settings.solc, args.join(" "));

        let output = Command::new(&self.settings.solc)
            .args(&args)
            .output()
            .await
            .map_err(|e| ContractError::DeployError(format!("Failed to run {}: {}", self.settings.solc, e)))?;

        if !output.status.success() {
            return Err(ContractError::DeployError(format!(
                "Compilation of {} failed: {}",
                source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        fs::create_dir_all(artifacts_dir).map_err(|e| {
            ContractError::DeployError(format!("Failed to create {}: {}", artifacts_dir.display(), e))
        })?;

        let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("contracts");
        let artifact = artifacts_dir.join(format!("{}.combined.json", stem));
        fs::write(&artifact, &output.stdout)
            .map_err(|e| ContractError::DeployError(format!("Failed to write {}: {}", artifact.display(), e)))?;

        info!("Compiled {} into {}", source.display(), artifact.display());
        Ok(artifact)
    }
}

/// Extract `0.8.21` from `solc --version` output.
pub fn parse_solc_version(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.trim_start().starts_with("Version:"))?;
    let version = line.split_once(':')?.1.trim();
    let version = version.split(['+', '-']).next()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

pub fn load_artifact(path: &Path, contract_name: &str) -> Result<CompiledContract, ContractError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ContractError::DeployError(format!("Failed to read artifact {}: {}", path.display(), e)))?;
    parse_artifact(&content, contract_name)
}

/// Read one contract out of either a solc combined-JSON file or a
/// Hardhat-style `{abi, bytecode}` artifact.
pub fn parse_artifact(content: &str, contract_name: &str) -> Result<CompiledContract, ContractError> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ContractError::DeployError(format!("Artifact is not JSON: {}", e)))?;

    let (abi, bytecode) = if let Some(contracts) = json.get("contracts").and_then(Value::as_object) {
        let suffix = format!(":{}", contract_name);
        let entry = contracts
            .iter()
            .find(|(key, _)| key.ends_with(&suffix) || key.as_str() == contract_name)
            .map(|(_, v)| v)
            .ok_or_else(|| ContractError::DeployError(format!("{} not found in artifact", contract_name)))?;
        (entry.get("abi"), entry.get("bin"))
    } else {
        (json.get("abi"), json.get("bytecode"))
    };

    let abi = abi.ok_or_else(|| ContractError::DeployError(format!("{} has no ABI", contract_name)))?;
    // older solc emits the ABI as an escaped string
    let abi: Abi = match abi {
        Value::String(raw) => serde_json::from_str(raw),
        other => serde_json::from_value(other.clone()),
    }
    .map_err(|e| ContractError::AbiError(format!("{}: {}", contract_name, e)))?;

    let bytecode = bytecode
        .and_then(Value::as_str)
        .ok_or_else(|| ContractError::DeployError(format!("{} has no bytecode", contract_name)))?;
    let bytecode = hex::decode(bytecode.trim_start_matches("0x"))
        .map_err(|e| ContractError::DeployError(format!("{} bytecode is not hex: {}", contract_name, e)))?;
    if bytecode.is_empty() {
        return Err(ContractError::DeployError(format!(
            "{} has empty bytecode (abstract contract or interface?)",
            contract_name
        )));
    }

    Ok(CompiledContract {
        name: contract_name.to_string(),
        abi,
        bytecode: Bytes::from(bytecode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::deploy::config::OptimizerConfig;

    const ABI: &str = r#"[{"type":"function","name":"getAllCampaigns","inputs":[],"outputs":[{"name":"","type":"address[]"}],"stateMutability":"view"}]"#;

    fn settings(optimize: bool) -> SolidityConfig {
        SolidityConfig {
            version: "0.8.21".to_string(),
            evm_version: "paris".to_string(),
            optimizer: OptimizerConfig { enabled: optimize, runs: 200 },
            solc: "solc".to_string(),
        }
    }

    #[test]
    fn args_carry_evm_target_and_optimizer() {
        let args = SolcCompiler::new(settings(true)).build_args(Path::new("contracts/CampaignFactory.sol"));
        assert_eq!(
            args,
            vec![
                "--combined-json",
                "abi,bin",
                "--evm-version",
                "paris",
                "--optimize",
                "--optimize-runs",
                "200",
                "contracts/CampaignFactory.sol"
            ]
        );
    }

    #[test]
    fn optimizer_flags_are_omitted_when_disabled() {
        let args = SolcCompiler::new(settings(false)).build_args(Path::new("a.sol"));
        assert!(!args.iter().any(|a| a.starts_with("--optimize")));
    }

    #[test]
    fn solc_version_is_extracted() {
        let output = "solc, the solidity compiler commandline interface\nVersion: 0.8.21+commit.d9974bed.Linux.g++\n";
        assert_eq!(parse_solc_version(output).as_deref(), Some("0.8.21"));
        assert_eq!(parse_solc_version("garbage"), None);
    }

    #[test]
    fn reads_combined_json_with_array_abi() {
        let content = format!(
            r#"{{"contracts":{{"contracts/CampaignFactory.sol:Campaign":{{"abi":[],"bin":"6001"}},"contracts/CampaignFactory.sol:CampaignFactory":{{"abi":{},"bin":"6080604052"}}}},"version":"0.8.21"}}"#,
            ABI
        );
        let compiled = parse_artifact(&content, "CampaignFactory").unwrap();
        assert!(compiled.abi.function("getAllCampaigns").is_ok());
        assert_eq!(compiled.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn reads_combined_json_with_string_abi() {
        let content = serde_json::json!({
            "contracts": {
                "CampaignFactory.sol:CampaignFactory": { "abi": ABI, "bin": "6080" }
            }
        })
        .to_string();
        let compiled = parse_artifact(&content, "CampaignFactory").unwrap();
        assert!(compiled.abi.function("getAllCampaigns").is_ok());
    }

    #[test]
    fn reads_hardhat_artifacts() {
        let content = format!(r#"{{"contractName":"CampaignFactory","abi":{},"bytecode":"0x6080"}}"#, ABI);
        let compiled = parse_artifact(&content, "CampaignFactory").unwrap();
        assert_eq!(compiled.bytecode.to_vec(), vec![0x60, 0x80]);
    }

    #[test]
    fn missing_contract_and_empty_bytecode_are_errors() {
        let content = r#"{"contracts":{"a.sol:Other":{"abi":[],"bin":"60"}}}"#;
        assert!(matches!(
            parse_artifact(content, "CampaignFactory"),
            Err(ContractError::DeployError(_))
        ));

        let content = r#"{"abi":[],"bytecode":"0x"}"#;
        assert!(matches!(
            parse_artifact(content, "CampaignFactory"),
            Err(ContractError::DeployError(_))
        ));
    }
}
