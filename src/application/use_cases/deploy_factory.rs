use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::addresses::{save_deployed_address, CAMPAIGN_FACTORY};
use crate::infrastructure::deploy::{load_artifact, ContractDeployer, DeployConfig, Deployment, SolcCompiler};

/// Outcome of one deploy run.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub network: String,
    pub deployment: Deployment,
    pub record: PathBuf,
}

/// Compile and deploy one `CampaignFactory`, then record its address for the
/// clients. Every run deploys a fresh instance.
pub struct DeployFactoryUseCase {
    config: DeployConfig,
    /// Directory the configured paths are relative to.
    root: PathBuf,
    network: Option<String>,
    skip_compile: bool,
}

impl DeployFactoryUseCase {
    pub fn new(config: DeployConfig, root: PathBuf, network: Option<String>, skip_compile: bool) -> Self {
        Self {
            config,
            root,
            network,
            skip_compile,
        }
    }

    pub async fn execute(&self) -> Result<DeployOutcome, ContractError> {
        let (network_name, network) = self.config.network(self.network.as_deref())?;
        info!("Deploying {} to {} (chain {})", CAMPAIGN_FACTORY, network_name, network.chain_id);

        let private_key = std::env::var(&network.private_key_env).map_err(|_| {
            ContractError::ConfigError(format!(
                "Set {} to the deployer's private key for network {}",
                network.private_key_env, network_name
            ))
        })?;

        let artifact = if self.skip_compile {
            self.existing_artifact()?
        } else {
            let source = self.resolve(&self.config.paths.sources).join(format!("{}.sol", CAMPAIGN_FACTORY));
            SolcCompiler::new(self.config.solidity.clone())
                .compile(&source, &self.resolve(&self.config.paths.artifacts))
                .await?
        };
        let compiled = load_artifact(&artifact, CAMPAIGN_FACTORY)?;

        let deployer = ContractDeployer::for_network(network, &private_key)?;
        deployer.check_chain(network.chain_id).await?;
        info!("Deployer account {:?}", deployer.deployer_address());

        let deployment = deployer.deploy(&compiled).await?;
        let record = save_deployed_address(
            &self.resolve(&self.config.paths.deployments),
            network_name,
            CAMPAIGN_FACTORY,
            deployment.address,
        )?;
        info!("Recorded {} address in {}", CAMPAIGN_FACTORY, record.display());

        Ok(DeployOutcome {
            network: network_name.to_string(),
            deployment,
            record,
        })
    }

    /// Artifact left by an earlier build: our own combined JSON first, then
    /// the Hardhat layout.
    pub fn existing_artifact(&self) -> Result<PathBuf, ContractError> {
        let artifacts = self.resolve(&self.config.paths.artifacts);
        let candidates = [
            artifacts.join(format!("{}.combined.json", CAMPAIGN_FACTORY)),
            artifacts
                .join("contracts")
                .join(format!("{}.sol", CAMPAIGN_FACTORY))
                .join(format!("{}.json", CAMPAIGN_FACTORY)),
        ];

        candidates.iter().find(|p| p.is_file()).cloned().ok_or_else(|| {
            ContractError::DeployError(format!(
                "No {} artifact under {}; run without --skip-compile",
                CAMPAIGN_FACTORY,
                artifacts.display()
            ))
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
