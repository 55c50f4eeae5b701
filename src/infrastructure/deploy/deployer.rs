use std::sync::Arc;
use std::time::Duration;

use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256},
};
use tracing::{debug, info};

use crate::domain::services::ContractError;
use crate::infrastructure::deploy::compiler::CompiledContract;
use crate::infrastructure::deploy::config::NetworkEntry;

/// Result of a confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
}

/// Sends creation transactions for compiled contracts.
pub struct ContractDeployer<M> {
    client: Arc<M>,
    confirmations: usize,
}

impl ContractDeployer<SignerMiddleware<Provider<Http>, LocalWallet>> {
    /// Deployer signing with `private_key` against `network`.
    pub fn for_network(network: &NetworkEntry, private_key: &str) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(network.url.as_str())
            .map_err(|e| ContractError::ConfigError(format!("Invalid RPC URL {}: {}", network.url, e)))?
            .interval(Duration::from_millis(1000));

        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ContractError::ConfigError(format!("Invalid private key: {}", e)))?
            .with_chain_id(network.chain_id);

        Ok(Self::new(Arc::new(SignerMiddleware::new(provider, wallet)), 1))
    }

    pub fn deployer_address(&self) -> Address {
        self.client.signer().address()
    }
}

impl<M: Middleware + 'static> ContractDeployer<M> {
    pub fn new(client: Arc<M>, confirmations: usize) -> Self {
        Self {
            client,
            confirmations: confirmations.max(1),
        }
    }

    /// Fail early when the node is on a different chain than configured.
    pub async fn check_chain(&self, expected: u64) -> Result<(), ContractError> {
        let actual = self
            .client
            .get_chainid()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        if actual.as_u64() != expected {
            return Err(ContractError::DeployError(format!(
                "Node reports chain {} but the network is configured for {}",
                actual, expected
            )));
        }
        Ok(())
    }

    /// Deploy `compiled` with no constructor arguments and wait for the receipt.
    pub async fn deploy(&self, compiled: &CompiledContract) -> Result<Deployment, ContractError> {
        let factory = ContractFactory::new(compiled.abi.clone(), compiled.bytecode.clone(), self.client.clone());

        let deployer = factory
            .deploy(())
            .map_err(|e| ContractError::DeployError(format!("{}: {}", compiled.name, e)))?
            .confirmations(self.confirmations);

        debug!("Sending creation transaction for {}", compiled.name);
        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .map_err(|e| ContractError::DeployError(format!("{}: {}", compiled.name, e)))?;

        if receipt.status == Some(0u64.into()) {
            return Err(ContractError::TransactionReverted {
                reason: format!("{} creation ({:?}) reverted", compiled.name, receipt.transaction_hash),
            });
        }

        let address = contract.address();
        info!("{} deployed at {:?} in tx {:?}", compiled.name, address, receipt.transaction_hash);

        Ok(Deployment {
            contract_name: compiled.name.clone(),
            address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn network(url: &str) -> NetworkEntry {
        NetworkEntry {
            url: url.to_string(),
            chain_id: 31337,
            private_key_env: "PRIVATE_KEY".to_string(),
        }
    }

    #[test]
    fn signer_uses_the_configured_key() {
        let deployer = ContractDeployer::for_network(&network("http://localhost:8545"), DEV_KEY).unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(deployer.deployer_address(), expected);
    }

    #[test]
    fn bad_key_is_rejected_before_any_network_call() {
        let result = ContractDeployer::for_network(&network("http://localhost:8545"), "not-a-key");
        assert!(matches!(result, Err(ContractError::ConfigError(_))));
    }
}
