use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

use crate::domain::models::{CampaignDetails, Confirmation};
use crate::domain::services::ContractError;

/// A submitted write whose inclusion has not been awaited yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub tx_hash: H256,
    pub method: String,
}

/// Suspends until a submitted write is mined.
#[async_trait]
pub trait TransactionWaiter: Send + Sync {
    /// Resolves once the transaction is included. A receipt with status 0
    /// is `TransactionReverted`; a dropped transaction is `RpcError`.
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError>;
}

/// Guestbook contract: an append-only list of strings.
#[async_trait]
pub trait GuestbookGateway: TransactionWaiter {
    fn address(&self) -> Address;

    async fn get_messages(&self) -> Result<Vec<String>, ContractError>;

    async fn add_message(&self, message: &str) -> Result<PendingWrite, ContractError>;
}

/// CampaignFactory contract: creates campaigns and lists their addresses.
#[async_trait]
pub trait CampaignFactoryGateway: TransactionWaiter {
    fn address(&self) -> Address;

    async fn get_all_campaigns(&self) -> Result<Vec<Address>, ContractError>;

    async fn create_campaign(
        &self,
        title: &str,
        description: &str,
        goal: U256,
    ) -> Result<PendingWrite, ContractError>;

    /// Bind a gateway to one campaign, using the same signer-or-reader.
    fn campaign(&self, address: Address) -> Result<Arc<dyn CampaignGateway>, ContractError>;
}

/// One Campaign contract.
#[async_trait]
pub trait CampaignGateway: TransactionWaiter {
    fn address(&self) -> Address;

    async fn details(&self) -> Result<CampaignDetails, ContractError>;

    async fn contribute(&self, value: U256) -> Result<PendingWrite, ContractError>;
}
