use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    abi::{Abi, Detokenize},
    contract::{Contract, ContractCall, ContractError as EthersContractError},
    providers::{Middleware, MiddlewareError, PendingTransaction, RpcError},
    types::{Address, U256},
};
use tracing::{debug, info, warn};

use crate::domain::models::{CampaignDetails, Confirmation};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::gateway::{
    CampaignFactoryGateway, CampaignGateway, GuestbookGateway, PendingWrite, TransactionWaiter,
};
use crate::infrastructure::contracts::types::ChainConfig;

/// EIP-1193 "user rejected the request".
const USER_REJECTED_CODE: i64 = 4001;

/// How writes are sent and awaited on one chain.
#[derive(Debug, Clone)]
pub struct TxSettings {
    /// Sender for node-signed transactions. `None` lets the middleware fill it in.
    pub from: Option<Address>,
    pub confirmations: usize,
    pub poll_interval: Duration,
}

impl TxSettings {
    pub fn for_chain(chain: &ChainConfig, from: Option<Address>) -> Self {
        Self {
            from,
            confirmations: chain.confirmations.max(1),
            poll_interval: Duration::from_millis(chain.poll_interval_ms),
        }
    }
}

// ============ SHARED CALL PLUMBING ============

/// A bound contract plus the client it talks through.
struct Bound<M> {
    client: Arc<M>,
    contract: Contract<M>,
    settings: TxSettings,
}

impl<M: Middleware + 'static> Bound<M> {
    fn new(address: Address, abi: Abi, client: Arc<M>, settings: TxSettings) -> Self {
        let contract = Contract::new(address, abi, client.clone());
        Self { client, contract, settings }
    }

    fn call<T: Detokenize>(&self, method: &str, args: impl ethers::abi::Tokenize) -> Result<ContractCall<M, T>, ContractError> {
        let call = self.contract.method::<_, T>(method, args)?;
        Ok(match self.settings.from {
            Some(from) => call.from(from),
            None => call,
        })
    }

    async fn read<T: Detokenize + Send>(&self, call: ContractCall<M, T>, method: &str) -> Result<T, ContractError> {
        call.call().await.map_err(|e| {
            warn!("Read call {} on {:?} failed: {}", method, self.contract.address(), e);
            ContractError::RpcError(e.to_string())
        })
    }

    async fn send<T: Detokenize + Send>(&self, call: ContractCall<M, T>, method: &str) -> Result<PendingWrite, ContractError> {
        let pending = call.send().await.map_err(|e| map_send_error(e, method))?;
        let tx_hash = pending.tx_hash();

        info!("Submitted {} to {:?}: {:?}", method, self.contract.address(), tx_hash);
        Ok(PendingWrite {
            tx_hash,
            method: method.to_string(),
        })
    }

    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        debug!("Waiting for {} ({:?})", pending.method, pending.tx_hash);

        // Wait for confirmation
        let receipt = PendingTransaction::new(pending.tx_hash, self.client.provider())
            .interval(self.settings.poll_interval)
            .confirmations(self.settings.confirmations)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?
            .ok_or_else(|| ContractError::RpcError(format!("Transaction {:?} was dropped", pending.tx_hash)))?;

        // Check if transaction was successful
        if receipt.status == Some(0u64.into()) {
            warn!("{} reverted in block {:?}", pending.method, receipt.block_number);
            return Err(ContractError::TransactionReverted {
                reason: format!("{} ({:?}) reverted", pending.method, pending.tx_hash),
            });
        }

        let block_number = receipt.block_number.unwrap_or_default().as_u64();
        info!("{} confirmed in block {}", pending.method, block_number);

        Ok(Confirmation {
            transaction_hash: receipt.transaction_hash,
            block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// Classify a failed submission. Reverts caught during gas estimation are
/// reverts; a wallet refusing to sign is a rejection; the rest is RPC trouble.
fn map_send_error<M: Middleware>(err: EthersContractError<M>, method: &str) -> ContractError {
    let response = match &err {
        EthersContractError::MiddlewareError { e } => MiddlewareError::as_error_response(e),
        EthersContractError::ProviderError { e } => RpcError::as_error_response(e),
        _ => None,
    };

    if let Some(response) = response {
        if response.code == USER_REJECTED_CODE {
            return ContractError::UserRejected {
                reason: response.message.clone(),
            };
        }
    }

    if err.is_revert() {
        return ContractError::TransactionReverted {
            reason: format!("{}: {}", method, err),
        };
    }

    ContractError::RpcError(format!("{}: {}", method, err))
}

// ============ GUESTBOOK ============

/// Guestbook bound through an `ethers` middleware.
pub struct EthersGuestbook<M> {
    inner: Bound<M>,
}

impl<M: Middleware + 'static> EthersGuestbook<M> {
    pub fn new(address: Address, abi: Abi, client: Arc<M>, settings: TxSettings) -> Self {
        Self {
            inner: Bound::new(address, abi, client, settings),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> TransactionWaiter for EthersGuestbook<M> {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.inner.wait(pending).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> GuestbookGateway for EthersGuestbook<M> {
    fn address(&self) -> Address {
        self.inner.contract.address()
    }

    async fn get_messages(&self) -> Result<Vec<String>, ContractError> {
        let call = self.inner.call::<Vec<String>>("getMessages", ())?;
        self.inner.read(call, "getMessages").await
    }

    async fn add_message(&self, message: &str) -> Result<PendingWrite, ContractError> {
        let call = self.inner.call::<()>("addMessage", (message.to_string(),))?;
        self.inner.send(call, "addMessage").await
    }
}

// ============ CAMPAIGN FACTORY ============

/// CampaignFactory bound through an `ethers` middleware.
pub struct EthersCampaignFactory<M> {
    inner: Bound<M>,
    campaign_abi: Abi,
}

impl<M: Middleware + 'static> EthersCampaignFactory<M> {
    pub fn new(address: Address, abis: &AbiSource, client: Arc<M>, settings: TxSettings) -> Result<Self, ContractError> {
        Ok(Self {
            inner: Bound::new(address, abis.campaign_factory()?, client, settings),
            campaign_abi: abis.campaign()?,
        })
    }
}

#[async_trait]
impl<M: Middleware + 'static> TransactionWaiter for EthersCampaignFactory<M> {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.inner.wait(pending).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> CampaignFactoryGateway for EthersCampaignFactory<M> {
    fn address(&self) -> Address {
        self.inner.contract.address()
    }

    async fn get_all_campaigns(&self) -> Result<Vec<Address>, ContractError> {
        let call = self.inner.call::<Vec<Address>>("getAllCampaigns", ())?;
        self.inner.read(call, "getAllCampaigns").await
    }

    async fn create_campaign(&self, title: &str, description: &str, goal: U256) -> Result<PendingWrite, ContractError> {
        let call = self
            .inner
            .call::<()>("createCampaign", (title.to_string(), description.to_string(), goal))?;
        self.inner.send(call, "createCampaign").await
    }

    fn campaign(&self, address: Address) -> Result<Arc<dyn CampaignGateway>, ContractError> {
        Ok(Arc::new(EthersCampaign {
            inner: Bound::new(
                address,
                self.campaign_abi.clone(),
                self.inner.client.clone(),
                self.inner.settings.clone(),
            ),
        }))
    }
}

// ============ CAMPAIGN ============

/// One Campaign contract bound through an `ethers` middleware.
pub struct EthersCampaign<M> {
    inner: Bound<M>,
}

#[async_trait]
impl<M: Middleware + 'static> TransactionWaiter for EthersCampaign<M> {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.inner.wait(pending).await
    }
}

#[async_trait]
impl<M: Middleware + 'static> CampaignGateway for EthersCampaign<M> {
    fn address(&self) -> Address {
        self.inner.contract.address()
    }

    async fn details(&self) -> Result<CampaignDetails, ContractError> {
        let title = self.inner.call::<String>("title", ())?;
        let description = self.inner.call::<String>("description", ())?;
        let goal = self.inner.call::<U256>("goal", ())?;
        let raised = self.inner.call::<U256>("raisedAmount", ())?;

        // The four view calls are independent, issue them together
        let (title, description, goal, raised) = futures::try_join!(
            self.inner.read(title, "title"),
            self.inner.read(description, "description"),
            self.inner.read(goal, "goal"),
            self.inner.read(raised, "raisedAmount"),
        )?;

        Ok(CampaignDetails {
            title,
            description,
            goal,
            raised,
        })
    }

    async fn contribute(&self, value: U256) -> Result<PendingWrite, ContractError> {
        let call = self.inner.call::<()>("contribute", ())?.value(value);
        self.inner.send(call, "contribute").await
    }
}
