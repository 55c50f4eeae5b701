use std::sync::Arc;

use ethers::types::Address;
use tracing::info;

use crate::domain::models::Balance;
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::gateway::{CampaignFactoryGateway, GuestbookGateway};
use crate::infrastructure::contracts::types::ChainConfig;
use crate::infrastructure::wallet::provider::WalletProvider;

/// An authorized connection to one account of a wallet provider.
///
/// A session only exists after a successful connect, so holding one means
/// the account is known and gateways may sign as it.
#[derive(Clone)]
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    account: Address,
}

impl WalletSession {
    /// Request account access. Fails with `ProviderUnavailable` when there is
    /// no provider and `UserRejected` when access is refused.
    pub async fn connect(provider: Option<Arc<dyn WalletProvider>>) -> Result<Self, ContractError> {
        let provider = provider.ok_or(ContractError::ProviderUnavailable)?;

        let accounts = provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or_else(|| ContractError::UserRejected {
            reason: "no account was shared".to_string(),
        })?;

        info!("Connected {:?} on {}", account, provider.chain().name);
        Ok(Self { provider, account })
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain(&self) -> &ChainConfig {
        self.provider.chain()
    }

    /// Current native balance. Always asks the node.
    pub async fn balance(&self) -> Result<Balance, ContractError> {
        let wei = self.provider.get_balance(self.account).await?;
        Ok(Balance::from_wei(wei))
    }

    pub fn guestbook(&self, address: Address, abis: &AbiSource) -> Result<Arc<dyn GuestbookGateway>, ContractError> {
        self.provider.bind_guestbook(address, self.account, abis)
    }

    pub fn campaign_factory(
        &self,
        address: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn CampaignFactoryGateway>, ContractError> {
        self.provider.bind_campaign_factory(address, self.account, abis)
    }
}
