use std::sync::Arc;

use crate::application::services::{CrowdfundingService, GuestbookService};
use crate::domain::models::{CrowdfundView, GuestbookView};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::types::ChainConfig;
use crate::infrastructure::wallet::{discover_provider_with, AccountApproval, WalletProvider};

/// Finds a wallet provider for the chain and connects a page service with it.
pub struct ConnectWalletUseCase {
    chain: ChainConfig,
    private_key: Option<String>,
    approval: Arc<dyn AccountApproval>,
}

impl ConnectWalletUseCase {
    pub fn new(chain: ChainConfig, private_key: Option<String>, approval: Arc<dyn AccountApproval>) -> Self {
        Self {
            chain,
            private_key,
            approval,
        }
    }

    /// Key taken from `PRIVATE_KEY`.
    pub fn from_env(chain: ChainConfig, approval: Arc<dyn AccountApproval>) -> Self {
        Self::new(chain, std::env::var("PRIVATE_KEY").ok(), approval)
    }

    /// `None` when nothing can sign on this chain.
    pub fn provider(&self) -> Result<Option<Arc<dyn WalletProvider>>, ContractError> {
        discover_provider_with(&self.chain, self.private_key.clone(), self.approval.clone())
    }

    pub async fn connect_guestbook(&self, service: &GuestbookService) -> Result<GuestbookView, ContractError> {
        service.connect(self.provider()?).await
    }

    pub async fn connect_crowdfunding(&self, service: &CrowdfundingService) -> Result<CrowdfundView, ContractError> {
        service.connect(self.provider()?).await
    }
}
