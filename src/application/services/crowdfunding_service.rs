use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::Address;
use futures::future::try_join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::application::services::begin_action;
use crate::domain::models::{CampaignCard, CampaignDetails, Confirmation, CreateCampaignRequest, CrowdfundView};
use crate::domain::services::ContractError;
use crate::domain::validation::Validator;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::gateway::CampaignFactoryGateway;
use crate::infrastructure::wallet::{WalletProvider, WalletSession};

#[derive(Clone)]
struct Connection {
    session: WalletSession,
    factory: Arc<dyn CampaignFactoryGateway>,
}

/// Crowdfunding page state: the campaign list from the factory plus lazily
/// loaded details for each card.
pub struct CrowdfundingService {
    factory_address: Address,
    abis: AbiSource,
    connection: RwLock<Option<Connection>>,
    view: RwLock<CrowdfundView>,
    busy: Mutex<()>,
}

impl CrowdfundingService {
    pub fn new(factory_address: Address, abis: AbiSource) -> Self {
        Self {
            factory_address,
            abis,
            connection: RwLock::new(None),
            view: RwLock::new(CrowdfundView::default()),
            busy: Mutex::new(()),
        }
    }

    /// Connect to the wallet and load the campaign list. Details are not
    /// fetched here.
    pub async fn connect(&self, provider: Option<Arc<dyn WalletProvider>>) -> Result<CrowdfundView, ContractError> {
        let session = WalletSession::connect(provider).await?;
        let factory = session.campaign_factory(self.factory_address, &self.abis)?;
        let account = session.account();

        *self.connection.write().await = Some(Connection { session, factory });
        *self.view.write().await = CrowdfundView {
            account: Some(account),
            campaigns: Vec::new(),
        };

        self.load_campaigns().await?;
        Ok(self.view().await)
    }

    pub async fn view(&self) -> CrowdfundView {
        self.view.read().await.clone()
    }

    /// Re-read the campaign list. Cards already on the page keep their details.
    pub async fn load_campaigns(&self) -> Result<Vec<Address>, ContractError> {
        let connection = self.connection().await?;
        let addresses = connection.factory.get_all_campaigns().await?;
        debug!("Factory lists {} campaigns", addresses.len());

        let mut view = self.view.write().await;
        let mut known: HashMap<Address, Option<CampaignDetails>> =
            view.campaigns.drain(..).map(|c| (c.address, c.details)).collect();
        view.campaigns = addresses
            .iter()
            .map(|address| CampaignCard {
                address: *address,
                details: known.remove(address).flatten(),
            })
            .collect();

        Ok(addresses)
    }

    /// Fetch one campaign's fields and store them on its card.
    pub async fn load_details(&self, campaign: Address) -> Result<CampaignDetails, ContractError> {
        let connection = self.connection().await?;
        let details = connection.factory.campaign(campaign)?.details().await?;
        self.store_details(campaign, details.clone()).await;
        Ok(details)
    }

    /// Fetch details for every card at once.
    pub async fn load_all_details(&self) -> Result<CrowdfundView, ContractError> {
        let connection = self.connection().await?;
        let addresses: Vec<Address> = self.view.read().await.campaigns.iter().map(|c| c.address).collect();

        let lookups = addresses.iter().map(|address| {
            let factory = connection.factory.clone();
            let address = *address;
            async move {
                let details = factory.campaign(address)?.details().await?;
                Ok::<_, ContractError>((address, details))
            }
        });
        let loaded = try_join_all(lookups).await?;

        for (address, details) in loaded {
            self.store_details(address, details).await;
        }
        Ok(self.view().await)
    }

    /// Open a new campaign. After confirmation the list is re-fetched once; if
    /// that read fails the previous list stays and the write still succeeds.
    pub async fn create_campaign(&self, request: CreateCampaignRequest) -> Result<Confirmation, ContractError> {
        let connection = self.connection().await?;
        let title = Validator::require_text(&request.title, "title")?;
        let description = Validator::require_text(&request.description, "description")?;
        let goal = Validator::parse_amount(&request.goal, "goal")?;
        let _guard = begin_action(&self.busy, "createCampaign")?;

        let pending = connection.factory.create_campaign(title, description, goal).await?;
        let confirmation = connection.factory.wait(&pending).await?;

        match self.load_campaigns().await {
            Ok(addresses) => info!(
                "Campaign {:?} created in block {}, {} campaigns listed",
                title,
                confirmation.block_number,
                addresses.len()
            ),
            Err(e) => warn!(
                "Campaign {:?} created in block {} but reloading the list failed: {}",
                title, confirmation.block_number, e
            ),
        }
        Ok(confirmation)
    }

    /// Send `amount` (whole units) to a campaign. After confirmation that
    /// campaign's details are re-fetched once.
    pub async fn contribute(&self, campaign: Address, amount: &str) -> Result<Confirmation, ContractError> {
        let connection = self.connection().await?;
        let value = Validator::parse_amount(amount, "amount")?;
        let _guard = begin_action(&self.busy, "contribute")?;

        let gateway = connection.factory.campaign(campaign)?;
        let pending = gateway.contribute(value).await?;
        let confirmation = gateway.wait(&pending).await?;

        match gateway.details().await {
            Ok(details) => {
                info!(
                    "Contribution to {:?} confirmed in block {}, raised {}",
                    campaign,
                    confirmation.block_number,
                    details.raised_formatted()
                );
                self.store_details(campaign, details).await;
            }
            Err(e) => warn!(
                "Contribution to {:?} confirmed in block {} but reloading it failed: {}",
                campaign, confirmation.block_number, e
            ),
        }
        Ok(confirmation)
    }

    async fn store_details(&self, campaign: Address, details: CampaignDetails) {
        let mut view = self.view.write().await;
        if let Some(card) = view.campaigns.iter_mut().find(|c| c.address == campaign) {
            card.details = Some(details);
        }
    }

    async fn connection(&self) -> Result<Connection, ContractError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(ContractError::WalletNotConnected)
    }
}
