use std::sync::Arc;

use ethers::types::Address;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::application::services::begin_action;
use crate::domain::models::{Confirmation, GuestbookView, Message};
use crate::domain::services::ContractError;
use crate::domain::validation::Validator;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::gateway::GuestbookGateway;
use crate::infrastructure::wallet::{WalletProvider, WalletSession};

#[derive(Clone)]
struct Connection {
    session: WalletSession,
    guestbook: Arc<dyn GuestbookGateway>,
}

/// Guestbook page state: one connected account, its balance and the full
/// message list. Every write is followed by a single re-fetch of the list.
pub struct GuestbookService {
    address: Address,
    abis: AbiSource,
    connection: RwLock<Option<Connection>>,
    view: RwLock<GuestbookView>,
    busy: Mutex<()>,
}

impl GuestbookService {
    pub fn new(address: Address, abis: AbiSource) -> Self {
        Self {
            address,
            abis,
            connection: RwLock::new(None),
            view: RwLock::new(GuestbookView::default()),
            busy: Mutex::new(()),
        }
    }

    /// Connect to the wallet and load balance and messages. Calling this again
    /// replaces the session and gateway.
    pub async fn connect(&self, provider: Option<Arc<dyn WalletProvider>>) -> Result<GuestbookView, ContractError> {
        let session = WalletSession::connect(provider).await?;
        let guestbook = session.guestbook(self.address, &self.abis)?;
        let account = session.account();

        *self.connection.write().await = Some(Connection { session, guestbook });
        {
            let mut view = self.view.write().await;
            *view = GuestbookView {
                account: Some(account),
                ..GuestbookView::default()
            };
        }

        self.refresh().await?;
        Ok(self.view().await)
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    pub async fn view(&self) -> GuestbookView {
        self.view.read().await.clone()
    }

    pub async fn set_draft(&self, draft: impl Into<String>) {
        self.view.write().await.draft = draft.into();
    }

    /// Re-read balance and messages.
    pub async fn refresh(&self) -> Result<(), ContractError> {
        let connection = self.connection().await?;
        let (balance, messages) = futures::try_join!(
            connection.session.balance(),
            connection.guestbook.get_messages()
        )?;

        debug!("Loaded {} guestbook messages", messages.len());
        let mut view = self.view.write().await;
        view.balance = Some(balance);
        view.messages = messages.into_iter().map(Message::from).collect();
        Ok(())
    }

    /// Send the current draft.
    pub async fn submit_draft(&self) -> Result<Confirmation, ContractError> {
        let draft = self.view.read().await.draft.clone();
        self.submit_message(&draft).await
    }

    /// Append `text` to the guestbook and wait for it to be mined. Once mined
    /// the list is re-fetched once and the draft cleared; a failed send or
    /// wait leaves the view as it was.
    pub async fn submit_message(&self, text: &str) -> Result<Confirmation, ContractError> {
        let connection = self.connection().await?;
        let text = Validator::require_text(text, "message")?;
        let _guard = begin_action(&self.busy, "addMessage")?;

        let pending = connection.guestbook.add_message(text).await?;
        let confirmation = connection.guestbook.wait(&pending).await.map_err(|e| {
            warn!("addMessage {:?} failed: {}", pending.tx_hash, e);
            e
        })?;

        let refetched = futures::try_join!(
            connection.session.balance(),
            connection.guestbook.get_messages()
        );

        // the message is on chain either way; a failed refetch keeps the old list
        let mut view = self.view.write().await;
        view.draft.clear();
        match refetched {
            Ok((balance, messages)) => {
                view.balance = Some(balance);
                view.messages = messages.into_iter().map(Message::from).collect();
                info!(
                    "Message confirmed in block {}, guestbook now holds {} entries",
                    confirmation.block_number,
                    view.messages.len()
                );
            }
            Err(e) => warn!(
                "Message confirmed in block {} but reloading the guestbook failed: {}",
                confirmation.block_number, e
            ),
        }
        Ok(confirmation)
    }

    async fn connection(&self) -> Result<Connection, ContractError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(ContractError::WalletNotConnected)
    }
}
