//! In-memory wallet and contracts for driving the page services without a node.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use tokio::sync::Notify;

use crate::domain::models::{CampaignDetails, Confirmation};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::config::{get_chain_config_by_id, HARDHAT_CHAIN_ID};
use crate::infrastructure::contracts::gateway::{
    CampaignFactoryGateway, CampaignGateway, GuestbookGateway, PendingWrite, TransactionWaiter,
};
use crate::infrastructure::contracts::types::ChainConfig;
use crate::infrastructure::wallet::WalletProvider;

/// Wei charged for every confirmed write.
pub const GAS_COST: u64 = 21_000_000_000_000;

pub fn account() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
}

pub fn guestbook_address() -> Address {
    Address::from_low_u64_be(0x6b00)
}

pub fn factory_address() -> Address {
    Address::from_low_u64_be(0xfac7)
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

/// How many times each contract or wallet call was made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub request_accounts: usize,
    pub get_balance: usize,
    pub get_messages: usize,
    pub add_message: usize,
    pub get_all_campaigns: usize,
    pub create_campaign: usize,
    pub details: HashMap<Address, usize>,
    pub contribute: usize,
    pub waits: usize,
}

impl CallCounts {
    pub fn details_of(&self, campaign: Address) -> usize {
        self.details.get(&campaign).copied().unwrap_or(0)
    }

    /// Calls that reach the node.
    pub fn network_calls(&self) -> usize {
        self.request_accounts
            + self.get_balance
            + self.get_messages
            + self.add_message
            + self.get_all_campaigns
            + self.create_campaign
            + self.details.values().sum::<usize>()
            + self.contribute
            + self.waits
    }
}

enum Effect {
    AddMessage(String),
    CreateCampaign(CampaignDetails),
    Contribute(Address, U256),
}

#[derive(Default)]
struct ChainState {
    balance: U256,
    messages: Vec<String>,
    campaigns: Vec<(Address, CampaignDetails)>,
    pending: HashMap<H256, Effect>,
    next_tx: u64,
    block: u64,
    revert_writes: bool,
    /// Set by a confirmation when reads should start failing afterwards.
    fail_reads_after_confirm: bool,
    reads_failing: bool,
    calls: CallCounts,
}

impl ChainState {
    fn check_read(&self) -> Result<(), ContractError> {
        if self.reads_failing {
            return Err(ContractError::RpcError("connection reset".to_string()));
        }
        Ok(())
    }

    fn submit(&mut self, effect: Effect, method: &str) -> PendingWrite {
        self.next_tx += 1;
        let tx_hash = H256::from_low_u64_be(self.next_tx);
        self.pending.insert(tx_hash, effect);
        PendingWrite {
            tx_hash,
            method: method.to_string(),
        }
    }
}

/// Shared ledger behind the fake provider and gateways.
pub struct FakeChain {
    state: Mutex<ChainState>,
    /// When set, confirmations wait until the gate is notified.
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeChain {
    pub fn new(balance: U256) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChainState {
                balance,
                ..ChainState::default()
            }),
            gate: Mutex::new(None),
        })
    }

    pub fn with_messages(self: &Arc<Self>, messages: &[&str]) -> Arc<Self> {
        self.state.lock().unwrap().messages = messages.iter().map(|m| m.to_string()).collect();
        self.clone()
    }

    /// Add an existing campaign and return its address.
    pub fn add_campaign(&self, title: &str, goal: U256, raised: U256) -> Address {
        let mut state = self.state.lock().unwrap();
        let address = Address::from_low_u64_be(0xc000 + state.campaigns.len() as u64);
        state.campaigns.push((
            address,
            CampaignDetails {
                title: title.to_string(),
                description: format!("{} description", title),
                goal,
                raised,
            },
        ));
        address
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn set_revert_writes(&self, revert: bool) {
        self.state.lock().unwrap().revert_writes = revert;
    }

    /// Every read made after the next confirmation fails with `RpcError`.
    pub fn fail_reads_after_confirmation(&self) {
        self.state.lock().unwrap().fail_reads_after_confirm = true;
    }

    /// Hold every confirmation until the returned handle is notified.
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ChainState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    async fn confirm(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.with_state(|state| -> Result<Confirmation, ContractError> {
            state.calls.waits += 1;
            let effect = state
                .pending
                .remove(&pending.tx_hash)
                .ok_or_else(|| ContractError::RpcError(format!("unknown transaction {:?}", pending.tx_hash)))?;

            state.block += 1;
            state.reads_failing = state.fail_reads_after_confirm;
            state.balance = state.balance.saturating_sub(U256::from(GAS_COST));
            if state.revert_writes {
                return Err(ContractError::TransactionReverted {
                    reason: format!("{} reverted", pending.method),
                });
            }

            match effect {
                Effect::AddMessage(text) => state.messages.push(text),
                Effect::CreateCampaign(details) => {
                    let address = Address::from_low_u64_be(0xc000 + state.campaigns.len() as u64);
                    state.campaigns.push((address, details));
                }
                Effect::Contribute(campaign, value) => {
                    let (_, details) = state
                        .campaigns
                        .iter_mut()
                        .find(|(a, _)| *a == campaign)
                        .ok_or_else(|| ContractError::TransactionReverted {
                            reason: "no contract at address".to_string(),
                        })?;
                    details.raised += value;
                    state.balance = state.balance.saturating_sub(value);
                }
            }

            Ok(Confirmation {
                transaction_hash: pending.tx_hash,
                block_number: state.block,
                gas_used: Some(U256::from(21_000u64)),
            })
        })
    }
}

/// Wallet provider over a [`FakeChain`].
pub struct FakeProvider {
    chain: Arc<FakeChain>,
    config: ChainConfig,
    approve: bool,
}

impl FakeProvider {
    pub fn new(chain: Arc<FakeChain>) -> Arc<dyn WalletProvider> {
        Arc::new(Self {
            chain,
            config: get_chain_config_by_id(HARDHAT_CHAIN_ID).unwrap(),
            approve: true,
        })
    }

    /// A provider whose user declines account access.
    pub fn declining(chain: Arc<FakeChain>) -> Arc<dyn WalletProvider> {
        Arc::new(Self {
            chain,
            config: get_chain_config_by_id(HARDHAT_CHAIN_ID).unwrap(),
            approve: false,
        })
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    fn chain(&self) -> &ChainConfig {
        &self.config
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ContractError> {
        self.chain.with_state(|s| s.calls.request_accounts += 1);
        if !self.approve {
            return Err(ContractError::UserRejected {
                reason: "declined".to_string(),
            });
        }
        Ok(vec![account()])
    }

    async fn get_balance(&self, _account: Address) -> Result<U256, ContractError> {
        self.chain.with_state(|s| -> Result<U256, ContractError> {
            s.calls.get_balance += 1;
            s.check_read()?;
            Ok(s.balance)
        })
    }

    fn bind_guestbook(
        &self,
        _address: Address,
        _account: Address,
        _abis: &AbiSource,
    ) -> Result<Arc<dyn GuestbookGateway>, ContractError> {
        Ok(Arc::new(FakeGuestbook {
            chain: self.chain.clone(),
        }))
    }

    fn bind_campaign_factory(
        &self,
        _address: Address,
        _account: Address,
        _abis: &AbiSource,
    ) -> Result<Arc<dyn CampaignFactoryGateway>, ContractError> {
        Ok(Arc::new(FakeFactory {
            chain: self.chain.clone(),
        }))
    }
}

struct FakeGuestbook {
    chain: Arc<FakeChain>,
}

#[async_trait]
impl TransactionWaiter for FakeGuestbook {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.chain.confirm(pending).await
    }
}

#[async_trait]
impl GuestbookGateway for FakeGuestbook {
    fn address(&self) -> Address {
        guestbook_address()
    }

    async fn get_messages(&self) -> Result<Vec<String>, ContractError> {
        self.chain.with_state(|s| -> Result<Vec<String>, ContractError> {
            s.calls.get_messages += 1;
            s.check_read()?;
            Ok(s.messages.clone())
        })
    }

    async fn add_message(&self, message: &str) -> Result<PendingWrite, ContractError> {
        Ok(self.chain.with_state(|s| {
            s.calls.add_message += 1;
            s.submit(Effect::AddMessage(message.to_string()), "addMessage")
        }))
    }
}

struct FakeFactory {
    chain: Arc<FakeChain>,
}

#[async_trait]
impl TransactionWaiter for FakeFactory {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.chain.confirm(pending).await
    }
}

#[async_trait]
impl CampaignFactoryGateway for FakeFactory {
    fn address(&self) -> Address {
        factory_address()
    }

    async fn get_all_campaigns(&self) -> Result<Vec<Address>, ContractError> {
        self.chain.with_state(|s| -> Result<Vec<Address>, ContractError> {
            s.calls.get_all_campaigns += 1;
            s.check_read()?;
            Ok(s.campaigns.iter().map(|(a, _)| *a).collect())
        })
    }

    async fn create_campaign(&self, title: &str, description: &str, goal: U256) -> Result<PendingWrite, ContractError> {
        let details = CampaignDetails {
            title: title.to_string(),
            description: description.to_string(),
            goal,
            raised: U256::zero(),
        };
        Ok(self.chain.with_state(|s| {
            s.calls.create_campaign += 1;
            s.submit(Effect::CreateCampaign(details), "createCampaign")
        }))
    }

    fn campaign(&self, address: Address) -> Result<Arc<dyn CampaignGateway>, ContractError> {
        Ok(Arc::new(FakeCampaign {
            chain: self.chain.clone(),
            address,
        }))
    }
}

struct FakeCampaign {
    chain: Arc<FakeChain>,
    address: Address,
}

#[async_trait]
impl TransactionWaiter for FakeCampaign {
    async fn wait(&self, pending: &PendingWrite) -> Result<Confirmation, ContractError> {
        self.chain.confirm(pending).await
    }
}

#[async_trait]
impl CampaignGateway for FakeCampaign {
    fn address(&self) -> Address {
        self.address
    }

    async fn details(&self) -> Result<CampaignDetails, ContractError> {
        let address = self.address;
        self.chain.with_state(|s| -> Result<CampaignDetails, ContractError> {
            *s.calls.details.entry(address).or_default() += 1;
            s.check_read()?;
            s.campaigns
                .iter()
                .find(|(a, _)| *a == address)
                .map(|(_, d)| d.clone())
                .ok_or_else(|| ContractError::RpcError(format!("no contract at {:?}", address)))
        })
    }

    async fn contribute(&self, value: U256) -> Result<PendingWrite, ContractError> {
        let address = self.address;
        Ok(self.chain.with_state(|s| {
            s.calls.contribute += 1;
            s.submit(Effect::Contribute(address, value), "contribute")
        }))
    }
}
