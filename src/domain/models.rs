use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::utils::units::format_ether;

// ============ WALLET MODELS ============

/// Native balance of an account, kept in wei and rendered on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub wei: U256,
}

impl Balance {
    pub fn from_wei(wei: U256) -> Self {
        Self { wei }
    }

    /// Decimal amount in whole units, e.g. `1.5`.
    pub fn formatted(&self) -> String {
        format_ether(self.wei)
    }
}

// ============ GUESTBOOK MODELS ============

/// A guestbook entry. Immutable once written on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// What the guestbook page displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestbookView {
    pub account: Option<Address>,
    pub balance: Option<Balance>,
    pub messages: Vec<Message>,
    /// Message typed but not yet sent. Cleared after a confirmed submit.
    pub draft: String,
}

// ============ CROWDFUNDING MODELS ============

/// On-chain fields of one campaign contract, as returned by its view calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDetails {
    pub title: String,
    pub description: String,
    pub goal: U256,
    pub raised: U256,
}

impl CampaignDetails {
    pub fn goal_formatted(&self) -> String {
        format_ether(self.goal)
    }

    pub fn raised_formatted(&self) -> String {
        format_ether(self.raised)
    }
}

/// One card on the crowdfunding page. Details are fetched lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCard {
    pub address: Address,
    pub details: Option<CampaignDetails>,
}

impl CampaignCard {
    pub fn new(address: Address) -> Self {
        Self { address, details: None }
    }
}

/// What the crowdfunding page displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdfundView {
    pub account: Option<Address>,
    pub campaigns: Vec<CampaignCard>,
}

impl CrowdfundView {
    pub fn card(&self, address: Address) -> Option<&CampaignCard> {
        self.campaigns.iter().find(|c| c.address == address)
    }
}

/// Request to open a new campaign through the factory.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub description: String,
    /// Goal in whole units, as typed by the user.
    pub goal: String,
}

// ============ TRANSACTION MODELS ============

/// Outcome of a confirmed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub transaction_hash: H256,
    pub block_number: u64,
    pub gas_used: Option<U256>,
}
