// Guestbook, CampaignFactory and Campaign bindings plus chain/address resolution

pub mod abis;
pub mod addresses;
pub mod client;
pub mod config;
pub mod gateway;
pub mod types;

pub use client::{EthersCampaign, EthersCampaignFactory, EthersGuestbook, TxSettings};
pub use gateway::{CampaignFactoryGateway, CampaignGateway, GuestbookGateway, PendingWrite, TransactionWaiter};
pub use types::*;
