use std::fmt::Write;

use ethers::types::Address;
use ethers::utils::to_checksum;

use crate::domain::models::{CampaignCard, Confirmation, CrowdfundView, GuestbookView};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::types::ChainConfig;
use crate::utils::display::sanitize_for_display;

pub fn address(address: &Address) -> String {
    to_checksum(address, None)
}

/// The one-line alert for a failed action.
pub fn alert(err: &ContractError) -> String {
    match err {
        // configuration problems are only fixable with the details
        ContractError::ConfigError(detail) | ContractError::DeployError(detail) => {
            format!("{}: {}", err.user_notice(), detail)
        }
        _ => err.user_notice().to_string(),
    }
}

pub fn guestbook_page(view: &GuestbookView, chain: &ChainConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Guestbook on {}", chain.name);
    account_lines(&mut out, view.account.as_ref(), chain);
    if let Some(balance) = &view.balance {
        let _ = writeln!(out, "Balance: {} {}", balance.formatted(), chain.native_currency.symbol);
    }
    out.push('\n');

    if view.messages.is_empty() {
        out.push_str("No messages yet.\n");
        return out;
    }

    let _ = writeln!(out, "Messages ({}):", view.messages.len());
    for (i, message) in view.messages.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. {}", i + 1, sanitize_for_display(&message.text));
    }
    out
}

pub fn crowdfund_page(view: &CrowdfundView, chain: &ChainConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Campaigns on {}", chain.name);
    account_lines(&mut out, view.account.as_ref(), chain);
    out.push('\n');

    if view.campaigns.is_empty() {
        out.push_str("No campaigns yet.\n");
        return out;
    }

    for card in &view.campaigns {
        out.push_str(&campaign_card(card, chain));
        out.push('\n');
    }
    out
}

pub fn campaign_card(card: &CampaignCard, chain: &ChainConfig) -> String {
    let symbol = &chain.native_currency.symbol;
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", address(&card.address));
    match &card.details {
        Some(details) => {
            let _ = writeln!(out, "  {}", sanitize_for_display(&details.title));
            let _ = writeln!(out, "  {}", sanitize_for_display(&details.description));
            let _ = writeln!(out, "  Goal:   {} {}", details.goal_formatted(), symbol);
            let _ = writeln!(out, "  Raised: {} {}", details.raised_formatted(), symbol);
        }
        None => out.push_str("  Loading...\n"),
    }
    out
}

pub fn confirmation(action: &str, confirmation: &Confirmation, chain: &ChainConfig) -> String {
    let mut line = format!(
        "{} confirmed in block {} ({:?})",
        action, confirmation.block_number, confirmation.transaction_hash
    );
    if !chain.explorer_url.is_empty() {
        let _ = write!(line, "\n{}/tx/{:?}", chain.explorer_url, confirmation.transaction_hash);
    }
    line
}

fn account_lines(out: &mut String, account: Option<&Address>, chain: &ChainConfig) {
    match account {
        Some(account) => {
            let _ = writeln!(out, "Account: {} (chain {})", address(account), chain.chain_id);
        }
        None => out.push_str("Not connected\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Balance, CampaignDetails, Message};
    use crate::infrastructure::contracts::config::{get_chain_config_by_id, CORE_TESTNET_CHAIN_ID};
    use ethers::types::{H256, U256};

    fn testnet() -> ChainConfig {
        get_chain_config_by_id(CORE_TESTNET_CHAIN_ID).unwrap()
    }

    fn account() -> Address {
        "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap()
    }

    #[test]
    fn guestbook_page_shows_balance_and_sanitized_messages() {
        let view = GuestbookView {
            account: Some(account()),
            balance: Some(Balance::from_wei(U256::exp10(18) * 3 / 2)),
            messages: vec![
                Message::from("hello".to_string()),
                Message::from("\u{1b}[2Jwiped".to_string()),
            ],
            draft: String::new(),
        };

        let page = guestbook_page(&view, &testnet());
        assert!(page.contains("Account: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert!(page.contains("Balance: 1.5 TCORE"));
        assert!(page.contains("   1. hello"));
        assert!(page.contains("   2. [2Jwiped"));
        assert!(!page.contains('\u{1b}'));
    }

    #[test]
    fn empty_guestbook_says_so() {
        let page = guestbook_page(&GuestbookView::default(), &testnet());
        assert!(page.contains("Not connected"));
        assert!(page.ends_with("No messages yet.\n"));
    }

    #[test]
    fn campaign_card_formats_amounts() {
        let card = CampaignCard {
            address: account(),
            details: Some(CampaignDetails {
                title: "Roof".to_string(),
                description: "Fix it".to_string(),
                goal: U256::exp10(18) * 5,
                raised: U256::exp10(17) * 5,
            }),
        };
        let text = campaign_card(&card, &testnet());
        assert!(text.contains("Goal:   5.0 TCORE"));
        assert!(text.contains("Raised: 0.5 TCORE"));

        let loading = campaign_card(&CampaignCard::new(account()), &testnet());
        assert!(loading.contains("Loading..."));
    }

    #[test]
    fn alerts_hide_transport_details() {
        let err = ContractError::RpcError("connection refused".to_string());
        assert_eq!(alert(&err), "Transaction failed");

        let err = ContractError::ConfigError("Set PRIVATE_KEY".to_string());
        assert_eq!(alert(&err), "Configuration error: Set PRIVATE_KEY");
    }

    #[test]
    fn confirmation_links_to_the_explorer() {
        let confirmation = Confirmation {
            transaction_hash: H256::from_low_u64_be(1),
            block_number: 42,
            gas_used: None,
        };
        let text = super::confirmation("Message", &confirmation, &testnet());
        assert!(text.starts_with("Message confirmed in block 42"));
        assert!(text.contains("https://scan.test.btcs.network/tx/0x"));
    }
}
