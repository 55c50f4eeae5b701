use ethers::types::{Address, U256};

use crate::domain::services::ContractError;
use crate::utils::units::parse_ether;

/// Client-side checks run before anything is sent to the node.
pub struct Validator;

impl Validator {
    /// Reject blank input. Whitespace-only counts as blank.
    pub fn require_text<'a>(value: &'a str, field_name: &str) -> Result<&'a str, ContractError> {
        if value.trim().is_empty() {
            return Err(ContractError::EmptyInput {
                field: field_name.to_string(),
            });
        }
        Ok(value)
    }

    /// Parse a user-typed amount in whole units (ether-style, 18 decimals) into wei.
    pub fn parse_amount(value: &str, field_name: &str) -> Result<U256, ContractError> {
        let value = Self::require_text(value, field_name)?.trim();

        let wei = parse_ether(value).map_err(|reason| ContractError::InvalidAmount {
            field: field_name.to_string(),
            reason,
        })?;

        if wei.is_zero() {
            return Err(ContractError::InvalidAmount {
                field: field_name.to_string(),
                reason: "amount must be greater than zero".to_string(),
            });
        }

        Ok(wei)
    }

    /// Validate Ethereum address format
    pub fn parse_address(address: &str, field_name: &str) -> Result<Address, ContractError> {
        let address = Self::require_text(address, field_name)?.trim();

        // Remove 0x prefix if present
        let clean_address = address.strip_prefix("0x").unwrap_or(address);

        if clean_address.len() != 40 || !clean_address.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ContractError::InvalidAddress(format!(
                "{}: expected 40 hexadecimal characters, got {:?}",
                field_name, address
            )));
        }

        clean_address
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(format!("{}: {}", field_name, e)))
    }
}
