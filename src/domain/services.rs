use thiserror::Error;

// ============ CONTRACT ERROR TYPES ============

/// Every failure a wallet session, contract gateway or client service can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("No wallet provider available")]
    ProviderUnavailable,
    #[error("User rejected the request: {reason}")]
    UserRejected { reason: String },
    #[error("RPC error: {0}")]
    RpcError(String),
    #[error("Transaction reverted: {reason}")]
    TransactionReverted { reason: String },
    #[error("Empty input: {field}")]
    EmptyInput { field: String },
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("ABI error: {0}")]
    AbiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Another action is still in progress: {action}")]
    ActionInProgress { action: String },
    #[error("Deployment error: {0}")]
    DeployError(String),
}

impl ContractError {
    /// The alert shown to the user for this failure.
    ///
    /// Network blips and reverts share one generic notice; only client-side
    /// validation and a missing provider get their own wording.
    pub fn user_notice(&self) -> &'static str {
        match self {
            ContractError::ProviderUnavailable => "A wallet provider is required to use this app",
            ContractError::EmptyInput { field } if field == "message" => "Enter a message",
            ContractError::EmptyInput { .. } => "Fill in all fields",
            ContractError::InvalidAmount { .. } => "Enter a valid amount",
            ContractError::WalletNotConnected => "Connect your wallet first",
            ContractError::ActionInProgress { .. } => "Please wait for the current transaction",
            ContractError::ConfigError(_) | ContractError::InvalidAddress(_) => "Configuration error",
            ContractError::DeployError(_) => "Deployment failed",
            ContractError::UserRejected { .. }
            | ContractError::RpcError(_)
            | ContractError::TransactionReverted { .. }
            | ContractError::AbiError(_) => "Transaction failed",
        }
    }

    /// True for failures raised before anything was sent to the node.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ContractError::EmptyInput { .. }
                | ContractError::InvalidAmount { .. }
                | ContractError::WalletNotConnected
                | ContractError::ActionInProgress { .. }
        )
    }
}

impl From<ethers::contract::AbiError> for ContractError {
    fn from(err: ethers::contract::AbiError) -> Self {
        ContractError::AbiError(err.to_string())
    }
}

impl From<ethers::abi::Error> for ContractError {
    fn from(err: ethers::abi::Error) -> Self {
        ContractError::AbiError(err.to_string())
    }
}
