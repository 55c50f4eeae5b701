pub mod provider;
pub mod session;

pub use provider::{
    discover_provider_with, AccountApproval, AutoApprove, LocalKeyProvider, NodeAccountsProvider, TerminalPrompt,
    WalletProvider,
};
pub use session::WalletSession;
