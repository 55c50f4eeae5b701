//! Shared plumbing for the `guestbook`, `crowdfund` and `deploy` binaries.

pub mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use dotenvy::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::application::use_cases::ConnectWalletUseCase;
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::addresses::load_addresses_from_env;
use crate::infrastructure::contracts::config::{get_chain_config, CORE_TESTNET_CHAIN_ID};
use crate::infrastructure::contracts::types::{ChainConfig, ContractAddresses};
use crate::infrastructure::wallet::{AccountApproval, AutoApprove, TerminalPrompt};

/// Flags every client binary accepts.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Chain to talk to
    #[arg(long, env = "DEFAULT_CHAIN_ID", default_value_t = CORE_TESTNET_CHAIN_ID)]
    pub chain_id: u64,

    /// Override the chain's RPC endpoint
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Grant account access without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Everything a client command needs before connecting.
pub struct ClientContext {
    pub chain: ChainConfig,
    pub addresses: ContractAddresses,
    pub abis: AbiSource,
    pub wallet: ConnectWalletUseCase,
}

impl CommonArgs {
    pub fn context(&self) -> Result<ClientContext, ContractError> {
        let chain = get_chain_config(self.chain_id, self.rpc_url.clone())?;
        let addresses = load_addresses_from_env(&chain)?;

        let approval: Arc<dyn AccountApproval> = if self.yes {
            Arc::new(AutoApprove)
        } else {
            Arc::new(TerminalPrompt)
        };

        Ok(ClientContext {
            wallet: ConnectWalletUseCase::from_env(chain.clone(), approval),
            chain,
            addresses,
            abis: AbiSource::from_env(),
        })
    }
}

/// Load `.env`. Must run before argument parsing so `env` defaults see it.
pub fn load_env() {
    dotenv().ok();
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Surface a failed command: trace the details, show the notice, exit 1.
pub fn fail(command: &str, err: &ContractError) -> ExitCode {
    error!("{} failed: {}", command, err);
    eprintln!("{}", render::alert(err));
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn chain_flag_parses() {
        let cli = TestCli::try_parse_from(["test", "--chain-id", "31337", "--yes"]).unwrap();
        assert_eq!(cli.common.chain_id, 31337);
        assert!(cli.common.yes);
    }
}
