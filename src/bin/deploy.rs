use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use core_dapps::application::use_cases::DeployFactoryUseCase;
use core_dapps::cli::{self, render};
use core_dapps::domain::services::ContractError;
use core_dapps::infrastructure::deploy::{DeployConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "deploy")]
#[command(about = "Compile and deploy a CampaignFactory")]
struct Cli {
    /// Network from the config file (defaults to `default_network`)
    #[arg(long)]
    network: Option<String>,

    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Reuse the existing artifact instead of running solc
    #[arg(long)]
    skip_compile: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    cli::load_env();
    cli::init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => cli::fail("deploy", &e),
    }
}

async fn run(cli: Cli) -> Result<(), ContractError> {
    let config = DeployConfig::load(&cli.config)?;
    let root = cli
        .config
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    let outcome = DeployFactoryUseCase::new(config, root, cli.network, cli.skip_compile)
        .execute()
        .await?;

    println!("CampaignFactory deployed to: {}", render::address(&outcome.deployment.address));
    Ok(())
}
