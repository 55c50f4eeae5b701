use std::process::ExitCode;

use clap::{Parser, Subcommand};

use core_dapps::application::services::CrowdfundingService;
use core_dapps::cli::{self, render, CommonArgs};
use core_dapps::domain::models::CreateCampaignRequest;
use core_dapps::domain::services::ContractError;
use core_dapps::domain::validation::Validator;

#[derive(Parser)]
#[command(name = "crowdfund")]
#[command(about = "Browse, create and fund campaigns from the CampaignFactory")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every campaign with its goal and amount raised
    List,
    /// Open a new campaign
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Goal in whole units of the native currency
        #[arg(long)]
        goal: String,
    },
    /// Send funds to a campaign
    Contribute {
        #[arg(value_name = "CAMPAIGN")]
        campaign: String,
        /// Amount in whole units of the native currency
        #[arg(long)]
        amount: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    cli::load_env();
    cli::init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => cli::fail("crowdfund", &e),
    }
}

async fn run(cli: Cli) -> Result<(), ContractError> {
    let context = cli.common.context()?;
    let chain = &context.chain;
    let service = CrowdfundingService::new(context.addresses.require_campaign_factory()?, context.abis.clone());

    // reject a malformed campaign address before touching the wallet
    let target = match &cli.command {
        Commands::Contribute { campaign, .. } => Some(Validator::parse_address(campaign, "campaign")?),
        _ => None,
    };

    context.wallet.connect_crowdfunding(&service).await?;

    match cli.command {
        Commands::List => {
            let view = service.load_all_details().await?;
            print!("{}", render::crowdfund_page(&view, chain));
        }
        Commands::Create { title, description, goal } => {
            let confirmation = service
                .create_campaign(CreateCampaignRequest { title, description, goal })
                .await?;
            println!("{}", render::confirmation("Campaign", &confirmation, chain));
            print!("{}", render::crowdfund_page(&service.view().await, chain));
        }
        Commands::Contribute { amount, .. } => {
            let campaign = target.ok_or_else(|| ContractError::InvalidAddress("campaign: missing".to_string()))?;
            let confirmation = service.contribute(campaign, &amount).await?;
            println!("{}", render::confirmation("Contribution", &confirmation, chain));
            if let Some(card) = service.view().await.card(campaign) {
                print!("{}", render::campaign_card(card, chain));
            }
        }
    }
    Ok(())
}
