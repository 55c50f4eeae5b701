use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use core_dapps::application::services::GuestbookService;
use core_dapps::cli::{self, render, CommonArgs};
use core_dapps::domain::services::ContractError;

#[derive(Parser)]
#[command(name = "guestbook")]
#[command(about = "Read and sign the on-chain guestbook")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the connected account, its balance and every message
    Show,
    /// Append a message and wait for it to be mined
    Post {
        #[arg(value_name = "MESSAGE")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    cli::load_env();
    cli::init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => cli::fail("guestbook", &e),
    }
}

async fn run(cli: Cli) -> Result<(), ContractError> {
    let context = cli.common.context()?;
    let service = GuestbookService::new(context.addresses.require_guestbook()?, context.abis.clone());

    let view = context.wallet.connect_guestbook(&service).await?;

    match cli.command {
        Commands::Show => {
            print!("{}", render::guestbook_page(&view, &context.chain));
        }
        Commands::Post { message } => {
            service.set_draft(message).await;
            info!("Submitting message to {}", context.chain.name);
            let confirmation = service.submit_draft().await?;
            println!("{}", render::confirmation("Message", &confirmation, &context.chain));
            print!("{}", render::guestbook_page(&service.view().await, &context.chain));
        }
    }
    Ok(())
}
