mod commands;
mod config;
mod logging;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use logging::init_logging;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, default_value = "/etc/assetdesk.yaml", env = "ASSETDESK_CONFIG")]
    config: PathBuf,
}

#[derive(clap::Subcommand)]
pub(crate) enum Commands {
    /// Run the admin API server
    Run,
    /// Validate config file
    Check,
    /// Print the name the next asset in a category would get
    NextName {
        /// Category code, e.g. LAP
        category_code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run => crate::commands::run::command(&cli).await,
        Commands::Check => crate::commands::check::command(&cli).await,
        Commands::NextName { category_code } => {
            crate::commands::next_name::command(&cli, category_code).await
        }
    }
}
