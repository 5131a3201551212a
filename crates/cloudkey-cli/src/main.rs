mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        completions::generate_completions(shell);
        return Ok(());
    }

    let config = CliConfig::load(cli.config.as_deref());
    let _guard = logging::init(cli.verbose, &config)?;

    match cli.command {
        Commands::Rotate(args) => commands::rotate::run(args, &config).await,
        Commands::List(args) => commands::list::run(args, &config).await,
        Commands::Version(args) => commands::version::run(args),
        Commands::Completions { .. } => Ok(()),
    }
}
