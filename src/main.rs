mod checks;
mod cli;
mod core;
mod fixers;
mod repair;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);
    let config = cli.load_config();

    let valid = match &cli.command {
        Commands::Check(args) => cli::commands::check::execute(args, &config).await?,
        Commands::Repair(args) => cli::commands::repair::execute(args, &config).await?,
        Commands::Fix(args) => cli::commands::fix::execute(args, &config).await?,
        Commands::Init(args) => {
            cli::commands::init::execute(args).await?;
            true
        }
    };

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}
