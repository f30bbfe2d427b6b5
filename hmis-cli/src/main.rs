mod api;
mod cli;
mod config;
mod reconcile;
mod services;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cli::commands::run::handle_run_command(cli.config, args).await,
        Commands::Status => cli::commands::status::handle_status_command(cli.config).await,
        Commands::Prune(args) => cli::commands::prune::handle_prune_command(cli.config, args).await,
        Commands::Inspect(args) => cli::commands::inspect::handle_inspect_command(cli.config, args),
    }
}
