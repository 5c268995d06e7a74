//! Applog CLI entry point.

use clap::Parser;

use applog::cli::commands::{emit, entries, fetch, files, sweep};
use applog::cli::{Cli, Commands};
use applog::infrastructure::config::ConfigLoader;
use applog::infrastructure::logging::init_diagnostics;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => applog::cli::handle_error(err, cli.json),
    };

    let _guard = match init_diagnostics(&config.diagnostics) {
        Ok(guard) => guard,
        Err(err) => applog::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Emit(args) => emit::execute(args, &config, cli.json).await,
        Commands::Files(args) => files::execute(args, &config, cli.json).await,
        Commands::Entries(args) => entries::execute(args, &config, cli.json).await,
        Commands::Sweep => sweep::execute(&config, cli.json).await,
        Commands::Fetch(args) => fetch::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        applog::cli::handle_error(err, cli.json);
    }
}
