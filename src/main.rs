mod application;
mod cli;
mod cli_handlers;
mod config;
mod core;
mod logging;
mod modules;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};
use cli_handlers::from_cli;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    // Logging is best-effort; the player still works without a log file.
    let log_handle = match logging::init_tracing() {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let config = match cli.config.or_else(config::default_config_path) {
        Some(path) => config::load_config(&path),
        None => config::AppConfig::default(),
    };
    if let Some(handle) = &log_handle {
        logging::apply_log_level(handle, &config.log_level);
    }

    let command = cli.command.unwrap_or(Commands::Browse);
    if let Err(e) = from_cli(command, config).execute() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
