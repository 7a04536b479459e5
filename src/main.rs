mod allocator;
mod cli;
mod columns;
mod error;
mod export;
mod fmt;
mod models;
mod processor;
mod reader;
mod reconciler;
mod reconstruct;
mod reports;
mod settings;
mod styles;
mod tally;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init {
            home_state,
            reduction,
            output_dir,
        } => cli::init::run(config, home_state, reduction, output_dir),
        Commands::Process {
            file,
            reduction,
            home_state,
            output_dir,
        } => cli::process::run(config, &file, reduction, home_state, output_dir),
        Commands::Summary {
            file,
            reduction,
            home_state,
        } => cli::summary::run(config, &file, reduction, home_state),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
