pub mod init;
pub mod process;
pub mod summary;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::settings::{load_settings, Settings};
use crate::tally::RunOptions;

#[derive(Parser)]
#[command(
    name = "daybook-tally",
    version,
    about = "Rebuild GST DayBook exports into cleaned and Tally-ready ledgers."
)]
pub struct Cli {
    /// Settings file to use instead of ~/.config/daybook-tally/settings.json
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save default run parameters to the settings file.
    Init {
        /// Two-digit state code of the seller (GSTIN prefix)
        #[arg(long = "home-state")]
        home_state: Option<String>,
        /// Percentage by which Tally taxable values are reduced
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        reduction: Option<u32>,
        /// Directory the workbooks are written to
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Process a DayBook export and write the cleaned, Tally and dashboard workbooks.
    Process {
        /// Path to the DayBook .xlsx export
        file: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        reduction: Option<u32>,
        #[arg(long = "home-state")]
        home_state: Option<String>,
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Print the monthly dashboard for a DayBook export without writing files.
    Summary {
        /// Path to the DayBook .xlsx export
        file: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        reduction: Option<u32>,
        #[arg(long = "home-state")]
        home_state: Option<String>,
    },
}

/// Settings from disk with any command-line flags laid over them.
pub(crate) fn resolve_settings(
    config: Option<&str>,
    reduction: Option<u32>,
    home_state: Option<String>,
    output_dir: Option<String>,
) -> Settings {
    let mut settings = load_settings(config);
    if let Some(p) = reduction {
        settings.reduction_percent = p;
    }
    if let Some(code) = home_state {
        settings.home_state_code = code;
    }
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    settings
}

pub(crate) fn run_options(settings: &Settings) -> Result<RunOptions> {
    RunOptions::new(settings.reduction_percent, &settings.home_state_code)
}
