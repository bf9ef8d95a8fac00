//! # luxmap
//!
//! Command-line shell for spectroradiometer grid surveys.
//!
//! ```bash
//! # sort ESPD_* files into one folder per light treatment
//! luxmap organize ./survey
//!
//! # extract and save the PFD/PPFD table of every treatment folder
//! luxmap extract ./survey
//!
//! # interpolated PPFD surfaces of every treatment, overlaid
//! luxmap multi-surface ./survey --method linear
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use luxmap_schemas::{measurement::ZField, surface::InterpolationMethod};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod html;
mod plotting;
mod server;
mod shell;
mod workflow;

/// luxmap - PFD/PPFD survey extraction and plotting
#[derive(Parser)]
#[command(name = "luxmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML settings file (defaults to ./luxmap.yaml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Plot PFD instead of PPFD
    #[arg(long, global = true)]
    pfd: bool,

    /// Do not ask for confirmation before moving or writing files
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move classified files into one subfolder per label
    Organize {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Extract and save the table of every subfolder of ROOT
    Extract {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// 3D scatter of one folder's measurements
    Scatter {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Interpolated 3D surface of one folder's measurements
    Surface {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Interpolation method (cubic, linear or nearest)
        #[arg(short, long)]
        method: Option<InterpolationMethod>,
    },

    /// One interpolated surface per subfolder of ROOT, overlaid
    MultiSurface {
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Interpolation method (cubic, linear or nearest)
        #[arg(short, long)]
        method: Option<InterpolationMethod>,
    },

    /// Interactive chart of every uMOL_*.txt spectrum under ROOT
    Spectral {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// Static panel grid of the spectra under ROOT, coloured by wavelength
    SpectralPanels {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// Serve spectral charts over HTTP
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        addr: Option<String>,
    },
}

fn run(cli: Cli) -> Result<workflow::Outcome> {
    let config = config::AppConfig::load(cli.config.as_deref())?;
    let z_field = if cli.pfd { ZField::Pfd } else { config.z_field };
    log::debug!("Settings: {:?}", config);

    let mut shell = shell::Shell::new(config, z_field, cli.yes);
    shell.run(cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    println!("--- luxmap ---");
    match run(cli) {
        Ok(outcome) => {
            shell::report(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            shell::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
