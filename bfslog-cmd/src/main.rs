mod convert;
mod info;

use std::io::stderr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use bfslog::AccumulatorConfig;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a flight-data log into a JSON dataset container.
    ///
    /// Every column declared in the log becomes a dataset named after its key, with
    /// its description as the "Description" attribute and one sample per data frame.
    Convert {
        /// Output file path.
        ///
        /// If not provided the output is written to the first of data000.json,
        /// data001.json, ... that does not already exist in the current directory.
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,

        /// Delete output file if it already exists
        #[arg(long, action)]
        clobber: bool,

        /// Stop after this many data frames.
        #[arg(short, long, value_name = "count")]
        max_data_frames: Option<usize>,

        /// Input log file.
        input: PathBuf,
    },
    /// Show information about a flight-data log
    Info {
        /// Input log file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("BFSLOG_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Convert {
            output,
            clobber,
            max_data_frames,
            input,
        } => {
            let output = match output {
                Some(output) => {
                    if !clobber && output.exists() {
                        bail!("{output:?} exists; use --clobber");
                    }
                    output.clone()
                }
                None => convert::next_output_path(Path::new("."))?,
            };
            info!("converting {input:?} to {output:?}");
            let config = AccumulatorConfig {
                max_data_frames: *max_data_frames,
            };
            convert::convert(input, &output, config)
        }
        Commands::Info { input, format } => info::info(input, format),
    }
}
