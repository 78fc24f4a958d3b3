use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use gsb_coverage::config::DEFAULT_CONFIG_FILE;
use gsb_coverage::logging;
use gsb_coverage::readers::ReaderKind;
use gsb_coverage::{BatchConfig, BatchError, BatchRunner};

#[derive(Parser, Debug)]
#[command(name = "build_kmz")]
#[command(about = "Build coverage KMZ files for every grid in data/")]
struct Args {
    /// Batch configuration file, defaults to ./coverage.json when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raster access backend, overrides the configuration
    #[arg(long, value_enum)]
    reader: Option<ReaderKind>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let mut config = match &args.config {
        Some(path) => BatchConfig::from_file(path)?,
        None => BatchConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };
    if let Some(reader) = args.reader {
        config = config.with_reader(reader);
    }

    match BatchRunner::new(config).process() {
        Ok(_) => {
            println!("Done.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ BatchError::NoGrids { .. }) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e.into()),
    }
}
