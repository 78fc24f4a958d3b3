use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use gsb_coverage::CoverageConverter;
use gsb_coverage::kml::PolygonStyle;
use gsb_coverage::logging;
use gsb_coverage::readers::ReaderKind;

#[derive(Parser, Debug)]
#[command(name = "gsb2kmz")]
#[command(about = "Convert NTv2 .gsb coverage to KMZ closed polygons")]
struct Args {
    /// Path to .gsb file
    #[arg(long)]
    input: PathBuf,

    /// Output KMZ path
    #[arg(long)]
    out: PathBuf,

    /// Overlay name
    #[arg(long)]
    name: Option<String>,

    /// Raster access backend
    #[arg(long, value_enum, default_value_t = ReaderKind::Gdal)]
    reader: ReaderKind,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let converter = CoverageConverter::new(args.reader, PolygonStyle::default());
    let conversion = converter.convert(&args.input, &args.out, args.name.as_deref())?;

    println!("Wrote: {}", conversion.detail.display());
    println!("Wrote: {}", conversion.merged.display());

    Ok(())
}
