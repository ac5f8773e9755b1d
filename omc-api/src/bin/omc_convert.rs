//! omc-convert - convert label catalog files between layouts
//!
//! Layouts:
//! - 0: `[{"artist": "...", "title": "..."}]`
//! - 1: `{"Artist": {"tracks": ["..."]}}`
//! - 2: `{"Artist": ["..."]}`
//!
//! Artists and titles are NFKC-normalized on input and repeated artists are
//! merged. Layouts are selected with the long flags `--input-format` and
//! `--output-format`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use omc_common::rules::{LabelCatalog, LabelFormat};

#[derive(Parser, Debug)]
#[command(name = "omc-convert")]
#[command(about = "Convert between label catalog layouts")]
#[command(version)]
struct Args {
    /// Input file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Input layout (0=artist/title groups, 1=artist track list with key, 2=artist track list)
    #[arg(long = "input-format")]
    input_format: LabelFormat,

    /// Output layout (0, 1 or 2)
    #[arg(long = "output-format")]
    output_format: LabelFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", args.input.display()))?;

    let name = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let catalog = LabelCatalog::parse(name, &value, args.input_format)
        .with_context(|| format!("{} is not a layout {} catalog", args.input.display(), args.input_format))?
        .normalized();

    let mut rendered = serde_json::to_string_pretty(&catalog.to_value(args.output_format))?;
    rendered.push('\n');
    std::fs::write(&args.output, rendered)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        artists = catalog.artists().count(),
        tracks = catalog.track_count(),
        output = %args.output.display(),
        "Converted label catalog"
    );

    Ok(())
}
