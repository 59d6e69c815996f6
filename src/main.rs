mod calibration;
mod config;
mod errors;
mod image_io;
mod image_utils;
mod measurement;
mod morphology;
mod pipeline;
mod segmentation;
mod server;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use pipeline::{process_image, MeasureRequest};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Leaf area estimation service")]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overwrites config)
    #[clap(long)]
    host: Option<String>,

    /// Bind port (overwrites config)
    #[clap(short, long)]
    port: Option<u16>,

    /// Measure a single image file and print the JSON result instead of serving
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Real-world length of the reference, required with --input
    #[clap(long)]
    length: Option<f64>,

    /// Real-world width of the reference, required with --input
    #[clap(long)]
    width: Option<f64>,

    /// Report fenestration areas (one-shot mode)
    #[clap(long)]
    fenestrated: bool,

    /// Report variegation area and percentage (one-shot mode)
    #[clap(long)]
    variegated: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with command-line arguments
    if let Some(host) = args.host.clone() {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    config.validate()?;

    // One-shot mode: measure a single file and print the result
    if let Some(input) = &args.input {
        let (Some(length), Some(width)) = (args.length, args.width) else {
            bail!("--input requires --length and --width");
        };

        let bytes = std::fs::read(input).map_err(errors::LeafAreaError::Io)?;
        let request = MeasureRequest {
            length,
            width,
            fenestrated: args.fenestrated,
            variegated: args.variegated,
        };

        let result = process_image(&bytes, &request, &config)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    server::run(config).await
}
