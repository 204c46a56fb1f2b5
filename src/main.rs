// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use log::info;
use rustls::crypto::{CryptoProvider, ring};

use review_collector::{Collector, SourceMapping, config::Config, sources::get_source};

// ------------------------------------------------------------
// Command line
// ------------------------------------------------------------
#[derive(Debug, Parser)]
#[command(
    name = "review-collector",
    about = "Collect store reviews for the configured apps into daily CSV files",
    long_about = "Fetch every review for each configured app and save one `{name}_raw_{YYYYMMDD}.csv` per app. Apps already collected today are skipped."
)]
struct Cli {
    #[arg(
        long,
        value_name = "PATH",
        default_value = "config.json",
        help = "JSON configuration file"
    )]
    config: PathBuf,

    #[arg(
        long = "output-dir",
        value_name = "DIR",
        help = "Override `output_dir` from the configuration"
    )]
    output_dir: Option<String>,
}

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize cryptography backend (rustls)
// - Load configuration and set up logging
// - Resolve the review source and build the collector
// - Run one batch and print the resulting file paths
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // rustls >= 0.23 needs an explicit process-wide provider
    CryptoProvider::install_default(ring::default_provider())
        .map_err(|_| anyhow!("failed to install rustls CryptoProvider"))?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(config.debug_log());

    let source_cfg = config.source_config();
    let source = get_source(&source_cfg)?
        .ok_or_else(|| anyhow!("review source '{}' is not supported", source_cfg.name))?;

    let apps = SourceMapping::from_json(&config.apps)?;
    let output_dir = cli.output_dir.unwrap_or(config.output_dir.clone());
    let collector = Collector::new(apps, output_dir, source, config.fetch_params())?;

    let manifest = collector.run_all().await;
    info!("{} raw files available for preprocessing", manifest.len());
    for path in &manifest {
        println!("{}", path.display());
    }

    Ok(())
}

/// `RUST_LOG` wins over the config flag.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

// ------------------------------------------------------------
// Configuration loader
// ------------------------------------------------------------
//
// Reads the JSON configuration and deserializes it into
// `Config`. Semantic checks (empty app list, empty output
// directory) happen when the collector is built.
//
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let cfg = Config::from_json_str(&data)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}
