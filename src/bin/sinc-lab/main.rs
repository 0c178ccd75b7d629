//! sinc-lab - scenario harness for the resampler, kernels and oscillators
//!
//! Run with: cargo run --bin sinc-lab -- all --pretty
//!
//! Every scenario prints one JSON report to stdout. Logs go to stderr and are
//! controlled with RUST_LOG (e.g. RUST_LOG=sinc_dsp=debug).

mod scenarios;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sinc_dsp::patch::LabConfig;

#[derive(Debug, Parser)]
#[command(name = "sinc-lab", version, about = "Run DSP verification scenarios")]
struct Args {
    /// Scenario to run, or `all`
    scenario: String,

    /// JSON lab configuration (sample rate, resampler, oscillator)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON reports
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
            LabConfig::from_json(&text)
                .wrap_err_with(|| format!("invalid lab config in {}", path.display()))?
        }
        None => LabConfig::default(),
    };

    for scenario in scenarios::select(&args.scenario)? {
        tracing::info!(scenario = scenario.name(), "running scenario");
        let report = scenario.run(&config);
        let line = if args.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .wrap_err("failed to encode report")?;
        println!("{line}");
    }

    Ok(())
}
