#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that resolves and calibrates a skirmish scenario.

mod scenario_transfer;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::Scenario;
use skirmish_system_calibration::Calibration;
use tracing_subscriber::EnvFilter;

/// Resolves a battle scenario and reports the baseline and calibrated scores.
#[derive(Debug, Parser)]
#[command(
    name = "skirmish",
    about = "Turn-based grid combat with elf attack-power calibration"
)]
struct Cli {
    /// Path to a scenario file, or an inline `skirmish:v1:...` transfer string.
    scenario: String,
    /// Emit the full calibration outcome as JSON instead of the two scores.
    #[arg(long)]
    json: bool,
    /// Print the scenario's single-line transfer encoding and exit.
    #[arg(long)]
    encode: bool,
}

/// Entry point for the skirmish command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let scenario = load_scenario(&cli.scenario)?;

    if cli.encode {
        println!("{}", scenario_transfer::encode(&scenario));
        return Ok(());
    }

    let mut calibration = Calibration::new();
    let outcome = calibration.calibrate(&scenario);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.baseline.score);
        println!("{}", outcome.calibrated.score);
    }

    Ok(())
}

fn load_scenario(input: &str) -> Result<Scenario> {
    if scenario_transfer::is_transfer_string(input) {
        return scenario_transfer::decode(input)
            .context("could not decode the scenario transfer string");
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("could not read scenario file '{input}'"))?;
    Scenario::parse(&text).context("scenario file failed validation")
}
