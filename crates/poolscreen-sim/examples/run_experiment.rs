//! Run a pooled-testing experiment and print the summary.
//!
//! Usage: cargo run -p poolscreen-sim --example run_experiment
//!
//! Set RUST_LOG=debug to watch per-trial progress events.

use poolscreen_core::Scheme;
use poolscreen_sim::{ExperimentConfig, ExperimentHarness};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ExperimentConfig::default();
    config.trials = 500;
    config.trial.subject_count = 255;
    config.trial.infection_rate_percent = 2.0;
    config.trial.schemes = vec![Scheme::Ascending, Scheme::Complement];
    config.trial.max_group_size = 2;
    config.trial.seed = Some(20_200_317);

    let mut harness = ExperimentHarness::new(config)?;
    let stats = harness.run()?;
    print!("{stats}");

    Ok(())
}
