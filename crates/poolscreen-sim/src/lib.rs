//! # Poolscreen Sim
//!
//! Experiment harness on top of `poolscreen-core`: runs many independent
//! pooled-testing trials with a shared configuration, aggregates the
//! outcomes (average infected, average potential positives, reconstruction
//! ambiguity per group size, timing), and renders a plain-text summary.
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_sim::{ExperimentConfig, ExperimentHarness};
//! use poolscreen_core::Scheme;
//!
//! let mut config = ExperimentConfig::default();
//! config.trials = 100;
//! config.trial.subject_count = 64;
//! config.trial.schemes = vec![Scheme::Ascending, Scheme::Complement];
//! config.trial.seed = Some(17);
//!
//! let mut harness = ExperimentHarness::new(config).unwrap();
//! let stats = harness.run().unwrap();
//! println!("{stats}");
//! ```

pub mod experiment;
pub mod report;

pub use experiment::{
    ExperimentConfig, ExperimentError, ExperimentHarness, ExperimentResult, ExperimentStats,
};
