//! Experiment Harness — repeated trials and aggregate statistics
//!
//! Runs many independent trials of the same configuration and aggregates
//! what the individual trials cannot show: how many subjects are infected
//! on average, how many survive screening, and how ambiguous the
//! reconstruction is per group size. One RNG stream drives the whole
//! experiment, so a seeded configuration reproduces every trial.
//!
//! The harness never prints; it returns an [`ExperimentStats`] value and
//! emits structured `tracing` events for progress observation. Rendering
//! is in [`crate::report`].
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_sim::experiment::{ExperimentConfig, ExperimentHarness};
//!
//! let mut config = ExperimentConfig::default();
//! config.trials = 50;
//! config.trial.subject_count = 32;
//! config.trial.seed = Some(7);
//!
//! let mut harness = ExperimentHarness::new(config).unwrap();
//! let stats = harness.run().unwrap();
//! assert_eq!(stats.trials, 50);
//! assert!(stats.avg_potential_positives >= stats.avg_infected);
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use poolscreen_core::trial::{run_trial, TrialConfig, TrialResult};
use poolscreen_core::types::PoolError;
use poolscreen_core::Scheme;

/// Result type for experiment runs.
pub type ExperimentResult<T> = Result<T, ExperimentError>;

/// Errors raised by the experiment harness.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExperimentError {
    #[error("Invalid trial count: {0}. Must be at least 1")]
    InvalidTrialCount(usize),

    #[error(transparent)]
    Trial(#[from] PoolError),
}

/// Configuration of a whole experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Number of independent trials to run.
    pub trials: usize,
    /// Configuration applied to every trial. `trial.seed` seeds the
    /// experiment-wide RNG stream, not each trial individually.
    pub trial: TrialConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            trial: TrialConfig::default(),
        }
    }
}

/// Aggregated outcome of an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentStats {
    /// Trials run.
    pub trials: usize,
    /// Population size per trial.
    pub subject_count: usize,
    /// Infection rate used, in percent.
    pub infection_rate_percent: f64,
    /// Identifier schemes in concatenation order.
    pub schemes: Vec<Scheme>,
    /// Pooled test kits consumed per trial (= identifier width).
    pub test_kits_used: usize,
    /// Mean number of truly infected subjects per trial.
    pub avg_infected: f64,
    /// Mean number of subjects surviving screening per trial.
    pub avg_potential_positives: f64,
    /// Mean number of exact match groups per group size.
    pub avg_match_groups_by_size: BTreeMap<usize, f64>,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// Runs trials and owns the completed results.
#[derive(Debug)]
pub struct ExperimentHarness {
    config: ExperimentConfig,
    rng: rand::rngs::StdRng,
    results: Vec<TrialResult>,
}

impl ExperimentHarness {
    /// Create a harness. Validates the trial count and the per-trial
    /// configuration up front, so a misconfigured experiment fails before
    /// any work is done.
    pub fn new(config: ExperimentConfig) -> ExperimentResult<Self> {
        if config.trials == 0 {
            return Err(ExperimentError::InvalidTrialCount(config.trials));
        }
        config.trial.validate()?;
        let rng = config.trial.rng();
        Ok(Self {
            config,
            rng,
            results: Vec::new(),
        })
    }

    /// Run all trials and aggregate. Any trial failure aborts the whole
    /// experiment; no partial statistics are produced.
    pub fn run(&mut self) -> ExperimentResult<ExperimentStats> {
        let started = Instant::now();
        let trials = self.config.trials;

        self.results.clear();
        self.results.reserve(trials);
        for idx in 0..trials {
            let result = run_trial(&self.config.trial, &mut self.rng)?;
            debug!(
                trial = idx,
                infected = result.infected.len(),
                potential_positives = result.potential_positives.len(),
                "trial complete"
            );
            self.results.push(result);
        }

        let stats = self.aggregate(started.elapsed());
        info!(
            trials,
            avg_infected = stats.avg_infected,
            avg_potential_positives = stats.avg_potential_positives,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "experiment complete"
        );
        Ok(stats)
    }

    /// Completed trial results, in run order. Empty before [`run`].
    ///
    /// [`run`]: ExperimentHarness::run
    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    fn aggregate(&self, elapsed: Duration) -> ExperimentStats {
        let trials = self.results.len();
        let denom = trials as f64;

        let total_infected: usize = self.results.iter().map(|r| r.infected.len()).sum();
        let total_potential: usize = self
            .results
            .iter()
            .map(|r| r.potential_positives.len())
            .sum();

        let mut group_totals: BTreeMap<usize, usize> = BTreeMap::new();
        for result in &self.results {
            for (&size, matches) in &result.match_groups_by_size {
                *group_totals.entry(size).or_default() += matches.len();
            }
        }
        let avg_match_groups_by_size = group_totals
            .into_iter()
            .map(|(size, total)| (size, total as f64 / denom))
            .collect();

        ExperimentStats {
            trials,
            subject_count: self.config.trial.subject_count,
            infection_rate_percent: self.config.trial.infection_rate_percent,
            schemes: self.config.trial.schemes.clone(),
            test_kits_used: self
                .results
                .first()
                .map(|r| r.identifier_width)
                .unwrap_or(0),
            avg_infected: total_infected as f64 / denom,
            avg_potential_positives: total_potential as f64 / denom,
            avg_match_groups_by_size,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolscreen_core::InfectionModel;

    fn small_config(seed: u64) -> ExperimentConfig {
        ExperimentConfig {
            trials: 20,
            trial: TrialConfig {
                subject_count: 32,
                infection_rate_percent: 5.0,
                seed: Some(seed),
                ..TrialConfig::default()
            },
        }
    }

    #[test]
    fn test_runs_configured_trial_count() {
        let mut harness = ExperimentHarness::new(small_config(1)).unwrap();
        let stats = harness.run().unwrap();
        assert_eq!(stats.trials, 20);
        assert_eq!(harness.results().len(), 20);
        assert_eq!(stats.test_kits_used, 6); // bit_width(32) x 1 scheme
    }

    #[test]
    fn test_seeded_experiments_reproduce() {
        let mut first = ExperimentHarness::new(small_config(9)).unwrap();
        let mut second = ExperimentHarness::new(small_config(9)).unwrap();
        let a = first.run().unwrap();
        let b = second.run().unwrap();
        assert_eq!(first.results(), second.results());
        assert_eq!(a.avg_infected, b.avg_infected);
        assert_eq!(a.avg_potential_positives, b.avg_potential_positives);
        assert_eq!(a.avg_match_groups_by_size, b.avg_match_groups_by_size);
    }

    #[test]
    fn test_trials_are_not_identical_copies() {
        let mut harness = ExperimentHarness::new(small_config(4)).unwrap();
        harness.run().unwrap();
        let infected_counts: Vec<usize> =
            harness.results().iter().map(|r| r.infected.len()).collect();
        // One shared RNG stream: 20 Bernoulli trials should not all agree
        assert!(infected_counts.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_averages_on_degenerate_rates() {
        let mut config = small_config(2);
        config.trial.infection_rate_percent = 0.0;
        let stats = ExperimentHarness::new(config).unwrap().run().unwrap();
        assert_eq!(stats.avg_infected, 0.0);
        // Screening against an all-zero result keeps subject 0 only
        assert_eq!(stats.avg_potential_positives, 1.0);

        let mut config = small_config(2);
        config.trial.infection_rate_percent = 100.0;
        config.trial.infection_model = InfectionModel::FixedCount;
        let stats = ExperimentHarness::new(config).unwrap().run().unwrap();
        assert_eq!(stats.avg_infected, 32.0);
    }

    #[test]
    fn test_stats_have_entry_for_every_group_size() {
        let mut config = small_config(3);
        config.trial.max_group_size = 3;
        let stats = ExperimentHarness::new(config).unwrap().run().unwrap();
        let sizes: Vec<usize> = stats.avg_match_groups_by_size.keys().copied().collect();
        assert_eq!(sizes, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_trials_rejected() {
        let config = ExperimentConfig {
            trials: 0,
            ..small_config(1)
        };
        assert!(matches!(
            ExperimentHarness::new(config),
            Err(ExperimentError::InvalidTrialCount(0))
        ));
    }

    #[test]
    fn test_invalid_trial_config_rejected_up_front() {
        let mut config = small_config(1);
        config.trial.infection_rate_percent = -3.0;
        assert!(matches!(
            ExperimentHarness::new(config),
            Err(ExperimentError::Trial(PoolError::InvalidInfectionRate(_)))
        ));
    }
}
