//! Trial Pipeline — one complete simulate-and-decode round
//!
//! Glues the stages together for a single trial: assign identifiers,
//! draw the infected subset, OR-aggregate the observed result, screen
//! candidates, reconstruct match groups. A trial either completes and
//! returns a [`TrialResult`] or fails atomically; no partial results.
//!
//! The pipeline is deterministic given its RNG: the same [`TrialConfig`]
//! and the same seed reproduce the identical [`TrialResult`].
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_core::trial::{run_trial_seeded, TrialConfig};
//! use poolscreen_core::scheme::Scheme;
//!
//! let config = TrialConfig {
//!     subject_count: 32,
//!     infection_rate_percent: 10.0,
//!     schemes: vec![Scheme::Ascending, Scheme::Complement],
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let result = run_trial_seeded(&config).unwrap();
//! // Screening is sound: every infected subject survives it
//! for subject in &result.infected {
//!     assert!(result.potential_positives.contains(subject));
//! }
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::decoder::{self, DecoderConfig, MatchGroupsBySize};
use crate::pool::{self, InfectionModel, PoolConfig};
use crate::scheme::{IdentifierSet, Scheme};
use crate::types::{Code, PoolError, PoolResult, SubjectId};

/// Full configuration of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Population size N. Must be at least 1.
    pub subject_count: usize,
    /// Infection rate as a percentage in [0, 100].
    pub infection_rate_percent: f64,
    /// Identifier schemes, concatenated in order. Must be non-empty.
    pub schemes: Vec<Scheme>,
    /// Largest reconstruction group size, in [1, subject_count].
    pub max_group_size: usize,
    /// How the infected subset is drawn.
    pub infection_model: InfectionModel,
    /// Optional cap on evaluated combinations (see [`DecoderConfig`]).
    pub combination_budget: Option<u64>,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            subject_count: 255,
            infection_rate_percent: 2.0,
            schemes: vec![Scheme::Ascending],
            max_group_size: 2,
            infection_model: InfectionModel::Bernoulli,
            combination_budget: None,
            seed: None,
        }
    }
}

impl TrialConfig {
    /// Validate all parameter ranges.
    pub fn validate(&self) -> PoolResult<()> {
        if self.subject_count == 0 {
            return Err(PoolError::InvalidSubjectCount(self.subject_count));
        }
        let rate = self.infection_rate_percent;
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(PoolError::InvalidInfectionRate(rate));
        }
        if self.schemes.is_empty() {
            return Err(PoolError::EmptySchemeList);
        }
        if self.max_group_size == 0 || self.max_group_size > self.subject_count {
            return Err(PoolError::InvalidGroupSize {
                size: self.max_group_size,
                max: self.subject_count,
            });
        }
        Ok(())
    }

    /// RNG for this configuration: seeded when `seed` is set, otherwise
    /// drawn from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Everything one trial produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Identifier width in bits = pooled tests consumed per subject.
    pub identifier_width: usize,
    /// Truly infected subjects, sorted by index.
    pub infected: Vec<SubjectId>,
    /// Observed test-result vector.
    pub test_result: Code,
    /// Subjects surviving the submask screening, sorted by index.
    pub potential_positives: Vec<SubjectId>,
    /// Reconstruction output per group size.
    pub match_groups_by_size: MatchGroupsBySize,
}

/// Run one trial, drawing randomness from `rng`.
pub fn run_trial(config: &TrialConfig, rng: &mut StdRng) -> PoolResult<TrialResult> {
    config.validate()?;

    let ids = IdentifierSet::assign(config.subject_count, &config.schemes, rng)?;

    let pool_config = PoolConfig {
        infection_rate_percent: config.infection_rate_percent,
        model: config.infection_model,
    };
    let infected = pool::draw_infected(&pool_config, config.subject_count, rng)?;
    let test_result = pool::aggregate(&ids, &infected);

    let potential_positives = decoder::screen(&ids, test_result);
    let decoder_config = DecoderConfig {
        max_group_size: config.max_group_size,
        combination_budget: config.combination_budget,
    };
    let match_groups_by_size =
        decoder::find_match_groups(&ids, &potential_positives, test_result, &decoder_config)?;

    Ok(TrialResult {
        identifier_width: ids.width(),
        infected,
        test_result,
        potential_positives,
        match_groups_by_size,
    })
}

/// Run one trial with a fresh RNG from [`TrialConfig::rng`].
pub fn run_trial_seeded(config: &TrialConfig) -> PoolResult<TrialResult> {
    let mut rng = config.rng();
    run_trial(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary;

    fn base_config() -> TrialConfig {
        TrialConfig {
            subject_count: 64,
            infection_rate_percent: 5.0,
            schemes: vec![Scheme::Ascending],
            max_group_size: 2,
            infection_model: InfectionModel::Bernoulli,
            combination_budget: None,
            seed: Some(1234),
        }
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let config = base_config();
        let first = run_trial_seeded(&config).unwrap();
        let second = run_trial_seeded(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_soundness_across_seeds_and_models() {
        for model in [InfectionModel::Bernoulli, InfectionModel::FixedCount] {
            for seed in 0..20 {
                let config = TrialConfig {
                    infection_model: model,
                    seed: Some(seed),
                    schemes: vec![Scheme::Random, Scheme::Complement],
                    ..base_config()
                };
                let result = run_trial_seeded(&config).unwrap();
                for subject in &result.infected {
                    assert!(
                        result.potential_positives.contains(subject),
                        "infected {subject} screened out (seed {seed})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_infected_set_is_among_match_groups_when_small_enough() {
        for seed in 0..30 {
            let config = TrialConfig {
                seed: Some(seed),
                ..base_config()
            };
            let result = run_trial_seeded(&config).unwrap();
            if result.infected.is_empty() || result.infected.len() > config.max_group_size {
                continue;
            }
            let groups = &result.match_groups_by_size[&result.infected.len()];
            assert!(
                groups.contains(&result.infected),
                "true infected set missing from matches (seed {seed})"
            );
        }
    }

    #[test]
    fn test_rate_zero_yields_zero_result() {
        let config = TrialConfig {
            infection_rate_percent: 0.0,
            ..base_config()
        };
        let result = run_trial_seeded(&config).unwrap();
        assert!(result.infected.is_empty());
        assert_eq!(result.test_result, 0);
        // Only the all-zero identifier is a submask of the all-zero result
        assert_eq!(result.potential_positives, vec![0]);
    }

    #[test]
    fn test_single_subject_zero_rate() {
        let config = TrialConfig {
            subject_count: 1,
            infection_rate_percent: 0.0,
            max_group_size: 1,
            ..base_config()
        };
        // Under Ascending, subject 0's identifier is all-zero
        let result = run_trial_seeded(&config).unwrap();
        assert_eq!(result.potential_positives, vec![0]);

        // Under Complement it is all-ones, so nobody survives screening
        let config = TrialConfig {
            schemes: vec![Scheme::Complement],
            ..config
        };
        let result = run_trial_seeded(&config).unwrap();
        assert!(result.potential_positives.is_empty());
    }

    #[test]
    fn test_every_returned_group_reproduces_the_result() {
        let config = TrialConfig {
            subject_count: 32,
            infection_rate_percent: 10.0,
            schemes: vec![Scheme::Ascending, Scheme::Descending],
            max_group_size: 3,
            seed: Some(99),
            ..base_config()
        };
        let result = run_trial_seeded(&config).unwrap();
        let mut rng = config.rng();
        let ids = IdentifierSet::assign(config.subject_count, &config.schemes, &mut rng)
            .unwrap();
        for matches in result.match_groups_by_size.values() {
            for group in matches {
                let or = binary::or_all(group.iter().map(|&s| ids.code(s)));
                assert_eq!(or, result.test_result);
            }
        }
    }

    #[test]
    fn test_result_has_entry_for_every_size() {
        let config = TrialConfig {
            max_group_size: 4,
            ..base_config()
        };
        let result = run_trial_seeded(&config).unwrap();
        let sizes: Vec<usize> = result.match_groups_by_size.keys().copied().collect();
        assert_eq!(sizes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_validation_errors() {
        let config = TrialConfig {
            subject_count: 0,
            ..base_config()
        };
        assert!(matches!(
            run_trial_seeded(&config),
            Err(PoolError::InvalidSubjectCount(0))
        ));

        let config = TrialConfig {
            infection_rate_percent: 150.0,
            ..base_config()
        };
        assert!(matches!(
            run_trial_seeded(&config),
            Err(PoolError::InvalidInfectionRate(_))
        ));

        let config = TrialConfig {
            schemes: vec![],
            ..base_config()
        };
        assert!(matches!(
            run_trial_seeded(&config),
            Err(PoolError::EmptySchemeList)
        ));

        let config = TrialConfig {
            max_group_size: 65,
            ..base_config()
        };
        assert!(matches!(
            run_trial_seeded(&config),
            Err(PoolError::InvalidGroupSize { size: 65, max: 64 })
        ));
    }
}
