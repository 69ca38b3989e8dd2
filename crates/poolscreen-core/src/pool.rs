//! Pool Simulation — infection draws and OR-aggregation
//!
//! Marks a random subset of the population infected, then computes the
//! observed test-result vector as the bitwise OR of the infected subjects'
//! identifiers. Each bit of the result is one pooled test: it reads 1 iff
//! at least one infected subject participates in that pool. The OR channel
//! is lossy on purpose; recovering the infected set from the result alone
//! is the decoder's job.
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_core::pool::{self, PoolConfig};
//! use poolscreen_core::scheme::{IdentifierSet, Scheme};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let ids = IdentifierSet::assign(8, &[Scheme::Ascending], &mut rng).unwrap();
//!
//! let config = PoolConfig { infection_rate_percent: 25.0, ..Default::default() };
//! let infected = pool::draw_infected(&config, ids.len(), &mut rng).unwrap();
//! let observed = pool::aggregate(&ids, &infected);
//!
//! // Every infected identifier is covered by the aggregated result
//! for &subject in &infected {
//!     assert_eq!(ids.code(subject) | observed, observed);
//! }
//! ```

use rand::rngs::StdRng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

use crate::binary;
use crate::scheme::IdentifierSet;
use crate::types::{Code, PoolError, PoolResult, SubjectId};

/// How the infected subset is drawn from the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfectionModel {
    /// Independent per-subject draw at `rate/100`. The realized infected
    /// count varies trial to trial around `N * rate / 100`.
    Bernoulli,
    /// Exactly `round(N * rate / 100)` distinct subjects, uniformly chosen.
    FixedCount,
}

impl Default for InfectionModel {
    fn default() -> Self {
        Self::Bernoulli
    }
}

/// Pooling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Infection rate as a percentage in [0, 100].
    pub infection_rate_percent: f64,
    /// Draw model for the infected subset.
    pub model: InfectionModel,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            infection_rate_percent: 2.0,
            model: InfectionModel::Bernoulli,
        }
    }
}

impl PoolConfig {
    /// Check the rate is a finite percentage.
    pub fn validate(&self) -> PoolResult<()> {
        let rate = self.infection_rate_percent;
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(PoolError::InvalidInfectionRate(rate));
        }
        Ok(())
    }
}

/// Draw the infected subset, sorted by subject index.
pub fn draw_infected(
    config: &PoolConfig,
    subject_count: usize,
    rng: &mut StdRng,
) -> PoolResult<Vec<SubjectId>> {
    config.validate()?;
    let rate = config.infection_rate_percent;

    match config.model {
        InfectionModel::Bernoulli => {
            let draw = Bernoulli::new(rate / 100.0)
                .map_err(|_| PoolError::InvalidInfectionRate(rate))?;
            Ok((0..subject_count)
                .filter(|_| draw.sample(rng))
                .collect())
        }
        InfectionModel::FixedCount => {
            let count = (subject_count as f64 * rate / 100.0).round() as usize;
            let mut infected = rand::seq::index::sample(rng, subject_count, count).into_vec();
            infected.sort_unstable();
            Ok(infected)
        }
    }
}

/// Observed test-result vector: bitwise OR of the infected identifiers.
///
/// The OR over an empty infected set is the all-zero vector.
pub fn aggregate(ids: &IdentifierSet, infected: &[SubjectId]) -> Code {
    binary::or_all(infected.iter().map(|&subject| ids.code(subject)))
}
