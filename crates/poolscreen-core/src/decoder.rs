//! Decoder — candidate screening and exact group reconstruction
//!
//! Works back from the observed test-result vector to the subjects that
//! could explain it, in two stages:
//!
//! 1. **Screening** (necessary condition): a subject can be infected only
//!    if its identifier is a submask of the observed result. Anyone with a
//!    1 in a pool that tested negative is cleared. The survivors are the
//!    potential positives, always a superset of the true infected set.
//! 2. **Reconstruction** (sufficient condition): exhaustively enumerate
//!    combinations of potential positives, size 1 up to a configured
//!    maximum, and keep every combination whose OR-aggregate reproduces
//!    the observed result exactly. Several groups may qualify; the OR
//!    channel cannot distinguish them, so all are returned.
//!
//! The search cost is `C(candidates, g)` per group size. Capping
//! `max_group_size` is the primary cost control; `combination_budget`
//! optionally bounds the total number of evaluated combinations and fails
//! the decode atomically when exceeded.
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_core::decoder::{self, DecoderConfig};
//! use poolscreen_core::scheme::{IdentifierSet, Scheme};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let ids = IdentifierSet::assign(4, &[Scheme::Ascending], &mut rng).unwrap();
//!
//! // Infected {1, 2}: observed = "001" | "010" = "011"
//! let observed = 0b011;
//! let candidates = decoder::screen(&ids, observed);
//! assert_eq!(candidates, vec![0, 1, 2, 3]);
//!
//! let groups =
//!     decoder::find_match_groups(&ids, &candidates, observed, &DecoderConfig::default())
//!         .unwrap();
//! // Subject 3 alone explains the result, and so do {1, 2} and {0, 3}
//! assert_eq!(groups[&1], vec![vec![3]]);
//! assert!(groups[&2].contains(&vec![1, 2]));
//! assert!(groups[&2].contains(&vec![0, 3]));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binary;
use crate::scheme::IdentifierSet;
use crate::types::{Code, PoolError, PoolResult, SubjectId};

/// A set of subjects whose combined OR equals the observed result.
pub type MatchGroup = Vec<SubjectId>;

/// Reconstruction output: group size → all matching groups of that size.
/// Sizes with no match map to an empty list, never omitted.
pub type MatchGroupsBySize = BTreeMap<usize, Vec<MatchGroup>>;

/// Reconstruction search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Largest group size to enumerate, inclusive.
    pub max_group_size: usize,
    /// Optional cap on the total number of combinations evaluated across
    /// all sizes. Exceeding it fails the decode with
    /// [`PoolError::SearchBudgetExceeded`]; no partial result is returned.
    pub combination_budget: Option<u64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_group_size: 2,
            combination_budget: None,
        }
    }
}

/// Stage 1: subjects whose identifier is a submask of the observed result,
/// in subject-index order.
///
/// Guaranteed to contain every truly infected subject; typically contains
/// more, since a subject fully covered by other infected subjects' pools
/// is indistinguishable from an infected one.
pub fn screen(ids: &IdentifierSet, observed: Code) -> Vec<SubjectId> {
    ids.codes()
        .iter()
        .enumerate()
        .filter(|(_, &code)| binary::is_submask(code, observed))
        .map(|(subject, _)| subject)
        .collect()
}

/// Stage 2: for every group size `1..=max_group_size`, every combination
/// of `candidates` whose OR-aggregate equals `observed` exactly.
///
/// Combinations are enumerated in lexicographic order over candidate
/// positions; group members are reported in subject-index order. Sizes
/// larger than the candidate pool yield empty lists.
pub fn find_match_groups(
    ids: &IdentifierSet,
    candidates: &[SubjectId],
    observed: Code,
    config: &DecoderConfig,
) -> PoolResult<MatchGroupsBySize> {
    if config.max_group_size == 0 {
        return Err(PoolError::InvalidGroupSize {
            size: 0,
            max: ids.len(),
        });
    }

    let mut evaluated: u64 = 0;
    let mut groups = MatchGroupsBySize::new();
    for size in 1..=config.max_group_size {
        let mut matches = Vec::new();
        for combo in Combinations::new(candidates.len(), size) {
            evaluated += 1;
            if let Some(budget) = config.combination_budget {
                if evaluated > budget {
                    return Err(PoolError::SearchBudgetExceeded { evaluated, budget });
                }
            }
            if or_of(ids, candidates, &combo) == observed {
                matches.push(combo.iter().map(|&pos| candidates[pos]).collect());
            }
        }
        groups.insert(size, matches);
    }
    Ok(groups)
}

/// OR-aggregate of the candidates at the given positions.
pub(crate) fn or_of(ids: &IdentifierSet, candidates: &[SubjectId], positions: &[usize]) -> Code {
    positions
        .iter()
        .fold(0, |acc, &pos| acc | ids.code(candidates[pos]))
}

/// Binomial coefficient C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k); // symmetry
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    result as u64
}

/// Lexicographic enumeration of all k-combinations of `0..n`.
///
/// Yields each combination as a sorted `Vec<usize>` of positions. The
/// iterator holds one k-slot odometer rather than materializing the full
/// `C(n, k)` set, so callers can cap or split the stream.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// Combinations of `k` positions drawn from `0..n`. `k > n` yields
    /// nothing; `k == 0` yields the single empty combination.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance the rightmost slot that has room, reset the tail.
        let mut slot = self.k;
        loop {
            if slot == 0 {
                self.done = true;
                break;
            }
            slot -= 1;
            if self.indices[slot] != slot + self.n - self.k {
                self.indices[slot] += 1;
                for next in slot + 1..self.k {
                    self.indices[next] = self.indices[next - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}
