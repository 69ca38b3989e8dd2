//! Parallel Decoding Module
//!
//! Rayon-backed implementation of the reconstruction search. Enable with
//! the `parallel` feature flag:
//!
//! ```toml
//! [dependencies]
//! poolscreen-core = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! The combination space for each group size is partitioned by the first
//! candidate position; each partition walks its lexicographic tail
//! sequentially. Correctness never depends on this module: for any input,
//! [`find_match_groups_parallel`] returns exactly the groups that
//! [`crate::decoder::find_match_groups`] returns, in the same order.
//!
//! Parallelization pays off when the candidate pool is large or
//! `max_group_size` exceeds 2; below that the spawn overhead dominates.

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::decoder::{or_of, Combinations, DecoderConfig, MatchGroup, MatchGroupsBySize};
use crate::scheme::IdentifierSet;
use crate::types::{Code, PoolError, PoolResult, SubjectId};

/// Parallel equivalent of [`crate::decoder::find_match_groups`].
///
/// The only observable difference is under a `combination_budget`
/// overrun: both paths fail with [`PoolError::SearchBudgetExceeded`], but
/// the `evaluated` count reported by the parallel path depends on thread
/// interleaving.
pub fn find_match_groups_parallel(
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

    let evaluated = AtomicU64::new(0);
    let mut groups = MatchGroupsBySize::new();
    for size in 1..=config.max_group_size {
        let per_first: Vec<Vec<MatchGroup>> = first_positions(candidates.len(), size)
            .into_par_iter()
            .map(|first| {
                search_partition(ids, candidates, observed, config, size, first, &evaluated)
            })
            .collect::<PoolResult<_>>()?;
        groups.insert(size, per_first.into_iter().flatten().collect());
    }
    Ok(groups)
}

/// Valid first positions for size-`k` combinations of `0..n`.
fn first_positions(n: usize, k: usize) -> Vec<usize> {
    if k > n {
        return Vec::new();
    }
    (0..=n - k).collect()
}

/// All matches of the given size whose combination starts at `first`.
fn search_partition(
    ids: &IdentifierSet,
    candidates: &[SubjectId],
    observed: Code,
    config: &DecoderConfig,
    size: usize,
    first: usize,
    evaluated: &AtomicU64,
) -> PoolResult<Vec<MatchGroup>> {
    let tail = candidates.len() - first - 1;
    let mut matches = Vec::new();
    let mut combo = vec![0usize; size];
    combo[0] = first;
    for tail_combo in Combinations::new(tail, size - 1) {
        for (slot, pos) in tail_combo.into_iter().enumerate() {
            combo[slot + 1] = first + 1 + pos;
        }
        let count = evaluated.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(budget) = config.combination_budget {
            if count > budget {
                return Err(PoolError::SearchBudgetExceeded {
                    evaluated: count,
                    budget,
                });
            }
        }
        if or_of(ids, candidates, &combo) == observed {
            matches.push(combo.iter().map(|&pos| candidates[pos]).collect());
        }
    }
    Ok(matches)
}
