//! # Poolscreen Core
//!
//! Core algorithms for simulating non-adaptive pooled (group) testing.
//!
//! ## Overview
//!
//! A population of N subjects is assigned overlapping fixed-width binary
//! identifiers; each bit position is one pooled test. A random subset of
//! subjects is infected, and the observed result vector is the bitwise OR
//! of the infected identifiers: a pool reads positive iff at least one
//! infected subject participates in it. The decoder then works backwards
//! from the result vector alone:
//!
//! - **screening** removes every subject with a 1 in a negative pool;
//!   the survivors are the potential positives (necessary condition), and
//! - **reconstruction** exhaustively searches combinations of potential
//!   positives whose OR reproduces the result exactly (sufficient
//!   condition); each match is one consistent explanation.
//!
//! The OR channel is lossy, so several explanations may coexist; all of
//! them are returned, never just one.
//!
//! ## Pipeline
//!
//! ```text
//! binary codec → identifier schemes → infection draw → OR-aggregate
//!                                                          │
//!               match groups ← combination search ← submask screening
//! ```
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_core::prelude::*;
//!
//! let config = TrialConfig {
//!     subject_count: 100,
//!     infection_rate_percent: 3.0,
//!     schemes: vec![Scheme::Ascending, Scheme::Complement],
//!     max_group_size: 2,
//!     seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let result = run_trial_seeded(&config).unwrap();
//! assert_eq!(result.identifier_width, 14); // 7 bits per scheme
//! for subject in &result.infected {
//!     assert!(result.potential_positives.contains(subject));
//! }
//! ```

pub mod binary;
pub mod decoder;
pub mod pool;
pub mod scheme;
pub mod trial;
pub mod types;

// Parallel reconstruction search (requires `parallel` feature)
#[cfg(feature = "parallel")]
pub mod parallel;

// Re-export main types
pub use decoder::{DecoderConfig, MatchGroup, MatchGroupsBySize};
pub use pool::{InfectionModel, PoolConfig};
pub use scheme::{IdentifierSet, Scheme};
pub use trial::{run_trial, run_trial_seeded, TrialConfig, TrialResult};
pub use types::{Code, PoolError, PoolResult, SubjectId, MAX_IDENTIFIER_WIDTH};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::decoder::{DecoderConfig, MatchGroup, MatchGroupsBySize};
    pub use crate::pool::{InfectionModel, PoolConfig};
    pub use crate::scheme::{IdentifierSet, Scheme};
    pub use crate::trial::{run_trial, run_trial_seeded, TrialConfig, TrialResult};
    pub use crate::types::{Code, PoolError, PoolResult, SubjectId};
}
