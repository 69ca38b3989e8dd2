//! Core types for pooled-testing simulation
//!
//! This module defines the fundamental types shared across the pipeline:
//! subject indices, binary code words, and the error taxonomy.
//!
//! ## Code words
//!
//! A code (and an identifier, which is a concatenation of codes) is stored
//! as a `u64` word interpreted at an explicit bit width. Bit 0 of the word
//! is the rightmost digit of the written-out binary string, so the value
//! `0b01` at width 2 is the code "01". All pooling and decoding operations
//! (OR-aggregation, submask tests, complementation) are single machine ops
//! on the word; see [`crate::binary`] for conversions to and from explicit
//! bit sequences.

/// Index of a subject within a population, in `0..subject_count`.
pub type SubjectId = usize;

/// A binary code word, valid in its low `width` bits.
pub type Code = u64;

/// Widest identifier a single code word can hold.
///
/// `bit_width(N) × schemes.len()` must not exceed this; wider requests
/// fail with [`PoolError::IdentifierTooWide`].
pub const MAX_IDENTIFIER_WIDTH: usize = Code::BITS as usize;

/// Result type for pooled-testing operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while assigning identifiers, pooling, or decoding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    #[error("Invalid subject count: {0}. Must be at least 1")]
    InvalidSubjectCount(usize),

    #[error("Invalid infection rate: {0}%. Must be a finite value in [0, 100]")]
    InvalidInfectionRate(f64),

    #[error("Scheme list is empty. At least one identifier scheme is required")]
    EmptySchemeList,

    #[error("Invalid max group size: {size}. Must be between 1 and {max}")]
    InvalidGroupSize { size: usize, max: usize },

    #[error("Value {value} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: usize },

    #[error("Identifier width {width} exceeds the {max}-bit code word")]
    IdentifierTooWide { width: usize, max: usize },

    #[error("Combination search budget exceeded: evaluated {evaluated} of allowed {budget}")]
    SearchBudgetExceeded { evaluated: u64, budget: u64 },
}
