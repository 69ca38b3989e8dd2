//! Identifier Schemes — assigning binary codes to subjects
//!
//! Each subject in a population of N gets one fixed-width code per
//! requested scheme; the concatenation of those codes, in request order,
//! is the subject's identifier. Every bit position of the identifier
//! corresponds to one pooled test: the subject participates in exactly the
//! pools where its identifier has a 1.
//!
//! All four schemes are bijections over the index range for a fixed N, so
//! within one scheme no two subjects share a code. Stacking schemes widens
//! the identifier and thins out the OR-channel's ambiguity.
//!
//! ## Example
//!
//! ```rust
//! use poolscreen_core::scheme::{IdentifierSet, Scheme};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let ids = IdentifierSet::assign(4, &[Scheme::Ascending], &mut rng).unwrap();
//!
//! // N = 4 needs 3-bit codes ("100" for the count itself), one per subject
//! assert_eq!(ids.width(), 3);
//! assert_eq!(ids.code(0), 0b000);
//! assert_eq!(ids.code(3), 0b011);
//! ```

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::binary::{self, bit_width};
use crate::types::{Code, PoolError, PoolResult, SubjectId, MAX_IDENTIFIER_WIDTH};

/// How a subject index maps to its per-scheme code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Code of subject `i` is `i` itself.
    Ascending,
    /// Code of subject `i` is `N-1-i`, reversing the ascending assignment.
    Descending,
    /// Codes are a uniformly random permutation of the index range,
    /// drawn fresh on every assignment.
    Random,
    /// Bitwise complement of the ascending code.
    Complement,
}

impl Scheme {
    /// All schemes, in declaration order.
    pub fn all() -> Vec<Scheme> {
        vec![
            Scheme::Ascending,
            Scheme::Descending,
            Scheme::Random,
            Scheme::Complement,
        ]
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Ascending => write!(f, "ascending"),
            Scheme::Descending => write!(f, "descending"),
            Scheme::Random => write!(f, "random"),
            Scheme::Complement => write!(f, "complement"),
        }
    }
}

/// The identifiers of one population, immutable once assigned.
///
/// Holds one code word per subject plus the width metadata needed to
/// interpret them: `code_width` bits per scheme block, `width` bits total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSet {
    codes: Vec<Code>,
    schemes: Vec<Scheme>,
    code_width: usize,
    width: usize,
}

impl IdentifierSet {
    /// Assign identifiers to `subject_count` subjects under the requested
    /// schemes, concatenated in request order (earlier schemes occupy the
    /// higher-order bits).
    ///
    /// A scheme may repeat; each repetition adds its own code block. The
    /// random permutation behind [`Scheme::Random`] is drawn from `rng`
    /// once per occurrence, so a repeated `Random` yields two independent
    /// permutations.
    pub fn assign(
        subject_count: usize,
        schemes: &[Scheme],
        rng: &mut StdRng,
    ) -> PoolResult<Self> {
        if subject_count == 0 {
            return Err(PoolError::InvalidSubjectCount(subject_count));
        }
        if schemes.is_empty() {
            return Err(PoolError::EmptySchemeList);
        }

        let code_width = bit_width(subject_count as u64);
        let width = code_width * schemes.len();
        if width > MAX_IDENTIFIER_WIDTH {
            return Err(PoolError::IdentifierTooWide {
                width,
                max: MAX_IDENTIFIER_WIDTH,
            });
        }

        let mut codes: Vec<Code> = vec![0; subject_count];
        for &scheme in schemes {
            let block = scheme_codes(scheme, subject_count, code_width, rng)?;
            for (identifier, code) in codes.iter_mut().zip(block) {
                *identifier = (*identifier << code_width) | code;
            }
        }

        Ok(Self {
            codes,
            schemes: schemes.to_vec(),
            code_width,
            width,
        })
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True if the population is empty (never the case after `assign`).
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Total identifier width in bits: one pooled test per bit.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Width of a single scheme's code block.
    pub fn code_width(&self) -> usize {
        self.code_width
    }

    /// Schemes in concatenation order.
    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    /// Identifier of one subject.
    pub fn code(&self, subject: SubjectId) -> Code {
        self.codes[subject]
    }

    /// All identifiers, indexed by subject.
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }
}

/// One scheme's code column: `codes[i]` is the code of subject `i`.
fn scheme_codes(
    scheme: Scheme,
    subject_count: usize,
    code_width: usize,
    rng: &mut StdRng,
) -> PoolResult<Vec<Code>> {
    let n = subject_count as u64;
    match scheme {
        Scheme::Ascending => (0..n)
            .map(|i| binary::to_fixed_width(i, code_width))
            .collect(),
        Scheme::Descending => (0..n)
            .map(|i| binary::to_fixed_width(n - 1 - i, code_width))
            .collect(),
        Scheme::Random => {
            let mut permuted: Vec<u64> = (0..n).collect();
            permuted.shuffle(rng);
            permuted
                .into_iter()
                .map(|p| binary::to_fixed_width(p, code_width))
                .collect()
        }
        Scheme::Complement => (0..n)
            .map(|i| {
                binary::to_fixed_width(i, code_width)
                    .map(|code| binary::complement(code, code_width))
            })
            .collect(),
    }
}
