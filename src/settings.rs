//! Configuration for the cut engine.

use crate::error::{CutError, CutResult};

/// Numerical tolerances, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    /// Feasibility tolerance of the MIP data. Coefficients at or below this
    /// magnitude are treated as noise and cancelled against bounds.
    pub feastol: f64,

    /// Base epsilon, at most `feastol`. Used for exact-tie detection in the
    /// lifting functions and for rounding guards in postprocessing.
    pub epsilon: f64,
}

impl Tolerances {
    /// Validate and build a tolerance pair. Requires `0 < epsilon <= feastol`.
    pub fn new(feastol: f64, epsilon: f64) -> CutResult<Self> {
        if !(feastol.is_finite() && epsilon.is_finite()) || epsilon <= 0.0 || epsilon > feastol {
            return Err(CutError::InvalidTolerances(format!(
                "need 0 < epsilon <= feastol, got epsilon = {}, feastol = {}",
                epsilon, feastol
            )));
        }
        Ok(Self { feastol, epsilon })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            feastol: 1e-6,
            epsilon: 1e-9,
        }
    }
}

/// Tunable parameters of the cut generation pipeline.
///
/// The c-MIR cutoffs are empirical; the defaults reproduce the values the
/// heuristic was tuned with.
#[derive(Debug, Clone)]
pub struct CutSettings {
    /// Smallest admissible c-MIR divisor candidate.
    pub min_cmir_delta: f64,

    /// Largest admissible c-MIR divisor candidate.
    pub max_cmir_delta: f64,

    /// Reject a divisor when `1 / ((1 - f0) * delta)` exceeds this bound.
    pub max_cmir_dynamism: f64,

    /// Constant part of the row length limit.
    pub max_len_offset: usize,

    /// Density part of the row length limit: rows longer than
    /// `max_len_offset + max_len_density * num_cols` are shortened or
    /// rejected.
    pub max_len_density: f64,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            min_cmir_delta: 1e-4,
            max_cmir_delta: 1e4,
            max_cmir_dynamism: 1e4,
            max_len_offset: 100,
            max_len_density: 0.15,
        }
    }
}
