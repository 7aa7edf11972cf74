//! Error types for the cut generation library.

use thiserror::Error;

/// Errors raised by fallible constructors.
///
/// The separation entry points themselves never error: every numerical or
/// combinatorial dead end is a silent rejection reported as `false`.
#[derive(Error, Debug)]
pub enum CutError {
    /// Tolerance configuration is unusable.
    #[error("invalid tolerances: {0}")]
    InvalidTolerances(String),

    /// A sparse row was constructed with inconsistent buffers.
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Result type for cut generation operations.
pub type CutResult<T> = Result<T, CutError>;
