//! Sparse inequalities and the bound-substitution transform interface.

use crate::error::{CutError, CutResult};

/// A sparse inequality `sum vals[k] * x[inds[k]] <= rhs`.
///
/// The entry operations take a row by mutable reference and overwrite it
/// with the strengthened cut on success.
#[derive(Debug, Clone, Default)]
pub struct SparseRow {
    /// Column indices, unique.
    pub inds: Vec<usize>,

    /// Coefficients, parallel to `inds`.
    pub vals: Vec<f64>,

    /// Right-hand side.
    pub rhs: f64,
}

impl SparseRow {
    /// Build a row, validating that the buffers are parallel.
    pub fn new(inds: Vec<usize>, vals: Vec<f64>, rhs: f64) -> CutResult<Self> {
        if inds.len() != vals.len() {
            return Err(CutError::InvalidRow(format!(
                "{} indices but {} values",
                inds.len(),
                vals.len()
            )));
        }
        Ok(Self { inds, vals, rhs })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inds.len()
    }

    /// Whether the row has no entries.
    pub fn is_empty(&self) -> bool {
        self.inds.is_empty()
    }

    /// Activity `sum vals[k] * x[inds[k]]` at a dense point.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.inds
            .iter()
            .zip(&self.vals)
            .map(|(&i, &v)| v * x[i])
            .sum()
    }

    /// Violation `activity - rhs` at a dense point; positive means violated.
    pub fn violation(&self, x: &[f64]) -> f64 {
        self.activity(x) - self.rhs
    }
}

/// Rewrites inequalities between the original variable space and the
/// complemented non-negative working space.
///
/// The forward direction substitutes bounds and eliminates implicit slack
/// variables so that every working variable satisfies `0 <= x <= upper`;
/// the backward direction undoes the substitution on a finished cut.
pub trait BoundTransform {
    /// Rewrite `row` into the working space.
    ///
    /// Fills `upper` with the finite working upper bound of each entry (or
    /// `f64::INFINITY`) and `solval` with the reference point to separate.
    /// Returns `None` when the row cannot be transformed, otherwise
    /// `Some(ints_positive)` where `ints_positive` reports that every
    /// integer entry ended up with a non-negative coefficient.
    fn transform(
        &mut self,
        row: &mut SparseRow,
        upper: &mut Vec<f64>,
        solval: &mut Vec<f64>,
    ) -> Option<bool>;

    /// Rewrite a finished cut back into the original space.
    ///
    /// `integral` advertises integral support and coefficients, allowing
    /// the transform to round slack multipliers. Returns `false` when the
    /// cut cannot be untransformed and must be discarded.
    fn untransform(&mut self, row: &mut SparseRow, integral: bool) -> bool;
}
