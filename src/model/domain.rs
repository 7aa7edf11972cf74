//! Variable domain interface.

/// Bound information for the original variable space.
///
/// The engine queries two domains: the global domain (bounds valid at the
/// root) when substituting bounds in the conflict path and when undoing
/// complementation, and a local domain describing the infeasible subproblem
/// whose proof is being strengthened.
pub trait Domain {
    /// Lower bound of a column, `f64::NEG_INFINITY` when unbounded.
    fn col_lower(&self, col: usize) -> f64;

    /// Upper bound of a column, `f64::INFINITY` when unbounded.
    fn col_upper(&self, col: usize) -> f64;

    /// Strengthen coefficients of a finished cut against the domain.
    ///
    /// Called once per accepted cut, immediately before pool submission.
    /// The default implementation leaves the cut unchanged.
    fn tighten_coefficients(&self, _inds: &[usize], _vals: &mut [f64], _rhs: &mut f64) {}
}
