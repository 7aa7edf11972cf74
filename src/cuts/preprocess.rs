//! Base inequality preprocessing.
//!
//! Before any strengthening runs, the working row is rescaled by a power of
//! two so the largest coefficient lands in `[0.5, 1)`, coefficients below
//! the feasibility tolerance are cancelled against bounds, the row is
//! classified by variable structure, and over-long rows are shortened by
//! cancelling entries whose reference point leaves no slack.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::{exponent, ldexp};
use crate::CutEngine;

/// Structure flags of the preprocessed row, deciding the strengthening
/// route.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowShape {
    /// Some integer variable has no finite upper bound; lifting is unsafe
    /// and the row goes to the c-MIR heuristic.
    pub(crate) has_unbounded_ints: bool,

    /// Some integer variable has an upper bound other than one.
    pub(crate) has_general_ints: bool,

    /// Some variable is continuous.
    pub(crate) has_continuous: bool,
}

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Clean and classify the working row in place.
    ///
    /// Returns `None` when the row is trivially redundant or cannot be
    /// cleaned without an unbounded variable absorbing a tiny coefficient.
    pub(crate) fn preprocess_base_inequality(&mut self) -> Option<RowShape> {
        let feastol = self.tol.feastol;
        let len = self.inds.len();

        let mut shape = RowShape::default();
        let mut num_zeros = 0usize;
        let mut maxact = -feastol;

        let max_abs = self.vals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let expshift = -exponent(max_abs);

        // Center the largest coefficient in [0.5, 1) by an exact power of
        // two so that all later rounding is reproducible.
        self.rhs *= ldexp(1.0, expshift);
        for v in &mut self.vals {
            *v = ldexp(*v, expshift);
        }

        for i in 0..len {
            if self.vals[i].abs() <= feastol {
                if self.vals[i] < 0.0 {
                    // A tiny negative term can only be removed by absorbing
                    // its bound contribution into the right-hand side.
                    if self.upper[i] == f64::INFINITY {
                        return None;
                    }
                    self.rhs -= self.vals[i] * self.upper[i];
                }

                num_zeros += 1;
                self.vals[i] = 0.0;
                continue;
            }

            if !self.lp.is_col_integral(self.inds[i]) {
                shape.has_continuous = true;

                if self.vals[i] > 0.0 {
                    if self.upper[i] == f64::INFINITY {
                        maxact = f64::INFINITY;
                    } else {
                        maxact += self.vals[i] * self.upper[i];
                    }
                }
            } else {
                if self.upper[i] == f64::INFINITY {
                    shape.has_unbounded_ints = true;
                    shape.has_general_ints = true;
                    if self.vals[i] > 0.0 {
                        maxact = f64::INFINITY;
                    }
                    if maxact == f64::INFINITY {
                        break;
                    }
                } else if self.upper[i] != 1.0 {
                    shape.has_general_ints = true;
                }

                if self.vals[i] > 0.0 {
                    maxact += self.vals[i] * self.upper[i];
                }
            }
        }

        let max_len = self.settings.max_len_offset
            + (self.settings.max_len_density * self.lp.num_cols() as f64) as usize;

        if len - num_zeros > max_len {
            let num_cancel = len - num_zeros - max_len;

            // Entries whose reference point leaves no slack can be cancelled
            // without changing the violation of the base inequality.
            let mut cancel_nzs: Vec<usize> = Vec::new();
            for i in 0..len {
                if self.vals[i] == 0.0 {
                    continue;
                }
                let cancel_slack = if self.vals[i] > 0.0 {
                    self.solval[i]
                } else {
                    self.upper[i] - self.solval[i]
                };
                if cancel_slack <= feastol {
                    cancel_nzs.push(i);
                }
            }

            if cancel_nzs.len() < num_cancel {
                return None;
            }

            if cancel_nzs.len() > num_cancel {
                let vals = &self.vals;
                cancel_nzs.sort_unstable_by(|&a, &b| vals[a].abs().total_cmp(&vals[b].abs()));
            }

            for &j in cancel_nzs.iter().take(num_cancel) {
                if self.vals[j] < 0.0 {
                    self.rhs -= self.vals[j] * self.upper[j];
                } else {
                    maxact -= self.vals[j] * self.upper[j];
                }
                self.vals[j] = 0.0;
            }

            num_zeros += num_cancel;
        }

        if num_zeros != 0 {
            self.compact_zeros(num_zeros);
        }

        if self.rhs < maxact {
            Some(shape)
        } else {
            None
        }
    }

    /// Remove zero coefficients in place, filling each hole with the
    /// current last entry. The resulting order is deterministic and all
    /// downstream ordering depends on it.
    fn compact_zeros(&mut self, num_zeros: usize) {
        let track_complementation = !self.complementation.is_empty();
        let mut remaining = num_zeros;
        let mut i = self.inds.len();

        while i > 0 {
            i -= 1;
            if self.vals[i] != 0.0 {
                continue;
            }

            self.inds.swap_remove(i);
            self.vals.swap_remove(i);
            self.upper.swap_remove(i);
            self.solval.swap_remove(i);
            if track_complementation {
                self.complementation.swap_remove(i);
            }

            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
    }
}
