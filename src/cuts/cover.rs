//! Cover determination.
//!
//! A cover is a set of integer positions whose combined upper-bound
//! contribution exceeds the right-hand side. The greedy choice follows the
//! reference point: variables sitting at their upper bound are taken first
//! on the LP path, the remainder is ordered by activity contribution with a
//! reproducible hash tiebreak.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::{hash, CDouble};
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Select a cover of the working row and fix `coverweight` and
    /// `lambda`. Returns `false` when no valid cover exists.
    pub(crate) fn determine_cover(&mut self, lp_sol: bool) -> bool {
        let feastol = self.tol.feastol;

        if self.rhs <= 10.0 * feastol {
            return false;
        }

        self.cover.clear();
        for j in 0..self.inds.len() {
            if !self.lp.is_col_integral(self.inds[j]) {
                continue;
            }
            if self.solval[j] <= feastol {
                continue;
            }
            self.cover.push(j);
        }

        let max_cover_size = self.cover.len();
        let mut coversize = 0;
        self.coverweight = CDouble::ZERO;

        if lp_sol {
            // Variables at their upper bound always enter the cover.
            let solval = &self.solval;
            let upper = &self.upper;
            let (at_upper, rest): (Vec<usize>, Vec<usize>) = self
                .cover
                .drain(..)
                .partition(|&j| solval[j] >= upper[j] - feastol);

            coversize = at_upper.len();
            self.cover.extend(at_upper);
            self.cover.extend(rest);

            for k in 0..coversize {
                let j = self.cover[k];
                self.coverweight += self.vals[j] * self.upper[j];
            }
        }

        // Sort the remaining candidates by their contribution to the row
        // activity at the reference point. Equal contributions prefer the
        // larger coefficient, which makes the lifting functions more likely
        // to produce a facet; exact ties fall back to a reproducible
        // pseudo-random order salted with the pool size.
        let pool_size = self.pool.num_cuts();
        {
            let solval = &self.solval;
            let vals = &self.vals;
            let inds = &self.inds;
            self.cover[coversize..].sort_unstable_by(|&i, &j| {
                let contribution_i = solval[i] * vals[i];
                let contribution_j = solval[j] * vals[j];
                contribution_j
                    .total_cmp(&contribution_i)
                    .then_with(|| vals[j].total_cmp(&vals[i]))
                    .then_with(|| {
                        hash::tiebreak(inds[j], pool_size).cmp(&hash::tiebreak(inds[i], pool_size))
                    })
            });
        }

        let minlambda = (10.0 * feastol).max(feastol * f64::from(self.rhs).abs());

        while coversize != max_cover_size {
            let lambda = f64::from(self.coverweight - self.rhs);
            if lambda > minlambda {
                break;
            }

            let j = self.cover[coversize];
            self.coverweight += self.vals[j] * self.upper[j];
            coversize += 1;
        }

        if coversize == 0 {
            return false;
        }

        self.coverweight.renormalize();
        self.lambda = self.coverweight - self.rhs;

        if self.lambda <= minlambda {
            return false;
        }

        self.cover.truncate(coversize);
        debug_assert!(self.lambda > feastol);

        true
    }
}
