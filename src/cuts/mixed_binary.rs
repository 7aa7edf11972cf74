//! Lifted cover inequality for mixed binary knapsack sets.
//!
//! Applies when continuous variables are present but every integer is
//! binary. Cover coefficients are clipped at `lambda`, the remaining
//! integers are lifted through the piecewise-linear superadditive function
//! over the cover prefix sums.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::CDouble;
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Lift the cover inequality. Returns `false` when every cover
    /// coefficient is within `lambda` of zero, leaving nothing to lift
    /// from.
    pub(crate) fn separate_lifted_mixed_binary_cover(&mut self) -> bool {
        let epsilon = self.tol.epsilon;
        let coversize = self.cover.len();
        let len = self.inds.len();

        if coversize == 0 {
            return false;
        }

        let mut partial = vec![0.0_f64; coversize];
        let mut coverflag = vec![0_u8; len];
        for &j in &self.cover {
            coverflag[j] = 1;
        }

        {
            let vals = &self.vals;
            self.cover.sort_unstable_by(|&a, &b| vals[b].total_cmp(&vals[a]));
        }

        let lambda = self.lambda;

        // Prefix sums run over the cover members exceeding lambda.
        let mut sum = CDouble::ZERO;
        let mut p = coversize;
        for i in 0..coversize {
            if self.vals[self.cover[i]] - lambda <= epsilon {
                p = i;
                break;
            }
            sum += self.vals[self.cover[i]];
            partial[i] = f64::from(sum);
        }
        if p == 0 {
            return false;
        }

        let phi = |a: f64| -> f64 {
            for i in 0..p {
                if partial[i] - lambda >= a {
                    return f64::from(lambda * i as f64);
                }

                if a <= partial[i] {
                    return f64::from(lambda * (i + 1) as f64 + (CDouble::from(a) - partial[i]));
                }
            }

            f64::from(lambda * p as f64 + (CDouble::from(a) - partial[p - 1]))
        };

        self.rhs = -lambda;

        self.integral_coefficients = false;
        self.integral_support = true;
        for i in 0..len {
            if !self.lp.is_col_integral(self.inds[i]) {
                if self.vals[i] < 0.0 {
                    self.integral_support = false;
                } else {
                    self.vals[i] = 0.0;
                }
                continue;
            }

            if coverflag[i] != 0 {
                self.vals[i] = self.vals[i].min(f64::from(lambda));
                self.rhs += self.vals[i];
            } else {
                self.vals[i] = phi(self.vals[i]);
            }
        }

        true
    }
}
