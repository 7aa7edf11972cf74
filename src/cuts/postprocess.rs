//! Cut postprocessing.
//!
//! Finished cuts are brought into a numerically safe range. Integral
//! support admits a search for a scale that makes every coefficient an
//! integer; otherwise the row is normalized by a power of two and tiny
//! coefficients are cancelled against bounds.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::{exponent, integral_scale, ldexp, CDouble};
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Rescale and clean the working cut. Returns `false` when a tiny
    /// coefficient can only be removed through a bound that is infinite.
    pub(crate) fn postprocess_cut(&mut self) -> bool {
        let feastol = self.tol.feastol;
        let epsilon = self.tol.epsilon;
        let len = self.inds.len();

        if self.integral_support {
            if self.integral_coefficients {
                return true;
            }

            let mut max_abs = self.vals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

            let min_coefficient_value = (max_abs * 100.0 * feastol).max(epsilon);
            for i in 0..len {
                if self.vals[i] == 0.0 {
                    continue;
                }
                if self.vals[i].abs() <= min_coefficient_value {
                    if self.vals[i] < 0.0 {
                        if self.upper[i] == f64::INFINITY {
                            return false;
                        }
                        self.rhs -= self.upper[i] * self.vals[i];
                    }
                    self.vals[i] = 0.0;
                }
            }

            let nonzero: Vec<f64> = self.vals.iter().copied().filter(|&v| v != 0.0).collect();
            let intscale = integral_scale(&nonzero, feastol, epsilon);

            let mut scale_smallest_to_one = true;

            if let Some(scale) = intscale {
                // The scale is only rejected once the integral values leave
                // the range where doubles represent integers exactly.
                if scale * max_abs.max(1.0) <= ldexp(1.0, 53) {
                    self.rhs.renormalize();
                    self.rhs *= scale;
                    max_abs = (max_abs * scale).round();

                    for i in 0..len {
                        if self.vals[i] == 0.0 {
                            continue;
                        }

                        let scaleval = CDouble::from(self.vals[i]) * scale;
                        let intval = scaleval.round();
                        let delta = f64::from(scaleval - intval);

                        self.vals[i] = f64::from(intval);

                        // Rounding must never strengthen a coefficient; the
                        // upper bound constraint compensates and weakens the
                        // right-hand side instead.
                        if delta < 0.0 {
                            if self.upper[i] == f64::INFINITY {
                                return false;
                            }
                            self.rhs -= delta * self.upper[i];
                        }
                    }

                    // Rounding down recovers most of the weakening above.
                    self.rhs = (self.rhs + epsilon).floor();

                    if scale * max_abs * feastol <= 1.0 {
                        scale_smallest_to_one = false;
                        self.integral_coefficients = true;
                    }
                }
            }

            if scale_smallest_to_one {
                let min_abs = self
                    .vals
                    .iter()
                    .filter(|&&v| v != 0.0)
                    .fold(f64::INFINITY, |acc, v| acc.min(v.abs()));

                let expshift = -exponent(min_abs - epsilon);

                self.rhs = CDouble::from(ldexp(f64::from(self.rhs), expshift));
                for v in &mut self.vals {
                    if *v != 0.0 {
                        *v = ldexp(*v, expshift);
                    }
                }
            }
        } else {
            let max_abs = self.vals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

            let expshift = -exponent(max_abs);
            let min_coefficient_value = ldexp(max_abs * 100.0 * feastol, expshift);

            self.rhs = CDouble::from(ldexp(f64::from(self.rhs), expshift));

            for i in 0..len {
                if self.vals[i] == 0.0 {
                    continue;
                }

                self.vals[i] = ldexp(self.vals[i], expshift);

                if self.vals[i].abs() <= min_coefficient_value {
                    if self.vals[i] < 0.0 {
                        if self.upper[i] == f64::INFINITY {
                            return false;
                        }
                        self.rhs -= self.vals[i] * self.upper[i];
                    } else {
                        self.vals[i] = 0.0;
                    }
                }
            }
        }

        true
    }
}
