//! Complemented mixed-integer rounding heuristic.
//!
//! Used when an unbounded integer variable makes the lifting procedures
//! unsafe. The heuristic searches a deduplicated list of divisor candidates
//! for the MIR formula with the best efficacy, then tries power-of-two
//! multiples of the winner and per-variable complementation flips.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::CDouble;
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Flip the complementation state of one working entry.
    pub(crate) fn flip_complementation(&mut self, i: usize) {
        self.complementation[i] = 1 - self.complementation[i];
        self.solval[i] = self.upper[i] - self.solval[i];
        self.rhs -= self.upper[i] * self.vals[i];
        self.vals[i] = -self.vals[i];
    }

    /// Efficacy of the MIR cut for one divisor, or `None` when the divisor
    /// violates the fractionality window or the dynamism bound.
    fn cmir_efficacy(
        &self,
        delta: f64,
        integer_inds: &[usize],
        continuous_contribution: CDouble,
        continuous_sqrnorm: CDouble,
    ) -> Option<f64> {
        let scale = 1.0 / CDouble::from(delta);
        let scalrhs = self.rhs * scale;
        let downrhs = f64::from(scalrhs).floor();

        let f0 = scalrhs - downrhs;
        if f0 < 0.01 || f0 > 0.99 {
            return None;
        }
        let one_over_one_minus_f0 = 1.0 / (1.0 - f0);
        if f64::from(one_over_one_minus_f0) * f64::from(scale) > self.settings.max_cmir_dynamism {
            return None;
        }

        let mut sqrnorm = scale * scale * continuous_sqrnorm;
        let mut viol = continuous_contribution * one_over_one_minus_f0 - scalrhs;

        for &j in integer_inds {
            let scalaj = scale * self.vals[j];
            let downaj = f64::from(scalaj).floor();
            let fj = scalaj - downaj;
            let aj = if fj > f0 {
                f64::from(CDouble::from(downaj) + fj - f0)
            } else {
                downaj
            };

            viol += aj * self.solval[j];
            sqrnorm += aj * aj;
        }

        Some(f64::from(viol / sqrnorm.sqrt()))
    }

    /// Search divisors and complementations and emit the best MIR cut into
    /// the working row. Returns `false` when no divisor is acceptable.
    pub(crate) fn cmir_cut_generation_heuristic(&mut self) -> bool {
        let feastol = self.tol.feastol;
        let len = self.inds.len();

        let mut deltas: Vec<f64> = Vec::new();
        let mut continuous_contribution = CDouble::ZERO;
        let mut continuous_sqrnorm = CDouble::ZERO;
        let mut integer_inds: Vec<usize> = Vec::with_capacity(len);
        let mut maxabsdelta = 0.0_f64;

        self.complementation.resize(len, 0);

        for i in 0..len {
            if self.lp.is_col_integral(self.inds[i]) {
                integer_inds.push(i);

                // Complement integers sitting closer to their upper bound;
                // this sharpens the MIR inequality at the reference point.
                if self.upper[i] < 2.0 * self.solval[i] {
                    self.flip_complementation(i);
                }

                if self.solval[i] > feastol {
                    let delta = self.vals[i].abs();
                    if delta <= self.settings.min_cmir_delta
                        || delta >= self.settings.max_cmir_delta
                    {
                        continue;
                    }
                    maxabsdelta = maxabsdelta.max(delta);
                    deltas.push(delta);
                }
            } else {
                continuous_contribution += self.vals[i] * self.solval[i];
                continuous_sqrnorm += self.vals[i] * self.vals[i];
            }
        }

        if maxabsdelta + 1.0 > self.settings.min_cmir_delta
            && maxabsdelta + 1.0 < self.settings.max_cmir_delta
        {
            deltas.push(maxabsdelta + 1.0);
        }
        deltas.push(1.0);

        deltas.sort_unstable_by(f64::total_cmp);
        deltas.dedup_by(|b, a| *b - *a <= feastol);

        let mut bestdelta = None;
        let mut bestefficacy = 0.0_f64;

        for &delta in &deltas {
            if let Some(efficacy) =
                self.cmir_efficacy(delta, &integer_inds, continuous_contribution, continuous_sqrnorm)
            {
                if efficacy > bestefficacy {
                    bestdelta = Some(delta);
                    bestefficacy = efficacy;
                }
            }
        }

        let mut bestdelta = match bestdelta {
            Some(delta) => delta,
            None => return false,
        };

        // Power-of-two multiples of the winner sometimes round better.
        for k in 1..=3_u32 {
            let delta = bestdelta * f64::from(1_u32 << k);
            if delta <= self.settings.min_cmir_delta || delta >= self.settings.max_cmir_delta {
                continue;
            }
            if let Some(efficacy) =
                self.cmir_efficacy(delta, &integer_inds, continuous_contribution, continuous_sqrnorm)
            {
                if efficacy > bestefficacy {
                    bestdelta = delta;
                    bestefficacy = efficacy;
                }
            }
        }

        // With the divisor fixed, probe flipping each bounded integer and
        // keep a flip only on a strict efficacy improvement.
        for idx in 0..integer_inds.len() {
            let k = integer_inds[idx];
            if self.upper[k] == f64::INFINITY {
                continue;
            }

            self.flip_complementation(k);

            match self.cmir_efficacy(
                bestdelta,
                &integer_inds,
                continuous_contribution,
                continuous_sqrnorm,
            ) {
                Some(efficacy) if efficacy > bestefficacy => bestefficacy = efficacy,
                _ => self.flip_complementation(k),
            }
        }

        // Emit the MIR inequality for the accepted state.
        let scale = 1.0 / CDouble::from(bestdelta);
        let scalrhs = self.rhs * scale;
        let downrhs = f64::from(scalrhs).floor();

        let f0 = scalrhs - downrhs;
        let one_over_one_minus_f0 = 1.0 / (1.0 - f0);

        self.rhs = CDouble::from(downrhs * bestdelta);
        self.integral_support = true;
        self.integral_coefficients = false;

        for j in 0..len {
            if self.vals[j] == 0.0 {
                continue;
            }

            if !self.lp.is_col_integral(self.inds[j]) {
                if self.vals[j] > 0.0 {
                    self.vals[j] = 0.0;
                } else {
                    self.vals[j] = f64::from(self.vals[j] * one_over_one_minus_f0);
                    self.integral_support = false;
                }
            } else {
                let scalaj = scale * self.vals[j];
                let downaj = f64::from(scalaj).floor();
                let fj = scalaj - downaj;
                let aj = if fj > f0 {
                    CDouble::from(downaj) + fj - f0
                } else {
                    CDouble::from(downaj)
                };
                self.vals[j] = f64::from(aj * bestdelta);
            }
        }

        true
    }
}
