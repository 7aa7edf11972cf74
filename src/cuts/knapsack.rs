//! Lifted cover inequality for pure binary knapsack sets.
//!
//! Applies when the working row holds neither continuous variables nor
//! general integers. The cover inequality `sum_{j in C} x_j <= |C| - 1` is
//! lifted with a superadditive step function built from the reduced
//! coefficient `abar`, the largest value with
//! `sum_{j in C} min(abar, a_j) >= rhs`.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::CDouble;
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Lift the cover inequality over the whole row. Always succeeds and
    /// always produces integral support and integral coefficients.
    pub(crate) fn separate_lifted_knapsack_cover(&mut self) {
        let feastol = self.tol.feastol;
        let epsilon = self.tol.epsilon;
        let coversize = self.cover.len();
        let len = self.inds.len();

        let mut partial = vec![0.0_f64; coversize];
        let mut coverflag = vec![0_i8; len];

        {
            let vals = &self.vals;
            self.cover.sort_unstable_by(|&a, &b| vals[b].total_cmp(&vals[a]));
        }

        // Reduce abar from the largest cover coefficient until the residual
        // sigma = lambda is used up.
        let mut abartmp = CDouble::from(self.vals[self.cover[0]]);
        let mut sigma = self.lambda;
        for i in 1..coversize {
            let delta = abartmp - self.vals[self.cover[i]];
            let kdelta = delta * i as f64;
            if f64::from(kdelta) < f64::from(sigma) {
                abartmp = CDouble::from(self.vals[self.cover[i]]);
                sigma -= kdelta;
            } else {
                abartmp -= sigma * (1.0 / i as f64);
                sigma = CDouble::ZERO;
                break;
            }
        }

        if f64::from(sigma) > 0.0 {
            abartmp = self.rhs / coversize as f64;
        }

        let abar = f64::from(abartmp);

        let mut sum = CDouble::ZERO;
        let mut cplussize: i64 = 0;
        for i in 0..coversize {
            sum += abar.min(self.vals[self.cover[i]]);
            partial[i] = f64::from(sum);

            if self.vals[self.cover[i]] > abar + feastol {
                cplussize += 1;
                coverflag[self.cover[i]] = 1;
            } else {
                coverflag[self.cover[i]] = -1;
            }
        }
        debug_assert!((f64::from(sum - self.rhs) / f64::from(self.rhs)).abs() <= 1e-10);

        let mut halfintegral = false;

        // Lifting function: count how many partial sums a coefficient
        // exceeds; coefficients sitting exactly on a multiple of abar get a
        // half-integral bonus when enough large cover members exist.
        let mut g = |z: f64| -> f64 {
            let hfrac = z / abar;
            let mut coef = 0.0;

            let h = (hfrac + 0.5).floor() as i64;
            if h != 0 && (hfrac - h as f64).abs() * abar.max(1.0) <= epsilon && h <= cplussize - 1 {
                halfintegral = true;
                coef = 0.5;
            }

            let mut h = (h - 1).max(0) as usize;
            while h < coversize {
                if z <= partial[h] + feastol {
                    break;
                }
                h += 1;
            }

            coef + h as f64
        };

        self.rhs = CDouble::from((coversize - 1) as f64);

        for i in 0..len {
            if self.vals[i] == 0.0 {
                continue;
            }
            if coverflag[i] == -1 {
                self.vals[i] = 1.0;
            } else {
                self.vals[i] = g(self.vals[i]);
            }
        }

        if halfintegral {
            self.rhs *= 2.0;
            for v in &mut self.vals {
                *v *= 2.0;
            }
        }

        self.integral_support = true;
        self.integral_coefficients = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::num::CDouble;
    use crate::testing::{engine_parts, TestPool};
    use crate::CutEngine;

    #[test]
    fn test_cover_members_get_unit_coefficients() {
        // 0.75 x0 + 0.75 x1 + 0.75 x2 <= 1.25, cover {x0, x1}: the lifted
        // cut is x0 + x1 + x2 <= 1.
        let (lp, domain) = engine_parts(&[true, true, true], &[1.0, 1.0, 0.33]);
        let mut pool = TestPool::default();
        let mut engine = CutEngine::new(&lp, &domain, &mut pool, Default::default());

        engine.inds = vec![0, 1, 2];
        engine.vals = vec![0.75, 0.75, 0.75];
        engine.upper = vec![1.0, 1.0, 1.0];
        engine.solval = vec![1.0, 1.0, 0.33];
        engine.rhs = CDouble::from(1.25);

        assert!(engine.determine_cover(true));
        engine.separate_lifted_knapsack_cover();

        assert_eq!(engine.vals, vec![1.0, 1.0, 1.0]);
        assert_eq!(f64::from(engine.rhs), 1.0);
        assert!(engine.integral_support);
        assert!(engine.integral_coefficients);
    }

    #[test]
    fn test_half_integral_lift_doubles_the_cut() {
        // 4 x0 + 4 x1 + 4 x2 + 4 x3 + 3 x4 <= 9 scaled by 1/8. The cover is
        // {x0, x1, x2} with abar = 3/8; x4 lands exactly on abar and lifts
        // half-integrally, doubling the cut to
        // 2 x0 + 2 x1 + 2 x2 + 2 x3 + x4 <= 4.
        let (lp, domain) = engine_parts(
            &[true, true, true, true, true],
            &[1.0, 1.0, 1.0, 0.25, 0.9],
        );
        let mut pool = TestPool::default();
        let mut engine = CutEngine::new(&lp, &domain, &mut pool, Default::default());

        engine.inds = vec![0, 1, 2, 3, 4];
        engine.vals = vec![0.5, 0.5, 0.5, 0.5, 0.375];
        engine.upper = vec![1.0; 5];
        engine.solval = vec![1.0, 1.0, 1.0, 0.25, 0.9];
        engine.rhs = CDouble::from(1.125);

        assert!(engine.determine_cover(true));
        let mut cover = engine.cover.clone();
        cover.sort_unstable();
        assert_eq!(cover, vec![0, 1, 2]);

        engine.separate_lifted_knapsack_cover();

        assert_eq!(engine.vals, vec![2.0, 2.0, 2.0, 2.0, 1.0]);
        assert_eq!(f64::from(engine.rhs), 4.0);
    }

    #[test]
    fn test_lifted_coefficients_are_integral() {
        let (lp, domain) = engine_parts(
            &[true, true, true, true],
            &[1.0, 1.0, 0.6, 0.4],
        );
        let mut pool = TestPool::default();
        let mut engine = CutEngine::new(&lp, &domain, &mut pool, Default::default());

        engine.inds = vec![0, 1, 2, 3];
        engine.vals = vec![0.9, 0.7, 0.55, 0.3];
        engine.upper = vec![1.0; 4];
        engine.solval = vec![1.0, 1.0, 0.6, 0.4];
        engine.rhs = CDouble::from(1.3);

        assert!(engine.determine_cover(true));
        engine.separate_lifted_knapsack_cover();

        // Either integral already or half-integral before doubling; in both
        // cases the emitted coefficients are integers.
        for &v in &engine.vals {
            assert_eq!(v, v.round(), "coefficient {} is not integral", v);
        }
        assert_eq!(f64::from(engine.rhs), f64::from(engine.rhs).round());
    }
}
