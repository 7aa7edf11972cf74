//! Lifted cover inequality for mixed integer knapsack sets.
//!
//! Applies when general integer variables are present. One cover member is
//! selected as the pivot of a mixed-integer rounding inequality; the rest
//! of the row is lifted with a two-variable superadditive step function
//! built over the intervals `[k a_l, k a_l + r)` and `[k a_l + r, (k+1) a_l)`.

use crate::model::{CutPool, Domain, LpRelaxation};
use crate::num::CDouble;
use crate::CutEngine;

impl<L, D, P> CutEngine<'_, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Build the lifted MIR inequality from the cover. Returns `false`
    /// when no cover member satisfies the facet conditions of the lifting
    /// function.
    pub(crate) fn separate_lifted_mixed_integer_cover(&mut self) -> bool {
        let feastol = self.tol.feastol;
        let coversize = self.cover.len();
        let len = self.inds.len();

        let mut coverflag = vec![0_u8; len];
        for &i in &self.cover {
            coverflag[i] = 1;
        }

        {
            let vals = &self.vals;
            self.cover.sort_unstable_by(|&a, &b| vals[b].total_cmp(&vals[a]));
        }

        // Cumulative upper bounds and weighted bounds over the sorted
        // cover, with sentinel totals at the end.
        let mut a = vec![CDouble::ZERO; coversize];
        let mut u = vec![CDouble::ZERO; coversize + 1];
        let mut m = vec![CDouble::ZERO; coversize + 1];

        let mut usum = CDouble::ZERO;
        let mut msum = CDouble::ZERO;
        for c in 0..coversize {
            let i = self.cover[c];

            u[c] = usum;
            m[c] = msum;
            a[c] = CDouble::from(self.vals[i]);

            let ub = self.upper[i];
            usum += ub;
            msum += ub * a[c];
        }
        u[coversize] = usum;
        m[coversize] = msum;

        // Select the cover member to build the MIR inequality from. The
        // scoring prefers members away from their upper bound and, among
        // those, the largest lifted contribution, which gives the
        // superadditive function the best chance of meeting its facet
        // conditions.
        let mut lpos: Option<usize> = None;
        let mut best_cplusend = 0_usize;
        let mut best_val = 0.0_f64;
        let mut best_at_upper = true;

        for i in 0..coversize {
            let j = self.cover[i];
            let ub = self.upper[j];

            let at_upper = self.solval[j] >= ub - feastol;
            if at_upper && !best_at_upper {
                continue;
            }

            let mju = ub * self.vals[j];
            let mu = mju - self.lambda;

            if mu <= 10.0 * feastol {
                continue;
            }
            if self.vals[j].abs() < 1000.0 * feastol {
                continue;
            }

            let mudival = f64::from(mu / self.vals[j]);
            if (mudival.round() - mudival).abs() <= feastol {
                continue;
            }
            let eta = mudival.ceil();

            let ul_minus_eta_plus_one = CDouble::from(ub) - eta + 1.0;
            let cplusthreshold = f64::from(ul_minus_eta_plus_one * self.vals[j]);

            let cplusend = {
                let vals = &self.vals;
                self.cover.partition_point(|&c| vals[c] >= cplusthreshold)
            };

            let mut mcplus = m[cplusend];
            if i < cplusend {
                mcplus -= mju;
            }

            let jl_val = f64::from(mcplus + eta * self.vals[j]);

            if jl_val > best_val || (!at_upper && best_at_upper) {
                lpos = Some(i);
                best_cplusend = cplusend;
                best_val = jl_val;
                best_at_upper = at_upper;
            }
        }

        let lpos = match lpos {
            Some(pos) => pos,
            None => return false,
        };

        let l = self.cover[lpos];
        let al = CDouble::from(self.vals[l]);
        let upperl = self.upper[l];
        let mlu = CDouble::from(upperl) * al;
        let mu = mlu - self.lambda;

        // Restrict the step structure to the members above the threshold
        // and take the pivot itself out of the cumulative arrays.
        a.truncate(best_cplusend);
        self.cover.truncate(best_cplusend);
        u.truncate(best_cplusend + 1);
        m.truncate(best_cplusend + 1);

        if lpos < best_cplusend {
            a.remove(lpos);
            self.cover.remove(lpos);
            u.remove(lpos + 1);
            m.remove(lpos + 1);
            for i in (lpos + 1)..best_cplusend {
                u[i] -= upperl;
                m[i] -= mlu;
            }
        }

        let cplussize = a.len();

        debug_assert!(mu > 10.0 * feastol);

        let mudival = f64::from(mu / al);
        let eta = mudival.ceil();
        let mut r = mu - al * mudival.floor();
        // r scales coefficients below; a sign flip from roundoff would
        // corrupt every step, so clamp.
        if r < 0.0 {
            r = CDouble::ZERO;
        }

        let ul_minus_eta_plus_one = CDouble::from(upperl) - eta + 1.0;
        let cplusthreshold = ul_minus_eta_plus_one * al;

        let kmin = (eta - upperl - 0.5).floor() as i64;
        let kmax = (upperl - eta + 0.5).floor() as i64;

        let phi_l = |aval: f64| -> f64 {
            debug_assert!(aval < 0.0);

            let mut k = ((aval / f64::from(al)) as i64).min(-1);

            while k >= kmin {
                if al * k as f64 + r <= aval {
                    debug_assert!(al * (k + 1) as f64 > aval);
                    return f64::from(CDouble::from(aval) - r * (k + 1) as f64);
                }

                if al * k as f64 <= aval {
                    debug_assert!(al * k as f64 + r > aval);
                    return f64::from((al - r) * k as f64);
                }

                k -= 1;
            }

            f64::from((al - r) * kmin as f64)
        };

        let cover_upper: Vec<i64> = self.cover.iter().map(|&c| self.upper[c] as i64).collect();

        let gamma_l = |z: f64| -> f64 {
            debug_assert!(z > 0.0);

            for i in 0..cplussize {
                for h in 0..=cover_upper[i] {
                    let mih = m[i] + a[i] * h as f64;
                    let uih = u[i] + h as f64;
                    let mih_plus_deltai = mih + a[i] - cplusthreshold;

                    if mih_plus_deltai >= z {
                        debug_assert!(mih <= z);
                        return f64::from(uih * ul_minus_eta_plus_one * (al - r));
                    }

                    let mut k = f64::from((CDouble::from(z) - mih_plus_deltai) / al) as i64 - 1;
                    while k <= kmax {
                        if mih_plus_deltai + al * k as f64 + r >= z {
                            return f64::from(
                                (uih * ul_minus_eta_plus_one + k as f64) * (al - r),
                            );
                        }

                        if mih_plus_deltai + al * (k + 1) as f64 >= z {
                            return f64::from(
                                uih * ul_minus_eta_plus_one * (al - r) + z - mih - a[i]
                                    + cplusthreshold
                                    - r * (k + 1) as f64,
                            );
                        }

                        k += 1;
                    }
                }
            }

            // Beyond the cover the same pattern continues from the totals.
            let mut p = f64::from((CDouble::from(z) - m[cplussize]) / al) as i64 - 1;
            loop {
                if m[cplussize] + al * p as f64 + r >= z {
                    return f64::from(
                        (u[cplussize] * ul_minus_eta_plus_one + p as f64) * (al - r),
                    );
                }

                if m[cplussize] + al * (p + 1) as f64 >= z {
                    return f64::from(
                        u[cplussize] * ul_minus_eta_plus_one * (al - r) + z - m[cplussize]
                            - r * (p + 1) as f64,
                    );
                }

                p += 1;
            }
        };

        self.rhs = (CDouble::from(upperl) - eta) * r - self.lambda;
        self.integral_support = true;
        self.integral_coefficients = false;

        for i in 0..len {
            if self.vals[i] == 0.0 {
                continue;
            }
            let col = self.inds[i];

            if !self.lp.is_col_integral(col) {
                if self.vals[i] < 0.0 {
                    self.integral_support = false;
                } else {
                    self.vals[i] = 0.0;
                }
                continue;
            }

            if coverflag[i] != 0 {
                self.vals[i] = -phi_l(-self.vals[i]);
                self.rhs += self.vals[i] * self.upper[i];
            } else {
                self.vals[i] = gamma_l(self.vals[i]);
            }
        }

        true
    }
}
