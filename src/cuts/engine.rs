//! The cut engine and its separation pipeline.
//!
//! Both entry operations share the same five stages: transform into the
//! complemented non-negative space, preprocess, route to a lifting routine
//! or the c-MIR heuristic, postprocess, and untransform into the original
//! space before depositing into the pool.

use crate::model::{BoundTransform, CutPool, Domain, LpRelaxation, SparseRow};
use crate::num::CDouble;
use crate::settings::{CutSettings, Tolerances};

/// Counters over the lifetime of an engine.
#[derive(Debug, Default, Clone)]
pub struct CutStats {
    /// Cuts accepted by the pool.
    pub cuts_generated: usize,

    /// Separation calls that ended in a silent rejection.
    pub cuts_rejected: usize,
}

/// Cut generation engine attached to one LP relaxation and one cut pool.
///
/// The engine owns growable working buffers that are reset at each call, so
/// repeated separation rounds do not reallocate. All failure paths reject
/// silently by returning `false`; no partial state survives a rejection.
pub struct CutEngine<'a, L, D, P> {
    pub(crate) lp: &'a L,
    pub(crate) domain: &'a D,
    pub(crate) pool: &'a mut P,
    pub(crate) tol: Tolerances,
    pub(crate) settings: CutSettings,

    // Working inequality in the complemented non-negative space. The five
    // vectors are parallel; `complementation` is empty until some stage
    // flips a variable.
    pub(crate) inds: Vec<usize>,
    pub(crate) vals: Vec<f64>,
    pub(crate) upper: Vec<f64>,
    pub(crate) solval: Vec<f64>,
    pub(crate) complementation: Vec<u8>,
    pub(crate) rhs: CDouble,

    // Cover state produced by `determine_cover`.
    pub(crate) cover: Vec<usize>,
    pub(crate) coverweight: CDouble,
    pub(crate) lambda: CDouble,

    // Advertised by the lifting stage, consumed by postprocessing and the
    // pool submission.
    pub(crate) integral_support: bool,
    pub(crate) integral_coefficients: bool,

    stats: CutStats,
}

impl<'a, L, D, P> CutEngine<'a, L, D, P>
where
    L: LpRelaxation,
    D: Domain,
    P: CutPool,
{
    /// Create an engine with default settings.
    pub fn new(lp: &'a L, domain: &'a D, pool: &'a mut P, tol: Tolerances) -> Self {
        Self::with_settings(lp, domain, pool, tol, CutSettings::default())
    }

    /// Create an engine with explicit settings.
    pub fn with_settings(
        lp: &'a L,
        domain: &'a D,
        pool: &'a mut P,
        tol: Tolerances,
        settings: CutSettings,
    ) -> Self {
        Self {
            lp,
            domain,
            pool,
            tol,
            settings,
            inds: Vec::new(),
            vals: Vec::new(),
            upper: Vec::new(),
            solval: Vec::new(),
            complementation: Vec::new(),
            rhs: CDouble::ZERO,
            cover: Vec::new(),
            coverweight: CDouble::ZERO,
            lambda: CDouble::ZERO,
            integral_support: false,
            integral_coefficients: false,
            stats: CutStats::default(),
        }
    }

    /// Counters over the engine's lifetime.
    pub fn stats(&self) -> &CutStats {
        &self.stats
    }

    /// Separate a cut from an LP-violated base inequality.
    ///
    /// On success `row` is overwritten with the strengthened cut in the
    /// original variable space and `true` is returned. Every dead end is a
    /// silent rejection: `row` then holds intermediate data of no meaning.
    pub fn generate_cut<T: BoundTransform>(&mut self, trans: &mut T, row: &mut SparseRow) -> bool {
        let accepted = self.generate_cut_impl(trans, row);
        if accepted {
            self.stats.cuts_generated += 1;
        } else {
            self.stats.cuts_rejected += 1;
        }
        accepted
    }

    fn generate_cut_impl<T: BoundTransform>(&mut self, trans: &mut T, row: &mut SparseRow) -> bool {
        self.upper.clear();
        self.solval.clear();
        let ints_positive = match trans.transform(row, &mut self.upper, &mut self.solval) {
            Some(positive) => positive,
            None => return false,
        };

        self.inds.clone_from(&row.inds);
        self.vals.clone_from(&row.vals);
        self.rhs = CDouble::from(row.rhs);
        self.complementation.clear();

        let shape = match self.preprocess_base_inequality() {
            Some(shape) => shape,
            None => return false,
        };

        // The transform leaves integers unflipped while an unbounded integer
        // is present. Preprocessing may have cancelled that variable, in
        // which case the lifting routines become usable once the remaining
        // negative integer coefficients are complemented away.
        if !shape.has_unbounded_ints && !ints_positive {
            self.complementation.resize(self.inds.len(), 0);

            for i in 0..self.inds.len() {
                if self.vals[i] > 0.0 || !self.lp.is_col_integral(self.inds[i]) {
                    continue;
                }

                self.complementation[i] = 1 - self.complementation[i];
                self.rhs -= self.upper[i] * self.vals[i];
                self.vals[i] = -self.vals[i];
            }
        }

        if !self.run_lifting(&shape, true) {
            return false;
        }

        if !self.postprocess_cut() {
            return false;
        }

        if !self.complementation.is_empty() {
            for i in 0..self.inds.len() {
                if self.complementation[i] != 0 {
                    self.rhs -= self.upper[i] * self.vals[i];
                    self.vals[i] = -self.vals[i];
                }
            }
        }

        row.inds.clone_from(&self.inds);
        row.vals.clone_from(&self.vals);
        row.rhs = f64::from(self.rhs);

        let integral = self.integral_support && self.integral_coefficients;
        if !trans.untransform(row, integral) {
            return false;
        }

        self.lp.check_cut(&row.inds, &row.vals, row.rhs);

        // The cut must beat the violation threshold in the original space.
        let mut violation = CDouble::from(-row.rhs);
        for (k, &col) in row.inds.iter().enumerate() {
            violation += self.lp.col_value(col) * row.vals[k];
        }
        if violation <= 10.0 * self.tol.feastol {
            return false;
        }

        self.domain
            .tighten_coefficients(&row.inds, &mut row.vals, &mut row.rhs);

        match self.pool.add_cut(&row.inds, &row.vals, row.rhs, integral) {
            Some(index) => {
                log::debug!(
                    "deposited cut {} with {} nonzeros, violation {:.3e}",
                    index,
                    row.len(),
                    f64::from(violation)
                );
                true
            }
            None => false,
        }
    }

    /// Strengthen an infeasibility proof from domain propagation.
    ///
    /// The bound substitution is inlined here against the global domain
    /// bounds; `local` describes the infeasible subproblem and provides the
    /// reference point. Every entry must carry a usable finite bound on the
    /// side that gets substituted (negative coefficients need a finite
    /// global upper bound or a finite global lower bound to shift by).
    pub fn generate_conflict<LD: Domain>(&mut self, local: &LD, row: &mut SparseRow) -> bool {
        let accepted = self.generate_conflict_impl(local, row);
        if accepted {
            self.stats.cuts_generated += 1;
        } else {
            self.stats.cuts_rejected += 1;
        }
        accepted
    }

    fn generate_conflict_impl<LD: Domain>(&mut self, local: &LD, row: &mut SparseRow) -> bool {
        self.lp.check_cut(&row.inds, &row.vals, row.rhs);

        self.inds.clone_from(&row.inds);
        self.vals.clone_from(&row.vals);
        self.rhs = CDouble::from(row.rhs);

        let len = self.inds.len();
        self.complementation.clear();
        self.complementation.resize(len, 0);
        self.upper.clear();
        self.upper.resize(len, 0.0);
        self.solval.clear();
        self.solval.resize(len, 0.0);

        for i in 0..len {
            let col = self.inds[i];
            let glb = self.domain.col_lower(col);
            let gub = self.domain.col_upper(col);

            self.upper[i] = gub - glb;

            if self.vals[i] < 0.0 && gub != f64::INFINITY {
                self.rhs -= gub * self.vals[i];
                self.vals[i] = -self.vals[i];
                self.complementation[i] = 1;

                self.solval[i] = gub - local.col_upper(col);
            } else {
                self.rhs -= glb * self.vals[i];
                self.complementation[i] = 0;
                self.solval[i] = local.col_lower(col) - glb;
            }
        }

        let shape = match self.preprocess_base_inequality() {
            Some(shape) => shape,
            None => return false,
        };

        if !self.run_lifting(&shape, false) {
            return false;
        }

        if !self.postprocess_cut() {
            return false;
        }

        // Undo the bound substitution against the global bounds.
        for i in 0..self.inds.len() {
            let col = self.inds[i];
            if self.complementation[i] != 0 {
                self.rhs -= self.domain.col_upper(col) * self.vals[i];
                self.vals[i] = -self.vals[i];
            } else {
                self.rhs += self.domain.col_lower(col) * self.vals[i];
            }
        }

        // Drop zeros in place before handing the proof onward.
        let mut i = self.inds.len();
        while i > 0 {
            i -= 1;
            if self.vals[i] == 0.0 {
                self.inds.swap_remove(i);
                self.vals.swap_remove(i);
            }
        }

        row.inds.clone_from(&self.inds);
        row.vals.clone_from(&self.vals);
        row.rhs = f64::from(self.rhs);

        let integral = self.integral_support && self.integral_coefficients;

        self.domain
            .tighten_coefficients(&row.inds, &mut row.vals, &mut row.rhs);

        self.pool
            .add_cut(&row.inds, &row.vals, row.rhs, integral)
            .is_some()
    }

    /// Route the preprocessed working row to the matching strengthening
    /// procedure. A cover is not required to be minimal; none of the
    /// lifting functions need minimality as a facet condition.
    fn run_lifting(&mut self, shape: &super::preprocess::RowShape, lp_sol: bool) -> bool {
        if shape.has_unbounded_ints {
            return self.cmir_cut_generation_heuristic();
        }

        if !self.determine_cover(lp_sol) {
            return false;
        }

        if !shape.has_continuous && !shape.has_general_ints {
            self.separate_lifted_knapsack_cover();
            true
        } else if shape.has_general_ints {
            self.separate_lifted_mixed_integer_cover()
        } else {
            self.separate_lifted_mixed_binary_cover()
        }
    }
}
