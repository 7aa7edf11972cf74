//! Shared fixtures for the unit tests.

use crate::model::{BoundTransform, CutPool, Domain, LpRelaxation, SparseRow};

/// LP relaxation backed by plain vectors.
pub(crate) struct TestLp {
    pub integrality: Vec<bool>,
    pub solution: Vec<f64>,
}

impl LpRelaxation for TestLp {
    fn num_cols(&self) -> usize {
        self.integrality.len()
    }

    fn is_col_integral(&self, col: usize) -> bool {
        self.integrality[col]
    }

    fn col_value(&self, col: usize) -> f64 {
        self.solution[col]
    }
}

/// Domain backed by plain bound vectors.
pub(crate) struct TestDomain {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Domain for TestDomain {
    fn col_lower(&self, col: usize) -> f64 {
        self.lower[col]
    }

    fn col_upper(&self, col: usize) -> f64 {
        self.upper[col]
    }
}

/// Pool that stores cuts and rejects exact duplicates.
#[derive(Default)]
pub(crate) struct TestPool {
    pub cuts: Vec<(Vec<usize>, Vec<f64>, f64)>,
}

impl CutPool for TestPool {
    fn add_cut(
        &mut self,
        inds: &[usize],
        vals: &[f64],
        rhs: f64,
        _integral: bool,
    ) -> Option<usize> {
        let duplicate = self
            .cuts
            .iter()
            .any(|(i, v, r)| i == inds && v == vals && *r == rhs);
        if duplicate {
            return None;
        }
        self.cuts.push((inds.to_vec(), vals.to_vec(), rhs));
        Some(self.cuts.len() - 1)
    }

    fn num_cuts(&self) -> usize {
        self.cuts.len()
    }
}

/// Transform that substitutes nothing: the working space equals the
/// original space, with bounds and reference point taken per column.
pub(crate) struct PassThroughTransform {
    pub upper: Vec<f64>,
    pub solval: Vec<f64>,
    pub ints_positive: bool,
}

impl BoundTransform for PassThroughTransform {
    fn transform(
        &mut self,
        row: &mut SparseRow,
        upper: &mut Vec<f64>,
        solval: &mut Vec<f64>,
    ) -> Option<bool> {
        upper.clear();
        solval.clear();
        for &col in &row.inds {
            upper.push(self.upper[col]);
            solval.push(self.solval[col]);
        }
        Some(self.ints_positive)
    }

    fn untransform(&mut self, _row: &mut SparseRow, _integral: bool) -> bool {
        true
    }
}

/// Convenience pair of LP and domain over `[0, 1]` columns.
pub(crate) fn engine_parts(integrality: &[bool], solution: &[f64]) -> (TestLp, TestDomain) {
    let n = integrality.len();
    (
        TestLp {
            integrality: integrality.to_vec(),
            solution: solution.to_vec(),
        },
        TestDomain {
            lower: vec![0.0; n],
            upper: vec![1.0; n],
        },
    )
}
