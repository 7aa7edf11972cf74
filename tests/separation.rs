//! End-to-end separation tests against host-side mock collaborators.

use cutgen::{
    BoundTransform, CutEngine, CutPool, Domain, LpRelaxation, SparseRow, Tolerances,
};

/// LP relaxation backed by plain vectors.
struct VecLp {
    integrality: Vec<bool>,
    solution: Vec<f64>,
}

impl LpRelaxation for VecLp {
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
struct VecDomain {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl VecDomain {
    fn unit(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            upper: vec![1.0; n],
        }
    }
}

impl Domain for VecDomain {
    fn col_lower(&self, col: usize) -> f64 {
        self.lower[col]
    }

    fn col_upper(&self, col: usize) -> f64 {
        self.upper[col]
    }
}

/// Pool that stores cuts and rejects exact duplicates.
#[derive(Default)]
struct VecPool {
    cuts: Vec<(Vec<usize>, Vec<f64>, f64)>,
}

impl CutPool for VecPool {
    fn add_cut(&mut self, inds: &[usize], vals: &[f64], rhs: f64, _integral: bool) -> Option<usize> {
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

/// Transform whose working space equals the original space. Upper bounds
/// and the reference point are read per column; nothing is substituted.
struct PassThrough {
    upper: Vec<f64>,
    solval: Vec<f64>,
}

impl BoundTransform for PassThrough {
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
        Some(true)
    }

    fn untransform(&mut self, _row: &mut SparseRow, _integral: bool) -> bool {
        true
    }
}

/// All binary assignments of length `n`.
fn binary_points(n: usize) -> impl Iterator<Item = Vec<f64>> {
    (0..1_u32 << n).map(move |mask| {
        (0..n)
            .map(|i| if mask & (1 << i) != 0 { 1.0 } else { 0.0 })
            .collect()
    })
}

fn assert_cut_valid_on_binary_points(base: &SparseRow, cut: &SparseRow, n: usize) {
    for point in binary_points(n) {
        if base.violation(&point) <= 1e-9 {
            assert!(
                cut.violation(&point) <= 1e-6,
                "feasible point {:?} violates the cut by {}",
                point,
                cut.violation(&point)
            );
        }
    }
}

#[test]
fn test_minimal_binary_cover() {
    // 3 x0 + 3 x1 + 3 x2 <= 5 at (1, 1, 0.33): the at-upper pair {x0, x1}
    // covers with lambda = 1 and lifting strengthens the third variable in
    // as well.
    let lp = VecLp {
        integrality: vec![true; 3],
        solution: vec![1.0, 1.0, 0.33],
    };
    let domain = VecDomain::unit(3);
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![1.0; 3],
        solval: lp.solution.clone(),
    };

    let base = SparseRow::new(vec![0, 1, 2], vec![3.0, 3.0, 3.0], 5.0).unwrap();
    let mut row = base.clone();

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
    assert!(engine.generate_cut(&mut trans, &mut row));

    assert_eq!(row.inds, vec![0, 1, 2]);
    assert_eq!(row.vals, vec![1.0, 1.0, 1.0]);
    assert_eq!(row.rhs, 1.0);

    assert_cut_valid_on_binary_points(&base, &row, 3);
}

#[test]
fn test_half_integral_lift() {
    // 4 x0 + 4 x1 + 4 x2 + 4 x3 + 3 x4 <= 9: the cover {x0, x1, x2} has
    // abar = 3 after rescaling and x4 sits exactly on it, producing a
    // half-integral coefficient and the doubled cut
    // 2 x0 + 2 x1 + 2 x2 + 2 x3 + x4 <= 4.
    let lp = VecLp {
        integrality: vec![true; 5],
        solution: vec![1.0, 1.0, 1.0, 0.25, 0.9],
    };
    let domain = VecDomain::unit(5);
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![1.0; 5],
        solval: lp.solution.clone(),
    };

    let base = SparseRow::new(
        vec![0, 1, 2, 3, 4],
        vec![4.0, 4.0, 4.0, 4.0, 3.0],
        9.0,
    )
    .unwrap();
    let mut row = base.clone();

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
    assert!(engine.generate_cut(&mut trans, &mut row));

    assert_eq!(row.vals, vec![2.0, 2.0, 2.0, 2.0, 1.0]);
    assert_eq!(row.rhs, 4.0);

    assert_cut_valid_on_binary_points(&base, &row, 5);
}

#[test]
fn test_mixed_binary_cover_with_continuous_variable() {
    // 5 x0 + 5 x1 + 3 y <= 7 with y continuous and at zero: the cover
    // {x0, x1} clips to lambda, the continuous term is dropped, and the
    // integral rescale in postprocessing yields x0 + x1 <= 1.
    let lp = VecLp {
        integrality: vec![true, true, false],
        solution: vec![1.0, 1.0, 0.0],
    };
    let domain = VecDomain::unit(3);
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![1.0, 1.0, f64::INFINITY],
        solval: lp.solution.clone(),
    };

    let mut row = SparseRow::new(vec![0, 1, 2], vec![5.0, 5.0, 3.0], 7.0).unwrap();

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
    assert!(engine.generate_cut(&mut trans, &mut row));

    assert_eq!(row.vals, vec![1.0, 1.0, 0.0]);
    assert_eq!(row.rhs, 1.0);
}

#[test]
fn test_cmir_on_unbounded_integer() {
    // 2 x + y <= 3 with x an unbounded integer at 1.6 and y continuous:
    // the c-MIR search settles on the divisor 2 (f0 = 1/2) and emits
    // x <= 1.
    let lp = VecLp {
        integrality: vec![true, false],
        solution: vec![1.6, 0.0],
    };
    let domain = VecDomain {
        lower: vec![0.0, 0.0],
        upper: vec![f64::INFINITY, f64::INFINITY],
    };
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![f64::INFINITY, f64::INFINITY],
        solval: lp.solution.clone(),
    };

    let mut row = SparseRow::new(vec![0, 1], vec![2.0, 1.0], 3.0).unwrap();

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
    assert!(engine.generate_cut(&mut trans, &mut row));

    assert_eq!(row.vals, vec![1.0, 0.0]);
    assert_eq!(row.rhs, 1.0);

    // x <= 1 holds for every feasible nonnegative integer x of 2 x <= 3.
    for x in 0..=1 {
        assert!(row.vals[0] * x as f64 <= row.rhs + 1e-9);
    }
}

#[test]
fn test_trivial_rhs_is_rejected() {
    let lp = VecLp {
        integrality: vec![true, true],
        solution: vec![1.0, 0.5],
    };
    let domain = VecDomain::unit(2);
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![1.0, 1.0],
        solval: lp.solution.clone(),
    };

    let mut row = SparseRow::new(vec![0, 1], vec![1.0, 1.0], 5e-6).unwrap();

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
    assert!(!engine.generate_cut(&mut trans, &mut row));
    assert_eq!(pool.num_cuts(), 0);
}

#[test]
fn test_duplicate_is_rejected_by_pool() {
    let lp = VecLp {
        integrality: vec![true; 3],
        solution: vec![1.0, 1.0, 0.33],
    };
    let domain = VecDomain::unit(3);
    let mut pool = VecPool::default();
    let mut trans = PassThrough {
        upper: vec![1.0; 3],
        solval: lp.solution.clone(),
    };

    let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());

    let mut row = SparseRow::new(vec![0, 1, 2], vec![3.0, 3.0, 3.0], 5.0).unwrap();
    assert!(engine.generate_cut(&mut trans, &mut row));

    let mut row = SparseRow::new(vec![0, 1, 2], vec![3.0, 3.0, 3.0], 5.0).unwrap();
    assert!(!engine.generate_cut(&mut trans, &mut row));

    assert_eq!(engine.stats().cuts_generated, 1);
    assert_eq!(engine.stats().cuts_rejected, 1);
}

#[test]
fn test_conflict_path_strengthens_proof() {
    // Proof 0.75 x0 + 0.5 x1 <= 0.875 over x0 in [0,2], x1 in [0,1], both
    // integer; the local domain has raised both lower bounds to 1. The
    // mixed integer lifting and the integral rescale turn the proof into
    // 5 x0 + 3 x1 <= 5.
    let lp = VecLp {
        integrality: vec![true, true],
        solution: vec![0.0, 0.0],
    };
    let global = VecDomain {
        lower: vec![0.0, 0.0],
        upper: vec![2.0, 1.0],
    };
    let local = VecDomain {
        lower: vec![1.0, 1.0],
        upper: vec![2.0, 1.0],
    };
    let mut pool = VecPool::default();

    let mut row = SparseRow::new(vec![0, 1], vec![0.75, 0.5], 0.875).unwrap();

    let mut engine = CutEngine::new(&lp, &global, &mut pool, Tolerances::default());
    assert!(engine.generate_conflict(&local, &mut row));

    assert_eq!(row.vals, vec![5.0, 3.0]);
    assert_eq!(row.rhs, 5.0);

    // The strengthened proof still holds at every feasible integer point
    // of the original inequality.
    for x0 in 0..=2 {
        for x1 in 0..=1 {
            if 0.75 * x0 as f64 + 0.5 * x1 as f64 <= 0.875 + 1e-9 {
                assert!(5.0 * x0 as f64 + 3.0 * x1 as f64 <= 5.0 + 1e-9);
            }
        }
    }
}

#[test]
fn test_validity_on_random_knapsack_rows() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(900557);

    for _ in 0..200 {
        let n = rng.gen_range(3..7);
        let vals: Vec<f64> = (0..n).map(|_| rng.gen_range(2..10) as f64).collect();

        // The reference point puts a prefix of variables at their bound so
        // a cover exists, and the right-hand side sits strictly below the
        // prefix weight.
        let coversize = rng.gen_range(2..=n);
        let solution: Vec<f64> = (0..n)
            .map(|i| {
                if i < coversize {
                    1.0
                } else {
                    rng.gen_range(0.0..0.9)
                }
            })
            .collect();
        let prefix_weight: f64 = vals[..coversize].iter().sum();
        let rhs = prefix_weight - 1.0 - rng.gen_range(0.0..0.5);
        if rhs <= 1.0 {
            continue;
        }

        let lp = VecLp {
            integrality: vec![true; n],
            solution: solution.clone(),
        };
        let domain = VecDomain::unit(n);
        let mut pool = VecPool::default();
        let mut trans = PassThrough {
            upper: vec![1.0; n],
            solval: solution.clone(),
        };

        let base = SparseRow::new((0..n).collect(), vals, rhs).unwrap();
        let mut row = base.clone();

        let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
        let accepted = engine.generate_cut(&mut trans, &mut row);
        assert!(accepted, "cover construction {:?} <= {} failed", base.vals, base.rhs);

        // Validity on every feasible binary point.
        assert_cut_valid_on_binary_points(&base, &row, n);

        // Violation lower bound in the original space.
        assert!(row.violation(&solution) > 10.0 * 1e-6);
    }
}

#[test]
fn test_bit_identical_reproduction() {
    // Identical inputs and identical pool size must reproduce the cut
    // bit for bit, including the hash-tiebroken cover order.
    let lp = VecLp {
        integrality: vec![true; 6],
        solution: vec![0.8, 0.8, 0.8, 0.8, 0.8, 0.8],
    };
    let domain = VecDomain::unit(6);

    let run = || {
        let mut pool = VecPool::default();
        let mut trans = PassThrough {
            upper: vec![1.0; 6],
            solval: lp.solution.clone(),
        };
        let mut row =
            SparseRow::new((0..6).collect(), vec![3.0, 3.0, 3.0, 3.0, 3.0, 3.0], 7.0).unwrap();
        let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
        assert!(engine.generate_cut(&mut trans, &mut row));
        (row.inds, row.vals, row.rhs)
    };

    let first = run();
    let second = run();
    assert_eq!(first.0, second.0);
    assert!(first
        .1
        .iter()
        .zip(&second.1)
        .all(|(a, b)| a.to_bits() == b.to_bits()));
    assert_eq!(first.2.to_bits(), second.2.to_bits());
}
