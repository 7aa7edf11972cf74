//! Cut generation core for mixed-integer programming.
//!
//! Given a violated base inequality from the current LP relaxation, or an
//! infeasibility proof from domain propagation, this crate produces a
//! strengthened valid inequality for the cut pool. The strengthening
//! combines superadditive lifting over knapsack covers with a complemented
//! mixed-integer rounding heuristic:
//!
//! - **Pure binary knapsack sets** are lifted through a step function over
//!   the reduced cover coefficient `abar`.
//! - **Mixed binary sets** clip cover coefficients at the cover excess
//!   `lambda` and lift remaining integers piecewise-linearly.
//! - **Mixed integer sets** build a mixed-integer rounding inequality from
//!   one pivot cover member and lift the rest superadditively.
//! - **Unbounded integers** disable lifting; a c-MIR divisor search takes
//!   over.
//!
//! The LP relaxation, the variable domain, the bound substitution transform
//! and the cut pool are collaborator traits implemented by the host solver;
//! the engine holds non-owning references to them and keeps per-call scratch
//! state in growable buffers.
//!
//! All arithmetic that decides signs of small differences runs in
//! compensated double-double precision; see [`num::CDouble`].
//!
//! # Example
//!
//! ```ignore
//! use cutgen::{CutEngine, SparseRow, Tolerances};
//!
//! let mut engine = CutEngine::new(&lp, &domain, &mut pool, Tolerances::default());
//! let mut row = SparseRow::new(inds, vals, rhs)?;
//! if engine.generate_cut(&mut transform, &mut row) {
//!     // `row` now holds the strengthened cut accepted by the pool.
//! }
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod error;
pub mod model;
pub mod num;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use cuts::{CutEngine, CutStats};
pub use error::{CutError, CutResult};
pub use model::{BoundTransform, CutPool, Domain, LpRelaxation, SparseRow};
pub use settings::{CutSettings, Tolerances};
