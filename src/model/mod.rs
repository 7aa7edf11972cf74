//! Collaborator interfaces of the cut engine.
//!
//! The engine is a library component wired between four host-owned pieces:
//! the LP relaxation it separates from, the variable domain, the bound
//! substitution transform, and the cut pool it deposits into. Each is a
//! small trait with exactly the methods the engine consumes.

mod domain;
mod pool;
mod relaxation;
mod transform;

pub use domain::Domain;
pub use pool::CutPool;
pub use relaxation::LpRelaxation;
pub use transform::{BoundTransform, SparseRow};
