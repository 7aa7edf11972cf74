//! Cut strengthening pipeline.
//!
//! The engine routes a preprocessed base inequality to one of four
//! strengthening procedures:
//! - pure binary knapsack cover lifting
//! - mixed binary cover lifting
//! - mixed integer cover lifting
//! - the c-MIR heuristic when an unbounded integer blocks lifting

mod cmir;
mod cover;
mod engine;
mod knapsack;
mod mixed_binary;
mod mixed_integer;
mod postprocess;
mod preprocess;

pub use engine::{CutEngine, CutStats};
