//! Proof hook execution and rollup aggregation.
//!
//! Hooks turn token ids into 0/1 answers; the aggregator disposes those
//! answers for a tier and folds in freeze evaluation. Hook misbehavior
//! surfaces under execution codes, never as a policy verdict.

pub mod aggregate;
pub mod hook;

pub use aggregate::{CollectedRollups, collect_rollups, evaluate_rollups, fold_freeze};
pub use hook::run_hook;
