//! Denomina Optimization Engine
//!
//! Rewrites a breakdown under an ordered list of constraints and suggests
//! labeled alternative breakdowns.
//!
//! Constraints are applied in list order and are not commutative: each one
//! sees the output of the previous. `Avoid` and `Only` remove value without
//! compensating for it; when that leaves the breakdown short of its amount
//! the result's metadata carries `unallocated_amount`.

pub mod constraints;
pub mod engine;

#[cfg(test)]
mod props;

pub use constraints::{apply_constraint, BreakdownMap};
pub use engine::OptimizationEngine;
