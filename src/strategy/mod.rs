//! Alternative signals built on the same stats and decision type.
//!
//! The z-score engine in `signal` is the primary path; these strategies are
//! selectable from the runner.

pub mod momentum_burst;
pub mod moving_average;
