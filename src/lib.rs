//! Signal bot primitives.
//!
//! This crate simulates per-source market data and turns it into discrete
//! trading decisions. The core is a pure z-score engine: mean and standard
//! deviation over a window, a guarded z-score of the latest observation, and a
//! threshold policy mapping that score to BUY, SELL or HOLD. Two extra
//! strategies (moving average, price x volume momentum) share the same
//! decision type.

pub mod error;
pub mod run;
pub mod signal;
pub mod simulation;
pub mod strategy;
pub mod types;

pub use crate::error::{ConfigError, Result, SignalError};
pub use crate::signal::engine::{EngineConfig, Evaluation, SignalEngine};
pub use crate::types::{Decision, Observation, Source};
