//! Z-score signal engine: window statistics plus threshold policy.

pub mod decision;
pub mod engine;
pub mod stats;

pub use decision::{decide, Thresholds};
pub use engine::{EngineConfig, Evaluation, Signal, SignalEngine, SourceDecision};
pub use stats::{Dispersion, WindowStats};
