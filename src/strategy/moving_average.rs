//! Simple moving-average signal against a reference price band.
//!
//! The SMA of the last `window` closes is compared with
//! `base_price * upper_multiplier` and `base_price * lower_multiplier`.
//! Unlike the z-score policy both comparisons are strict, so an SMA sitting
//! exactly on a band edge is a HOLD.

use crate::error::{Result, SignalError};
use crate::signal::stats::{mean, validate};
use crate::types::Decision;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageConfig {
    /// Number of most recent points averaged (default 10).
    pub window: usize,
    pub base_price: f64,
    /// Example: 1.005 = 0.5% above base.
    pub upper_multiplier: f64,
    pub lower_multiplier: f64,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            window: 10,
            base_price: 150.0,
            upper_multiplier: 1.005,
            lower_multiplier: 0.995,
        }
    }
}

impl MovingAverageConfig {
    pub fn upper_threshold(&self) -> f64 {
        self.base_price * self.upper_multiplier
    }

    pub fn lower_threshold(&self) -> f64 {
        self.base_price * self.lower_multiplier
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSignal {
    pub sma: f64,
    pub upper: f64,
    pub lower: f64,
    pub decision: Decision,
}

pub fn simple_moving_average(values: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(SignalError::invalid("window size must be at least 1"));
    }
    if values.len() < window {
        return Err(SignalError::invalid(format!(
            "not enough data points for moving average: have {}, need {window}",
            values.len()
        )));
    }
    validate(values)?;
    Ok(mean(&values[values.len() - window..]))
}

pub fn decide(sma: f64, cfg: &MovingAverageConfig) -> Decision {
    if sma > cfg.upper_threshold() {
        Decision::Buy
    } else if sma < cfg.lower_threshold() {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

pub fn evaluate(values: &[f64], cfg: &MovingAverageConfig) -> Result<MovingAverageSignal> {
    let sma = simple_moving_average(values, cfg.window)?;
    Ok(MovingAverageSignal {
        sma,
        upper: cfg.upper_threshold(),
        lower: cfg.lower_threshold(),
        decision: decide(sma, cfg),
    })
}
