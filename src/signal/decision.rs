//! Threshold policy shared by the z-score engine.

use crate::error::{Result, SignalError};
use crate::types::Decision;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Scores at or above this are a BUY.
    pub upper: f64,
    /// Scores at or below this are a SELL.
    pub lower: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            upper: 1.0,
            lower: -1.0,
        }
    }
}

impl Thresholds {
    pub fn symmetric(band: f64) -> Self {
        Self {
            upper: band.abs(),
            lower: -band.abs(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.upper.is_finite() && self.lower.is_finite()) {
            return Err(SignalError::invalid(format!(
                "thresholds must be finite (upper={}, lower={})",
                self.upper, self.lower
            )));
        }
        if self.lower >= self.upper {
            return Err(SignalError::invalid(format!(
                "lower threshold {} must be below upper threshold {}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// `z >= upper` is BUY, `z <= lower` is SELL, anything else HOLD.
pub fn decide(z: f64, thresholds: &Thresholds) -> Decision {
    if z >= thresholds.upper {
        Decision::Buy
    } else if z <= thresholds.lower {
        Decision::Sell
    } else {
        Decision::Hold
    }
}
