//! Short-term momentum burst detector.
//!
//! Momentum score = z(latest price) * z(latest volume), each z-score taken
//! against the whole series with sample dispersion. A burst in both price and
//! volume produces a large positive score; a price drop on heavy volume a
//! large negative one.

use crate::error::{Result, SignalError};
use crate::signal::stats::{latest_z_score, Dispersion};
use crate::types::{Decision, Source};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Scores strictly beyond +/- threshold trigger a trade (default 5.0).
    pub threshold: f64,
    pub dispersion: Dispersion,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            dispersion: Dispersion::Sample,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MomentumSignal {
    pub price_z: f64,
    pub volume_z: f64,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceMomentum {
    pub source: Source,
    pub signal: MomentumSignal,
    pub decision: Decision,
}

pub fn momentum_score(
    prices: &[f64],
    volumes: &[f64],
    dispersion: Dispersion,
) -> Result<MomentumSignal> {
    if prices.len() != volumes.len() {
        return Err(SignalError::invalid(format!(
            "price/volume length mismatch: {} vs {}",
            prices.len(),
            volumes.len()
        )));
    }
    let price_z = latest_z_score(prices, dispersion)?;
    let volume_z = latest_z_score(volumes, dispersion)?;
    Ok(MomentumSignal {
        price_z,
        volume_z,
        score: price_z * volume_z,
    })
}

pub fn decide(score: f64, threshold: f64) -> Decision {
    if score > threshold {
        Decision::Buy
    } else if score < -threshold {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

pub fn evaluate(prices: &[f64], volumes: &[f64], cfg: &MomentumConfig) -> Result<MomentumSignal> {
    if !(cfg.threshold.is_finite() && cfg.threshold >= 0.0) {
        return Err(SignalError::invalid(format!(
            "momentum threshold must be finite and non-negative, got {}",
            cfg.threshold
        )));
    }
    momentum_score(prices, volumes, cfg.dispersion)
}

/// Source with the largest absolute score; the first one wins ties.
pub fn most_extreme(results: &[SourceMomentum]) -> Option<&SourceMomentum> {
    results.iter().fold(None, |best: Option<&SourceMomentum>, r| match best {
        Some(b) if b.signal.score.abs() >= r.signal.score.abs() => Some(b),
        _ => Some(r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_with_last(base: f64, last: f64, n: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..n - 1)
            .map(|i| base + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        v.push(last);
        v
    }

    #[test]
    fn joint_burst_is_buy() {
        let prices = flat_with_last(150.0, 152.5, 60);
        let volumes = flat_with_last(1000.0, 2500.0, 60);
        let sig = momentum_score(&prices, &volumes, Dispersion::Sample).unwrap();
        assert!(sig.price_z > 2.5 && sig.volume_z > 2.5, "{sig:?}");
        assert_eq!(decide(sig.score, 5.0), Decision::Buy);
    }

    #[test]
    fn price_drop_on_heavy_volume_is_sell() {
        let prices = flat_with_last(150.0, 147.0, 60);
        let volumes = flat_with_last(1000.0, 2500.0, 60);
        let sig = momentum_score(&prices, &volumes, Dispersion::Sample).unwrap();
        assert_eq!(decide(sig.score, 5.0), Decision::Sell);
    }

    #[test]
    fn flat_series_scores_zero() {
        let sig = momentum_score(&[150.0; 10], &[1000.0; 10], Dispersion::Sample).unwrap();
        assert_eq!(sig.score, 0.0);
        assert_eq!(decide(sig.score, 5.0), Decision::Hold);
    }

    #[test]
    fn flat_cent_priced_series_scores_zero() {
        let sig = momentum_score(&[150.37; 60], &[1000.0; 60], Dispersion::Sample).unwrap();
        assert_eq!(sig.price_z, 0.0);
        assert_eq!(sig.volume_z, 0.0);
        assert_eq!(sig.score, 0.0);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(decide(5.0, 5.0), Decision::Hold);
        assert_eq!(decide(-5.0, 5.0), Decision::Hold);
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = momentum_score(&[1.0, 2.0], &[1.0], Dispersion::Sample).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn most_extreme_uses_absolute_score() {
        let mk = |name: &str, score: f64| SourceMomentum {
            source: Source::from(name),
            signal: MomentumSignal {
                price_z: 0.0,
                volume_z: 0.0,
                score,
            },
            decision: decide(score, 5.0),
        };
        let results = vec![mk("A", 3.0), mk("B", -7.0), mk("C", 7.0)];
        assert_eq!(most_extreme(&results).unwrap().source, Source::from("B"));
        assert!(most_extreme(&[]).is_none());
    }
}
