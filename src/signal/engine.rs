//! Stateless z-score engine over one or many sources.

use crate::error::{Result, SignalError};
use crate::signal::decision::{decide, Thresholds};
use crate::signal::stats::{trailing_window, validate, Dispersion, WindowStats};
use crate::types::{Decision, Observation, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing window length; `None` uses the full sequence.
    pub window: Option<usize>,
    pub thresholds: Thresholds,
    pub dispersion: Dispersion,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: None,
            thresholds: Thresholds::default(),
            dispersion: Dispersion::Population,
        }
    }
}

/// Statistics behind one decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub mean: f64,
    pub std_dev: f64,
    /// The observation that was scored.
    pub value: f64,
    pub z_score: f64,
    pub window_len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub signal: Signal,
    pub decision: Decision,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDecision {
    pub source: Source,
    pub signal: Signal,
    pub decision: Decision,
}

/// Stateless z-score engine. Every call recomputes from its input.
#[derive(Clone, Debug)]
pub struct SignalEngine {
    cfg: EngineConfig,
}

impl SignalEngine {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.thresholds.validate()?;
        if cfg.window == Some(0) {
            return Err(SignalError::invalid("window size must be at least 1"));
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Validates the whole input, not only the window.
    fn window_stats<'a>(&self, values: &'a [f64]) -> Result<(&'a [f64], WindowStats)> {
        validate(values)?;
        let window = trailing_window(values, self.cfg.window)?;
        let stats = WindowStats::compute(window, self.cfg.dispersion)?;
        Ok((window, stats))
    }

    fn score(&self, stats: &WindowStats, value: f64) -> Evaluation {
        let z = stats.z(value);
        Evaluation {
            signal: Signal {
                mean: stats.mean,
                std_dev: stats.std_dev,
                value,
                z_score: z,
                window_len: stats.len,
            },
            decision: decide(z, &self.cfg.thresholds),
        }
    }

    /// Score the most recent value against its window.
    pub fn evaluate(&self, values: &[f64]) -> Result<Evaluation> {
        let (window, stats) = self.window_stats(values)?;
        let latest = window[window.len() - 1];
        Ok(self.score(&stats, latest))
    }

    /// Score every value in the window against the same window statistics.
    pub fn evaluate_each(&self, values: &[f64]) -> Result<Vec<Evaluation>> {
        let (window, stats) = self.window_stats(values)?;
        Ok(window.iter().map(|&v| self.score(&stats, v)).collect())
    }

    /// Observations of a single source, ordered here by `seq`.
    pub fn evaluate_observations(&self, observations: &[Observation]) -> Result<Evaluation> {
        let Some(first) = observations.first() else {
            return Err(SignalError::invalid("empty observation sequence"));
        };
        if let Some(other) = observations.iter().find(|o| o.source != first.source) {
            return Err(SignalError::invalid(format!(
                "mixed sources in one window: {} and {}",
                first.source, other.source
            )));
        }
        let mut ordered: Vec<&Observation> = observations.iter().collect();
        ordered.sort_by_key(|o| o.seq);
        let values: Vec<f64> = ordered.iter().map(|o| o.value).collect();
        self.evaluate(&values)
    }

    /// Independent evaluation per source, returned in source order.
    ///
    /// Fails on the first source whose series is invalid.
    pub fn evaluate_sources(
        &self,
        by_source: &BTreeMap<Source, Vec<f64>>,
    ) -> Result<Vec<SourceDecision>> {
        by_source
            .iter()
            .map(|(source, values)| {
                let eval = self.evaluate(values).map_err(|e| e.in_source(source))?;
                Ok(SourceDecision {
                    source: source.clone(),
                    signal: eval.signal,
                    decision: eval.decision,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn engine() -> SignalEngine {
        SignalEngine::new(EngineConfig::default()).unwrap()
    }

    fn obs(source: &str, seq: usize, value: f64) -> Observation {
        Observation {
            source: Source::from(source),
            seq,
            ts: Utc.timestamp_opt(1_704_067_200 + seq as i64, 0).unwrap(),
            value,
        }
    }

    #[test]
    fn spike_up_is_buy() {
        let e = engine().evaluate(&[1.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        assert!((e.signal.z_score - 2.0).abs() < 1e-12);
        assert_eq!(e.decision, Decision::Buy);
    }

    #[test]
    fn spike_down_is_sell() {
        let e = engine().evaluate(&[10.0, 10.0, 10.0, 10.0, 1.0]).unwrap();
        assert!(e.signal.z_score <= -1.0);
        assert_eq!(e.decision, Decision::Sell);
    }

    #[test]
    fn constant_series_holds_with_exact_zero() {
        let e = engine().evaluate(&[42.0; 8]).unwrap();
        assert_eq!(e.signal.std_dev, 0.0);
        assert_eq!(e.signal.z_score, 0.0);
        assert_eq!(e.decision, Decision::Hold);
    }

    #[test]
    fn non_dyadic_constant_series_hold() {
        for &v in &[0.1, 1.1, 150.37, 149.99] {
            for n in [2, 3, 10, 60] {
                let values = vec![v; n];
                let e = engine().evaluate(&values).unwrap();
                assert_eq!(e.signal.z_score, 0.0, "v={v} n={n}");
                assert_eq!(e.decision, Decision::Hold, "v={v} n={n}");
                let each = engine().evaluate_each(&values).unwrap();
                assert!(each.iter().all(|e| e.signal.z_score == 0.0), "v={v} n={n}");
            }
        }
    }

    #[test]
    fn non_finite_outside_window_is_invalid() {
        let cfg = EngineConfig {
            window: Some(3),
            ..Default::default()
        };
        let engine = SignalEngine::new(cfg).unwrap();
        let err = engine.evaluate(&[f64::NAN, 1.0, 1.0, 2.0]).unwrap_err();
        assert!(err.is_invalid_input());
        let err = engine
            .evaluate_each(&[f64::INFINITY, 1.0, 1.0, 2.0])
            .unwrap_err();
        assert!(err.is_invalid_input());
        let series: Vec<Observation> = [f64::NAN, 1.0, 1.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| obs("A", i, v))
            .collect();
        assert!(engine
            .evaluate_observations(&series)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn window_limits_history() {
        let cfg = EngineConfig {
            window: Some(3),
            ..Default::default()
        };
        let engine = SignalEngine::new(cfg).unwrap();
        // The early spike falls outside the window.
        let e = engine.evaluate(&[100.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(e.signal.window_len, 3);
        assert_eq!(e.decision, Decision::Hold);
    }

    #[test]
    fn evaluate_each_scores_every_point() {
        let evals = engine().evaluate_each(&[1.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        assert_eq!(evals.len(), 5);
        assert!(evals[..4].iter().all(|e| e.decision == Decision::Hold));
        assert_eq!(evals[4].decision, Decision::Buy);
    }

    #[test]
    fn observations_are_ordered_by_seq() {
        let shuffled = vec![
            obs("A", 4, 10.0),
            obs("A", 0, 1.0),
            obs("A", 2, 1.0),
            obs("A", 1, 1.0),
            obs("A", 3, 1.0),
        ];
        let e = engine().evaluate_observations(&shuffled).unwrap();
        assert_eq!(e.signal.value, 10.0);
        assert_eq!(e.decision, Decision::Buy);
    }

    #[test]
    fn mixed_sources_rejected() {
        let err = engine()
            .evaluate_observations(&[obs("A", 0, 1.0), obs("B", 1, 2.0)])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn rejects_zero_window_and_bad_thresholds() {
        let cfg = EngineConfig {
            window: Some(0),
            ..Default::default()
        };
        assert!(SignalEngine::new(cfg).unwrap_err().is_invalid_input());

        let cfg = EngineConfig {
            thresholds: Thresholds { upper: 0.5, lower: 0.5 },
            ..Default::default()
        };
        assert!(SignalEngine::new(cfg).is_err());
    }

    #[test]
    fn bad_source_error_names_the_source() {
        let mut by_source = BTreeMap::new();
        by_source.insert(Source::from("OK"), vec![1.0, 2.0]);
        by_source.insert(Source::from("EMPTY"), vec![]);
        let err = engine().evaluate_sources(&by_source).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("EMPTY"));
    }
}
