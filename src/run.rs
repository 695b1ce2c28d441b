//! End-to-end run: simulate, evaluate each source, collect a report.

use crate::error::{ConfigError, Result};
use crate::signal::engine::{EngineConfig, SignalEngine, SourceDecision};
use crate::simulation::{simulate, MarketSnapshot, SimulationConfig};
use crate::strategy::momentum_burst::{self, most_extreme, MomentumConfig, SourceMomentum};
use crate::strategy::moving_average::{self, MovingAverageConfig, MovingAverageSignal};
use crate::types::{Decision, Source};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    #[serde(alias = "zscore")]
    #[value(name = "zscore", alias = "z-score")]
    ZScore,
    Momentum,
    MovingAverage,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub strategy: StrategyKind,
    pub engine: EngineConfig,
    pub simulation: SimulationConfig,
    pub momentum: MomentumConfig,
    pub moving_average: MovingAverageConfig,
}

impl RunConfig {
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(cfg)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceMovingAverage {
    pub source: Source,
    pub signal: MovingAverageSignal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum Report {
    ZScore {
        decisions: Vec<SourceDecision>,
    },
    Momentum {
        results: Vec<SourceMomentum>,
        most_extreme: Option<SourceMomentum>,
    },
    MovingAverage {
        results: Vec<SourceMovingAverage>,
    },
}

impl Report {
    /// One `(source, decision)` per evaluated source, in source order.
    pub fn decisions(&self) -> Vec<(Source, Decision)> {
        match self {
            Report::ZScore { decisions } => decisions
                .iter()
                .map(|d| (d.source.clone(), d.decision))
                .collect(),
            Report::Momentum { results, .. } => results
                .iter()
                .map(|r| (r.source.clone(), r.decision))
                .collect(),
            Report::MovingAverage { results } => results
                .iter()
                .map(|r| (r.source.clone(), r.signal.decision))
                .collect(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Report::ZScore { decisions } => decisions
                .iter()
                .map(|d| {
                    format!(
                        "{}: z={:.4} decision={}",
                        d.source, d.signal.z_score, d.decision
                    )
                })
                .collect(),
            Report::Momentum {
                results,
                most_extreme,
            } => {
                let mut out: Vec<String> = results
                    .iter()
                    .map(|r| {
                        format!(
                            "{}: price_z={:.4} volume_z={:.4} score={:.4} decision={}",
                            r.source, r.signal.price_z, r.signal.volume_z, r.signal.score, r.decision
                        )
                    })
                    .collect();
                if let Some(m) = most_extreme {
                    out.push(format!(
                        "most extreme: {} score={:.4} decision={}",
                        m.source, m.signal.score, m.decision
                    ));
                }
                out
            }
            Report::MovingAverage { results } => results
                .iter()
                .map(|r| {
                    format!(
                        "{}: sma={:.4} decision={}",
                        r.source, r.signal.sma, r.signal.decision
                    )
                })
                .collect(),
        }
    }
}

pub fn evaluate_snapshot(cfg: &RunConfig, snapshot: &MarketSnapshot) -> Result<Report> {
    match cfg.strategy {
        StrategyKind::ZScore => {
            let engine = SignalEngine::new(cfg.engine.clone())?;
            let decisions = engine.evaluate_sources(&snapshot.prices())?;
            for d in &decisions {
                tracing::debug!(
                    source = %d.source,
                    mean = d.signal.mean,
                    std_dev = d.signal.std_dev,
                    z = d.signal.z_score,
                    decision = %d.decision,
                    "z-score evaluated"
                );
            }
            Ok(Report::ZScore { decisions })
        }
        StrategyKind::Momentum => {
            let mut results = Vec::with_capacity(snapshot.series.len());
            for (source, series) in &snapshot.series {
                let signal =
                    momentum_burst::evaluate(&series.prices, &series.volumes, &cfg.momentum)
                        .map_err(|e| e.in_source(source))?;
                let decision = momentum_burst::decide(signal.score, cfg.momentum.threshold);
                tracing::debug!(
                    source = %source,
                    price_z = signal.price_z,
                    volume_z = signal.volume_z,
                    score = signal.score,
                    "momentum evaluated"
                );
                results.push(SourceMomentum {
                    source: source.clone(),
                    signal,
                    decision,
                });
            }
            let most_extreme = most_extreme(&results).cloned();
            Ok(Report::Momentum {
                results,
                most_extreme,
            })
        }
        StrategyKind::MovingAverage => {
            let mut results = Vec::with_capacity(snapshot.series.len());
            for (source, series) in &snapshot.series {
                let signal = moving_average::evaluate(&series.prices, &cfg.moving_average)
                    .map_err(|e| e.in_source(source))?;
                tracing::debug!(source = %source, sma = signal.sma, "moving average evaluated");
                results.push(SourceMovingAverage {
                    source: source.clone(),
                    signal,
                });
            }
            Ok(Report::MovingAverage { results })
        }
    }
}

pub fn run(cfg: &RunConfig) -> Result<Report> {
    tracing::info!(
        strategy = ?cfg.strategy,
        sources = cfg.simulation.sources.len(),
        points = cfg.simulation.points,
        seed = cfg.simulation.seed,
        "simulating market data"
    );
    let snapshot = simulate(&cfg.simulation)?;
    let report = evaluate_snapshot(cfg, &snapshot)?;
    tracing::info!(sources = report.decisions().len(), "run complete");
    Ok(report)
}
