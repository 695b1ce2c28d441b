//! Synthetic per-source price/volume series.
//!
//! Every source draws from its own `StdRng`, seeded from the run seed and the
//! source name, so a source's series is fixed by `(seed, name)` alone.

use crate::error::{Result, SignalError};
use crate::types::{Observation, Source};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Forces a spike on the last point of one source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Matched case-insensitively.
    pub source: String,
    /// Price jump as a fraction of base price. Example: 0.01 = +1%.
    pub price_low: f64,
    pub price_high: f64,
    /// Volume as a multiple of base volume.
    pub volume_low: f64,
    pub volume_high: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            source: "NASDAQ".to_string(),
            price_low: 0.01,
            price_high: 0.02,
            volume_low: 2.0,
            volume_high: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub sources: Vec<String>,
    /// Points per source (default 60, one minute at 1s).
    pub points: usize,
    pub base_price: f64,
    pub base_volume: f64,
    /// Max relative price move per point. Example: 0.005 = +/-0.5%.
    pub price_jitter: f64,
    pub volume_low: f64,
    pub volume_high: f64,
    pub burst: Option<BurstConfig>,
    pub seed: u64,
    pub start_unix_ms: i64,
    pub interval_ms: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sources: vec!["NYSE".into(), "NASDAQ".into(), "BATS".into()],
            points: 60,
            base_price: 150.0,
            base_volume: 1000.0,
            price_jitter: 0.005,
            volume_low: 0.8,
            volume_high: 1.2,
            burst: Some(BurstConfig::default()),
            seed: 42,
            start_unix_ms: 1_704_067_200_000, // 2024-01-01T00:00:00Z
            interval_ms: 1_000,
        }
    }
}

/// Upper bound on points per source.
pub const MAX_POINTS: usize = 1_000_000;

fn range_ok(low: f64, high: f64) -> bool {
    low.is_finite() && high.is_finite() && low <= high
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(SignalError::invalid("simulation needs at least one source"));
        }
        let mut seen = BTreeSet::new();
        for s in &self.sources {
            if s.trim().is_empty() {
                return Err(SignalError::invalid("source names must not be blank"));
            }
            if !seen.insert(s.as_str()) {
                return Err(SignalError::invalid(format!("duplicate source: {s}")));
            }
        }
        if self.points == 0 {
            return Err(SignalError::invalid("simulation needs at least one point per source"));
        }
        if self.points > MAX_POINTS {
            return Err(SignalError::invalid(format!(
                "too many points per source: {} (max {MAX_POINTS})",
                self.points
            )));
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(SignalError::invalid(format!("bad base price: {}", self.base_price)));
        }
        if !(self.base_volume.is_finite() && self.base_volume >= 0.0) {
            return Err(SignalError::invalid(format!("bad base volume: {}", self.base_volume)));
        }
        if !(self.price_jitter.is_finite() && (0.0..1.0).contains(&self.price_jitter)) {
            return Err(SignalError::invalid(format!("bad price jitter: {}", self.price_jitter)));
        }
        if !range_ok(self.volume_low, self.volume_high) || self.volume_low < 0.0 {
            return Err(SignalError::invalid(format!(
                "bad volume range: {}..={}",
                self.volume_low, self.volume_high
            )));
        }
        if self.interval_ms <= 0 {
            return Err(SignalError::invalid("interval must be positive"));
        }
        let start = self.start_time()?;
        self.timestamp_at(start, self.points - 1)?;
        if let Some(b) = &self.burst {
            if !range_ok(b.price_low, b.price_high) || !range_ok(b.volume_low, b.volume_high) {
                return Err(SignalError::invalid("bad burst ranges"));
            }
        }
        Ok(())
    }

    fn start_time(&self) -> Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.start_unix_ms)
            .single()
            .ok_or_else(|| SignalError::invalid(format!("bad start time: {}", self.start_unix_ms)))
    }

    /// Timestamp of point `i`, failing instead of overflowing.
    fn timestamp_at(&self, start: DateTime<Utc>, i: usize) -> Result<DateTime<Utc>> {
        i64::try_from(i)
            .ok()
            .and_then(|i| self.interval_ms.checked_mul(i))
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|offset| start.checked_add_signed(offset))
            .ok_or_else(|| {
                SignalError::invalid(format!(
                    "timestamp of point {i} out of range (start={}ms, interval={}ms)",
                    self.start_unix_ms, self.interval_ms
                ))
            })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSeries {
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
    pub timestamps: Vec<DateTime<Utc>>,
}

impl SourceSeries {
    pub fn price_observations(&self, source: &Source) -> Vec<Observation> {
        self.prices
            .iter()
            .zip(&self.timestamps)
            .enumerate()
            .map(|(seq, (&value, &ts))| Observation {
                source: source.clone(),
                seq,
                ts,
                value,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub series: BTreeMap<Source, SourceSeries>,
}

impl MarketSnapshot {
    pub fn prices(&self) -> BTreeMap<Source, Vec<f64>> {
        self.series
            .iter()
            .map(|(s, ser)| (s.clone(), ser.prices.clone()))
            .collect()
    }
}

// FNV-1a; stable across platforms and toolchains.
fn name_hash(name: &str) -> u64 {
    name.to_ascii_uppercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn source_seed(seed: u64, name: &str) -> u64 {
    seed ^ name_hash(name)
}

pub fn simulate_source(cfg: &SimulationConfig, name: &str) -> Result<SourceSeries> {
    let start = cfg.start_time()?;
    let mut rng = StdRng::seed_from_u64(source_seed(cfg.seed, name));

    let n = cfg.points;
    let mut prices = Vec::with_capacity(n);
    let mut volumes = Vec::with_capacity(n);
    let mut timestamps = Vec::with_capacity(n);

    for i in 0..n {
        let fluct = rng.gen_range(-cfg.price_jitter..=cfg.price_jitter);
        let vol_mult = rng.gen_range(cfg.volume_low..=cfg.volume_high);
        prices.push(round_cents(cfg.base_price * (1.0 + fluct)));
        volumes.push((cfg.base_volume * vol_mult).floor());
        timestamps.push(cfg.timestamp_at(start, i)?);
    }

    if let Some(b) = cfg.burst.as_ref().filter(|b| b.source.eq_ignore_ascii_case(name)) {
        let jump = rng.gen_range(b.price_low..=b.price_high);
        let mult = rng.gen_range(b.volume_low..=b.volume_high);
        prices[n - 1] = round_cents(cfg.base_price * (1.0 + jump));
        volumes[n - 1] = (cfg.base_volume * mult).floor();
    }

    Ok(SourceSeries {
        prices,
        volumes,
        timestamps,
    })
}

pub fn simulate(cfg: &SimulationConfig) -> Result<MarketSnapshot> {
    cfg.validate()?;
    let mut series = BTreeMap::new();
    for name in &cfg.sources {
        series.insert(Source::new(name.as_str()), simulate_source(cfg, name)?);
    }
    Ok(MarketSnapshot { series })
}
