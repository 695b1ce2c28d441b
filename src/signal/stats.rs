//! Window statistics and the guarded z-score.

use crate::error::{Result, SignalError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which denominator the standard deviation uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dispersion {
    /// Divide by `n`.
    #[default]
    Population,
    /// Divide by `n - 1`; a single value has zero dispersion.
    Sample,
}

/// Fails on an empty slice or any non-finite value.
pub fn validate(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(SignalError::invalid("empty observation sequence"));
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SignalError::invalid(format!(
            "non-numeric observation at position {i}: {v}"
        )));
    }
    Ok(())
}

/// Trailing `window` values, or the whole slice when `window` is `None` or
/// longer than the slice.
pub fn trailing_window(values: &[f64], window: Option<usize>) -> Result<&[f64]> {
    match window {
        Some(0) => Err(SignalError::invalid("window size must be at least 1")),
        Some(w) if w < values.len() => Ok(&values[values.len() - w..]),
        _ => Ok(values),
    }
}

/// True when every value compares equal to the first.
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}

/// Arithmetic mean; a constant slice returns its value exactly.
pub fn mean(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    if is_constant(values) {
        return first;
    }
    values.iter().sum::<f64>() / (values.len() as f64)
}

/// A constant slice has a std-dev of exactly `0.0`; summing values with no
/// exact binary form would otherwise leave a residue of a few ulps.
pub fn std_dev(values: &[f64], mean: f64, dispersion: Dispersion) -> f64 {
    let n = values.len();
    let denom = match dispersion {
        Dispersion::Population => n,
        Dispersion::Sample => n.saturating_sub(1),
    };
    if denom == 0 || is_constant(values) {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (denom as f64)).sqrt()
}

/// `(value - mean) / std_dev`, exactly `0.0` when `std_dev` is zero.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (value - mean) / std_dev
}

/// Mean and std-dev of a validated window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
    pub len: usize,
}

impl WindowStats {
    pub fn compute(window: &[f64], dispersion: Dispersion) -> Result<Self> {
        validate(window)?;
        let mean = mean(window);
        Ok(Self {
            mean,
            std_dev: std_dev(window, mean, dispersion),
            len: window.len(),
        })
    }

    pub fn z(&self, value: f64) -> f64 {
        z_score(value, self.mean, self.std_dev)
    }
}

/// Guarded z-score of the last value against the whole slice.
pub fn latest_z_score(values: &[f64], dispersion: Dispersion) -> Result<f64> {
    let stats = WindowStats::compute(values, dispersion)?;
    // validate() above guarantees a last element.
    let last = values[values.len() - 1];
    Ok(stats.z(last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_and_sample_std_dev() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&v);
        assert_eq!(m, 5.0);
        assert_eq!(std_dev(&v, m, Dispersion::Population), 2.0);
        let sample = std_dev(&v, m, Dispersion::Sample);
        assert!((sample - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_sample_dispersion_is_zero() {
        assert_eq!(std_dev(&[3.0], 3.0, Dispersion::Sample), 0.0);
    }

    #[test]
    fn zero_std_dev_gives_zero_z() {
        assert_eq!(z_score(10.0, 5.0, 0.0), 0.0);
        assert_eq!(latest_z_score(&[7.0; 6], Dispersion::Sample).unwrap(), 0.0);
    }

    #[test]
    fn non_dyadic_constants_have_exact_zero_dispersion() {
        for &v in &[0.1, 0.3, 1.1, 99.99, 150.37] {
            for n in 2..=64 {
                let values = vec![v; n];
                let m = mean(&values);
                assert_eq!(m, v, "v={v} n={n}");
                for d in [Dispersion::Population, Dispersion::Sample] {
                    assert_eq!(std_dev(&values, m, d), 0.0, "v={v} n={n} {d:?}");
                    assert_eq!(latest_z_score(&values, d).unwrap(), 0.0, "v={v} n={n} {d:?}");
                }
            }
        }
    }

    #[test]
    fn trailing_window_selection() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing_window(&v, Some(2)).unwrap(), &[3.0, 4.0]);
        assert_eq!(trailing_window(&v, Some(10)).unwrap(), &v);
        assert_eq!(trailing_window(&v, None).unwrap(), &v);
        assert!(trailing_window(&v, Some(0)).unwrap_err().is_invalid_input());
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(validate(&[]).unwrap_err().is_invalid_input());
        assert!(validate(&[1.0, f64::NAN]).unwrap_err().is_invalid_input());
        assert!(validate(&[f64::INFINITY]).unwrap_err().is_invalid_input());
    }
}
