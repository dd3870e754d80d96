//! Per-channel amplitude scaling
//!
//! Auto-normalization stretches every channel to the full `[-1, 1]` display
//! range, which makes amplitudes incomparable across channels. Plots that need
//! physical units use [`Scaling::Fixed`] or [`Scaling::Raw`] instead.

use serde::{Deserialize, Serialize};

/// How channel values are mapped to display amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Per-draw min/max normalization to `[-1, 1]`
    #[default]
    Auto,
    /// Map a fixed physical range onto `[-1, 1]` (values outside stay outside)
    Fixed {
        /// Value drawn at -1
        min: f64,
        /// Value drawn at +1
        max: f64,
    },
    /// Leave values unchanged
    Raw,
}

impl Scaling {
    /// Apply this scaling to one channel.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        match *self {
            Scaling::Auto => normalize(values),
            Scaling::Fixed { min, max } => scale_to_range(values, min, max),
            Scaling::Raw => values.to_vec(),
        }
    }
}

/// Min and max over the finite values, `None` when there are none.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Map values to `[-1, 1]` using their own min/max.
///
/// `v → 2·(v − min)/(max − min) − 1`. A constant signal maps to all zeros.
/// Non-finite values (gaps) are ignored for the range and passed through.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    match finite_range(values) {
        Some((min, max)) => scale_to_range(values, min, max),
        None => values.to_vec(),
    }
}

/// Map values to `[-1, 1]` against an explicit range.
pub fn scale_to_range(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    let range = max - min;
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                v
            } else if range == 0.0 {
                0.0
            } else {
                2.0 * (v - min) / range - 1.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize(&[2.0, 4.0, 6.0]), vec![-1.0, 0.0, 1.0]);
        assert_eq!(normalize(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_gaps_pass_through() {
        let out = normalize(&[0.0, f64::NAN, 10.0]);
        assert_eq!(out[0], -1.0);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn test_fixed_range_does_not_clamp() {
        let scaling = Scaling::Fixed { min: -2.0, max: 2.0 };
        assert_eq!(scaling.apply(&[0.0, 2.0, 4.0]), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_raw_is_identity() {
        assert_eq!(Scaling::Raw.apply(&[3.5, -1.0]), vec![3.5, -1.0]);
    }

    #[test]
    fn test_scaling_deserializes() {
        let s: Scaling = serde_json::from_str(r#"{"fixed":{"min":-1.5,"max":1.5}}"#).unwrap();
        assert_eq!(s, Scaling::Fixed { min: -1.5, max: 1.5 });
        let s: Scaling = serde_json::from_str(r#""auto""#).unwrap();
        assert_eq!(s, Scaling::Auto);
    }
}
