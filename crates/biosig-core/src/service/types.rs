//! Typed service payloads

use crate::doppler::DopplerTrace;
use crate::{BiosigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Reject a payload whose `status` field is present and not `"success"`.
pub(crate) fn ensure_success(status: Option<&str>, message: Option<&str>) -> Result<()> {
    match status {
        Some(s) if s != "success" => Err(BiosigError::Transport {
            status: None,
            message: match message {
                Some(m) => format!("service reported '{s}': {m}"),
                None => format!("service reported '{s}'"),
            },
        }),
        _ => Ok(()),
    }
}

// ============================================================================
// ECG
// ============================================================================

/// Per-condition model output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EcgPrediction {
    /// Probability per condition code (`1dAVb`, `RBBB`, `LBBB`, `SB`, `AF`, `ST`)
    pub probabilities: BTreeMap<String, f64>,
    /// Thresholded 0/1 decision per condition code
    pub predictions: BTreeMap<String, f64>,
    /// Human-readable findings
    #[serde(default)]
    pub summary: Vec<String>,
}

impl EcgPrediction {
    /// Condition codes predicted positive, in code order.
    pub fn positive(&self) -> Vec<&str> {
        self.predictions
            .iter()
            .filter(|(_, v)| **v >= 0.5)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Display name for a condition code.
pub fn condition_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "1dAVb" => "First-degree AV Block",
        "RBBB" => "Right Bundle Branch Block",
        "LBBB" => "Left Bundle Branch Block",
        "SB" => "Sinus Bradycardia",
        "AF" => "Atrial Fibrillation",
        "ST" => "ST-segment Changes",
        _ => return None,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct EcgEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<EcgPrediction>,
}

// ============================================================================
// Drone
// ============================================================================

/// Drone audio classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DroneClassification {
    /// Predicted class label
    pub classification: String,
    /// Model confidence in `[0, 1]`
    pub confidence: f64,
    /// Service status string
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// EEG
// ============================================================================

/// Result of uploading an EDF file for preprocessing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EegUpload {
    /// Channels kept after preprocessing
    pub channels: Vec<String>,
    /// Where the preprocessed JSON can be fetched
    pub access_url: String,
    /// Service message
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// SAR
// ============================================================================

/// Generated SAR image location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SarImage {
    /// Service status string
    #[serde(default)]
    pub status: Option<String>,
    /// Image URL
    pub access_url: String,
    /// Service message
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Doppler
// ============================================================================

/// Frequency summary reported by the service; fields may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct RemoteDopplerStats {
    /// Highest observed frequency
    #[serde(default)]
    pub max_observed: Option<f64>,
    /// Lowest observed frequency
    #[serde(default)]
    pub min_observed: Option<f64>,
    /// Max/min ratio
    #[serde(default)]
    pub shift_ratio: Option<f64>,
}

/// Doppler plot series as served remotely.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DopplerPlotData {
    /// Seconds
    pub time: Vec<f64>,
    /// Signal amplitude (`amp` accepted)
    #[serde(default, alias = "amp")]
    pub amplitude: Vec<f64>,
    /// Observed frequency (`freq` accepted)
    #[serde(default, alias = "freq")]
    pub frequency: Vec<f64>,
    /// Optional frequency summary
    #[serde(default)]
    pub stats: Option<RemoteDopplerStats>,
}

impl DopplerPlotData {
    /// Convert into the local trace type, truncating to the shortest series.
    pub fn into_trace(self) -> DopplerTrace {
        let n = self.time.len();
        let fit = |mut v: Vec<f64>| {
            v.resize(n, f64::NAN);
            v
        };
        DopplerTrace {
            amplitude: fit(self.amplitude),
            frequency: fit(self.frequency),
            time: self.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_data_accepts_short_names() {
        let data: DopplerPlotData =
            serde_json::from_str(r#"{"time":[0,1],"amp":[0.5,-0.5],"freq":[700,690]}"#).unwrap();
        assert_eq!(data.amplitude, vec![0.5, -0.5]);
        assert_eq!(data.frequency, vec![700.0, 690.0]);
        assert!(data.stats.is_none());
    }

    #[test]
    fn test_into_trace_pads_missing_series() {
        let data: DopplerPlotData = serde_json::from_str(r#"{"time":[0,1]}"#).unwrap();
        let trace = data.into_trace();
        assert_eq!(trace.len(), 2);
        assert!(trace.amplitude.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(Some("success"), None).is_ok());
        assert!(ensure_success(None, None).is_ok());
        let err = ensure_success(Some("error"), Some("model missing")).unwrap_err();
        assert!(err.to_string().contains("model missing"));
    }

    #[test]
    fn test_positive_predictions() {
        let prediction: EcgPrediction = serde_json::from_str(
            r#"{"probabilities":{"AF":0.9,"SB":0.1},"predictions":{"AF":1,"SB":0},"summary":["AF"]}"#,
        )
        .unwrap();
        assert_eq!(prediction.positive(), vec!["AF"]);
        assert_eq!(condition_name("AF"), Some("Atrial Fibrillation"));
    }
}
