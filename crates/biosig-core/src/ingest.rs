//! JSON recording ingestion
//!
//! Accepts the documents produced by the WFDB converter and the EEG
//! preprocessing service:
//!
//! ```json
//! { "id": "00001_hr", "leads": ["I", "II"], "samplingRate": 500,
//!   "signals": [[0.1, 0.2], [0.3, 0.4]] }
//! ```
//!
//! `channels` is accepted for `leads` and `data` for `signals`. Every failure
//! is reported as [`BiosigError::Validation`] before any plot sees the data.

use crate::recording::{ChannelSet, Recording, SampleMatrix};
use crate::{BiosigError, Result};
use serde::Deserialize;
use std::path::Path;

/// Orientation of the numeric matrix in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixLayout {
    /// `matrix[sample][channel]`
    #[default]
    SampleMajor,
    /// `matrix[channel][sample]`
    ChannelMajor,
}

/// Options controlling how lenient ingestion is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Sampling rate used when the document has none. `None` makes the field required.
    pub fallback_sampling_rate: Option<u32>,
    /// Matrix orientation.
    pub layout: MatrixLayout,
}

impl IngestOptions {
    /// Use `rate` when the document omits `samplingRate`.
    pub fn fallback_sampling_rate(mut self, rate: u32) -> Self {
        self.fallback_sampling_rate = Some(rate);
        self
    }

    /// Set the matrix orientation.
    pub fn layout(mut self, layout: MatrixLayout) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Deserialize)]
struct RawRecording {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, alias = "channels")]
    leads: Option<Vec<String>>,
    #[serde(default, rename = "samplingRate", alias = "sampling_rate")]
    sampling_rate: Option<serde_json::Value>,
    #[serde(default, alias = "data")]
    signals: Option<Vec<Vec<serde_json::Value>>>,
}

/// Parse a recording document with default options (sampling rate required).
pub fn parse_recording(json: &[u8]) -> Result<Recording> {
    parse_recording_with(json, IngestOptions::default())
}

/// Parse a recording document.
pub fn parse_recording_with(json: &[u8], options: IngestOptions) -> Result<Recording> {
    let raw: RawRecording = serde_json::from_slice(json)
        .map_err(|e| BiosigError::Validation(format!("recording is not valid JSON: {e}")))?;
    build_recording(raw, options)
}

/// Read and parse a recording file; the file name becomes the fallback id.
pub fn load_recording<P: AsRef<Path>>(path: P, options: IngestOptions) -> Result<Recording> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let mut recording = parse_recording_with(&bytes, options)?;
    if recording.id.is_empty() {
        recording.id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    log::debug!(
        "loaded recording {} ({} samples, {} channels, {} Hz)",
        recording.id,
        recording.samples.len(),
        recording.channel_count(),
        recording.sampling_rate
    );
    Ok(recording)
}

fn build_recording(raw: RawRecording, options: IngestOptions) -> Result<Recording> {
    let leads = raw
        .leads
        .filter(|l| !l.is_empty())
        .ok_or_else(|| BiosigError::Validation("missing or empty `leads`/`channels`".into()))?;

    let sampling_rate = match raw.sampling_rate {
        Some(value) => parse_sampling_rate(&value)?,
        None => options.fallback_sampling_rate.ok_or_else(|| {
            BiosigError::Validation("missing `samplingRate`".into())
        })?,
    };

    let matrix = raw
        .signals
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BiosigError::Validation("missing or empty `signals`/`data`".into()))?;
    let numeric = to_numeric(matrix)?;

    let rows = match options.layout {
        MatrixLayout::SampleMajor => numeric,
        MatrixLayout::ChannelMajor => transpose(numeric, leads.len())?,
    };

    let samples = SampleMatrix::from_rows(rows, leads.len())?;
    if samples.is_empty() {
        return Err(BiosigError::Validation("recording has no samples".into()));
    }
    let id = raw.id.or(raw.filename).unwrap_or_default();
    Recording::new(id, ChannelSet::new(leads), samples, sampling_rate)
}

fn parse_sampling_rate(value: &serde_json::Value) -> Result<u32> {
    let invalid = || {
        BiosigError::Validation(format!(
            "`samplingRate` must be a positive integer, got {value}"
        ))
    };
    let rate = match value {
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else {
                // 500.0 is accepted, 500.5 is not
                let f = n.as_f64().ok_or_else(invalid)?;
                if f.fract() != 0.0 || f < 0.0 {
                    return Err(invalid());
                }
                f as u64
            }
        }
        _ => return Err(invalid()),
    };
    if rate == 0 || rate > u32::MAX as u64 {
        return Err(invalid());
    }
    Ok(rate as u32)
}

fn to_numeric(matrix: Vec<Vec<serde_json::Value>>) -> Result<Vec<Vec<f64>>> {
    matrix
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .enumerate()
                .map(|(j, v)| {
                    v.as_f64().filter(|f| f.is_finite()).ok_or_else(|| {
                        BiosigError::Validation(format!(
                            "value at [{i}][{j}] is not a finite number: {v}"
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

fn transpose(channel_major: Vec<Vec<f64>>, channels: usize) -> Result<Vec<Vec<f64>>> {
    if channel_major.len() != channels {
        return Err(BiosigError::Validation(format!(
            "{} data rows for {channels} channels",
            channel_major.len()
        )));
    }
    let len = channel_major[0].len();
    if let Some(bad) = channel_major.iter().position(|c| c.len() != len) {
        return Err(BiosigError::Validation(format!(
            "channel {bad} has {} samples, expected {len}",
            channel_major[bad].len()
        )));
    }
    Ok((0..len)
        .map(|s| channel_major.iter().map(|c| c[s]).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ecg_document() {
        let json = br#"{"id":"00001_hr","leads":["I","II"],"samplingRate":500,
                       "signals":[[0.1,0.2],[0.3,0.4],[0.5,0.6]]}"#;
        let rec = parse_recording(json).unwrap();
        assert_eq!(rec.id, "00001_hr");
        assert_eq!(rec.sampling_rate, 500);
        assert_eq!(rec.channels.names(), &["I".to_string(), "II".to_string()]);
        assert_eq!(rec.samples.len(), 3);
        assert_eq!(rec.samples.row(2), Some(&[0.5, 0.6][..]));
    }

    #[test]
    fn test_aliases_and_channel_major() {
        let json = br#"{"channels":["Fp1","Fp2"],"sampling_rate":256,
                       "data":[[1,2,3],[4,5,6]]}"#;
        let rec = parse_recording_with(
            json,
            IngestOptions::default().layout(MatrixLayout::ChannelMajor),
        )
        .unwrap();
        assert_eq!(rec.samples.len(), 3);
        assert_eq!(rec.samples.row(0), Some(&[1.0, 4.0][..]));
        assert_eq!(rec.samples.column(1), Some(vec![4.0, 5.0, 6.0]));
    }

    #[test]
    fn test_missing_sampling_rate() {
        let json = br#"{"leads":["I"],"signals":[[1.0]]}"#;
        assert!(matches!(
            parse_recording(json),
            Err(BiosigError::Validation(_))
        ));
        let rec = parse_recording_with(json, IngestOptions::default().fallback_sampling_rate(500))
            .unwrap();
        assert_eq!(rec.sampling_rate, 500);
    }

    #[test]
    fn test_rejects_bad_documents() {
        let cases: [&[u8]; 7] = [
            br#"not json"#,
            br#"{"leads":[],"samplingRate":500,"signals":[[1.0]]}"#,
            br#"{"leads":["I"],"samplingRate":500,"signals":[]}"#,
            br#"{"leads":["I"],"samplingRate":0,"signals":[[1.0]]}"#,
            br#"{"leads":["I"],"samplingRate":250.5,"signals":[[1.0]]}"#,
            br#"{"leads":["I","II"],"samplingRate":500,"signals":[[1.0]]}"#,
            br#"{"leads":["I"],"samplingRate":500,"signals":[["x"]]}"#,
        ];
        for case in cases {
            assert!(
                matches!(parse_recording(case), Err(BiosigError::Validation(_))),
                "accepted {}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_rejects_bad_channel_major_documents() {
        let options = IngestOptions::default().layout(MatrixLayout::ChannelMajor);
        let cases: [&[u8]; 3] = [
            br#"{"leads":["I","II"],"samplingRate":500,"data":[[],[]]}"#,
            br#"{"leads":["I","II"],"samplingRate":500,"data":[[1.0,2.0],[3.0]]}"#,
            br#"{"leads":["I","II"],"samplingRate":500,"data":[[1.0,2.0]]}"#,
        ];
        for case in cases {
            assert!(
                matches!(parse_recording_with(case, options), Err(BiosigError::Validation(_))),
                "accepted {}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_integral_float_rate_accepted() {
        let json = br#"{"leads":["I"],"samplingRate":500.0,"signals":[[1.0]]}"#;
        assert_eq!(parse_recording(json).unwrap().sampling_rate, 500);
    }
}
