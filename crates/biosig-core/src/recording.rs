//! In-memory multi-channel recordings
//!
//! A [`Recording`] is produced once by ingestion (file parse or service fetch)
//! and never mutated afterwards. Plot sessions share it through an `Arc`.

use crate::{BiosigError, Result};

/// Ordered samples with a fixed number of channel values per sample.
///
/// Values are stored row-major with a fixed stride, so every sample has the
/// same channel count for the lifetime of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    values: Vec<f64>,
    channels: usize,
}

impl SampleMatrix {
    /// Build a matrix from sample rows.
    ///
    /// Every row must have `channels` values.
    pub fn from_rows(rows: Vec<Vec<f64>>, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(BiosigError::Validation(
                "sample matrix needs at least one channel".into(),
            ));
        }
        let mut values = Vec::with_capacity(rows.len() * channels);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != channels {
                return Err(BiosigError::Validation(format!(
                    "sample {index} has {} values, expected {channels}",
                    row.len()
                )));
            }
            values.extend(row);
        }
        Ok(Self { values, channels })
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_interleaved(values: Vec<f64>, channels: usize) -> Result<Self> {
        if channels == 0 || values.len() % channels != 0 {
            return Err(BiosigError::Validation(format!(
                "{} values cannot be split into samples of {channels} channels",
                values.len()
            )));
        }
        Ok(Self { values, channels })
    }

    /// An empty matrix with the given channel count.
    pub fn empty(channels: usize) -> Self {
        Self {
            values: Vec::new(),
            channels: channels.max(1),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len() / self.channels
    }

    /// Whether the matrix holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Channel values per sample.
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// All channel values of sample `index`.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.channels)?;
        self.values.get(start..start + self.channels)
    }

    /// Iterate over sample rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.channels)
    }

    /// Copy one channel (column) out of the matrix.
    pub fn column(&self, channel: usize) -> Option<Vec<f64>> {
        if channel >= self.channels {
            return None;
        }
        Some(self.rows().map(|row| row[channel]).collect())
    }
}

/// Ordered channel names, index-aligned with the matrix columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelSet {
    names: Vec<String>,
}

impl ChannelSet {
    /// Create a channel set from names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Generic names `Channel 1..=count`.
    pub fn numbered(count: usize) -> Self {
        Self {
            names: (1..=count).map(|i| format!("Channel {i}")).collect(),
        }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no channels are named.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of channel `index`, if present.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Position of the channel called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// All names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A validated multi-channel recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Identifier (record id or file name)
    pub id: String,
    /// Channel names
    pub channels: ChannelSet,
    /// Sample data
    pub samples: SampleMatrix,
    /// Sampling rate in Hz
    pub sampling_rate: u32,
}

impl Recording {
    /// Assemble a recording, checking that names and columns line up.
    pub fn new(
        id: impl Into<String>,
        channels: ChannelSet,
        samples: SampleMatrix,
        sampling_rate: u32,
    ) -> Result<Self> {
        if sampling_rate == 0 {
            return Err(BiosigError::Validation(
                "sampling rate must be a positive integer".into(),
            ));
        }
        if channels.len() != samples.channel_count() {
            return Err(BiosigError::Validation(format!(
                "{} channel names for {} data columns",
                channels.len(),
                samples.channel_count()
            )));
        }
        Ok(Self {
            id: id.into(),
            channels,
            samples,
            sampling_rate,
        })
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate as f64
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.samples.channel_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_must_match_stride() {
        let err = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]], 2).unwrap_err();
        assert!(matches!(err, BiosigError::Validation(_)));
    }

    #[test]
    fn test_row_and_column_access() {
        let m = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(m.row(2), None);
        assert_eq!(m.column(1), Some(vec![2.0, 4.0]));
        assert_eq!(m.column(2), None);
    }

    #[test]
    fn test_recording_rejects_name_mismatch() {
        let m = SampleMatrix::from_rows(vec![vec![1.0, 2.0]], 2).unwrap();
        let err = Recording::new("r", ChannelSet::numbered(3), m, 500).unwrap_err();
        assert!(matches!(err, BiosigError::Validation(_)));
    }

    #[test]
    fn test_duration() {
        let m = SampleMatrix::from_interleaved(vec![0.0; 1000], 1).unwrap();
        let rec = Recording::new("r", ChannelSet::numbered(1), m, 500).unwrap();
        assert_eq!(rec.duration_secs(), 2.0);
    }
}
