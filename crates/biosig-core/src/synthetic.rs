//! Synthetic ECG source for demo mode
//!
//! A piecewise-sine beat (P wave, QRS complex, T wave) at 1.2 beats per second.
//! Each channel is phase-shifted by 0.1 of a beat and carries a little uniform
//! noise from a seeded generator, so the same seed always yields the same
//! recording.

use crate::recording::{ChannelSet, Recording, SampleMatrix};
use crate::{BiosigError, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Beats per second.
pub const HEART_RATE: f64 = 1.2;
/// Default sampling rate of the synthetic source.
pub const DEFAULT_SAMPLING_RATE: u32 = 100;

const CHANNEL_PHASE_OFFSET: f64 = 0.1;
const NOISE_AMPLITUDE: f64 = 0.01;

/// Builder for a synthetic ECG [`Recording`].
#[derive(Debug, Clone)]
pub struct SyntheticEcg {
    channels: Vec<String>,
    sampling_rate: u32,
    duration_secs: f64,
    seed: u64,
}

impl Default for SyntheticEcg {
    fn default() -> Self {
        Self {
            channels: ["I", "II", "III", "aVR", "aVL", "aVF"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sampling_rate: DEFAULT_SAMPLING_RATE,
            duration_secs: 10.0,
            seed: 0,
        }
    }
}

impl SyntheticEcg {
    /// Six limb leads, 10 s at 100 Hz, seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lead names.
    pub fn channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    /// Set the sampling rate.
    pub fn sampling_rate(mut self, rate: u32) -> Self {
        self.sampling_rate = rate;
        self
    }

    /// Set the duration in seconds.
    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Set the noise seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the recording.
    pub fn generate(&self) -> Result<Recording> {
        if self.channels.is_empty() {
            return Err(BiosigError::Validation("at least one channel is required".into()));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(BiosigError::Validation(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.sampling_rate == 0 {
            return Err(BiosigError::Validation("sampling rate must be positive".into()));
        }

        let rate = self.sampling_rate as f64;
        let len = (self.duration_secs * rate).floor() as usize;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut values = Vec::with_capacity(len * self.channels.len());
        for i in 0..len {
            let t = i as f64 / rate;
            for ch in 0..self.channels.len() {
                let noise = rng.random_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
                values.push(beat_sample(t, ch) + noise);
            }
        }

        let samples = SampleMatrix::from_interleaved(values, self.channels.len())?;
        Recording::new(
            "synthetic-ecg",
            ChannelSet::new(self.channels.clone()),
            samples,
            self.sampling_rate,
        )
    }
}

/// Noise-free beat value at time `t` for channel `channel`.
pub fn beat_sample(t: f64, channel: usize) -> f64 {
    let phase = (t * HEART_RATE + channel as f64 * CHANNEL_PHASE_OFFSET) % 1.0;

    if phase < 0.15 {
        // P wave
        0.15 * (phase * PI / 0.15).sin()
    } else if (0.2..0.35).contains(&phase) {
        let q = (phase - 0.2) / 0.15;
        if q < 0.3 {
            -0.2 * (q * PI / 0.3).sin()
        } else if q < 0.5 {
            1.5 * ((q - 0.3) * PI / 0.2).sin()
        } else {
            -0.3 * ((q - 0.5) * PI / 0.5).sin()
        }
    } else if (0.45..0.7).contains(&phase) {
        // T wave
        0.3 * ((phase - 0.45) * PI / 0.25).sin()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_generate_shape() {
        let rec = SyntheticEcg::new().duration_secs(2.0).generate().unwrap();
        assert_eq!(rec.samples.len(), 200);
        assert_eq!(rec.channel_count(), 6);
        assert_eq!(rec.sampling_rate, 100);
    }

    #[test]
    fn test_same_seed_same_signal() {
        let a = SyntheticEcg::new().seed(7).duration_secs(1.0).generate().unwrap();
        let b = SyntheticEcg::new().seed(7).duration_secs(1.0).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_is_small() {
        let rec = SyntheticEcg::new().duration_secs(1.0).generate().unwrap();
        for (i, row) in rec.samples.rows().enumerate() {
            let t = i as f64 / 100.0;
            for (ch, &v) in row.iter().enumerate() {
                assert!((v - beat_sample(t, ch)).abs() <= NOISE_AMPLITUDE);
            }
        }
    }

    #[test]
    fn test_r_peak_height() {
        // q = 0.4 is the top of the R wave
        let phase = 0.2 + 0.4 * 0.15;
        assert_relative_eq!(beat_sample(phase / HEART_RATE, 0), 1.5, epsilon = 1e-9);
        assert_eq!(beat_sample(0.8 / HEART_RATE, 0), 0.0);
    }

    #[test]
    fn test_rejects_empty_channels() {
        assert!(SyntheticEcg::new().channels(Vec::new()).generate().is_err());
    }
}
