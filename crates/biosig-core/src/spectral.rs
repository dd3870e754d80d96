//! Dominant-frequency tracking and amplitude overview
//!
//! Used to analyze synthesized or downloaded Doppler clips: a Hamming-windowed
//! short-time FFT reports the strongest bin of each hop, and a decimated
//! amplitude series gives a quick waveform overview.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;
use std::f64::consts::PI;

/// FFT window length.
pub const WINDOW_SIZE: usize = 2048;
/// Distance between window starts.
pub const HOP_SIZE: usize = 512;
/// Target length of the amplitude overview.
pub const OVERVIEW_POINTS: usize = 2000;

/// Hamming window coefficients `0.54 − 0.46·cos(2πi/(N−1))`.
pub fn hamming(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
        .collect()
}

/// Dominant frequency (Hz) of each analysis window.
///
/// Windows start at `0, 512, 1024, …` while `start < len − 2048`. Within each
/// window the first bin with the largest magnitude among `0..N/2` wins.
/// Input shorter than one window yields nothing.
pub fn dominant_frequencies(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    let len = samples.len();
    if len <= WINDOW_SIZE {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(WINDOW_SIZE);
    let window = hamming(WINDOW_SIZE);
    let bin_hz = sample_rate as f64 / WINDOW_SIZE as f64;

    let mut track = Vec::with_capacity((len - WINDOW_SIZE) / HOP_SIZE + 1);
    let mut buffer = vec![Complex::new(0.0, 0.0); WINDOW_SIZE];
    let mut start = 0;
    while start < len - WINDOW_SIZE {
        for ((slot, &s), &w) in buffer
            .iter_mut()
            .zip(&samples[start..start + WINDOW_SIZE])
            .zip(&window)
        {
            *slot = Complex::new(s as f64 * w, 0.0);
        }
        fft.process(&mut buffer);
        track.push(peak_bin(&buffer[..WINDOW_SIZE / 2]) as f64 * bin_hz);
        start += HOP_SIZE;
    }
    track
}

/// Index of the first bin with the largest magnitude.
fn peak_bin(spectrum: &[Complex<f64>]) -> usize {
    let mut best = 0;
    let mut best_mag = f64::MIN;
    for (i, c) in spectrum.iter().enumerate() {
        let mag = c.norm();
        if mag > best_mag {
            best = i;
            best_mag = mag;
        }
    }
    best
}

/// Every `stride`-th sample with its time, `stride = max(1, len / 2000)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AmplitudeOverview {
    /// Decimation stride
    pub stride: usize,
    /// Seconds
    pub time: Vec<f64>,
    /// Sample values
    pub amplitude: Vec<f64>,
}

impl AmplitudeOverview {
    /// Decimate `samples` for plotting.
    pub fn new(samples: &[f32], sample_rate: u32) -> Self {
        let stride = (samples.len() / OVERVIEW_POINTS).max(1);
        let rate = sample_rate.max(1) as f64;
        let (time, amplitude) = samples
            .iter()
            .enumerate()
            .step_by(stride)
            .map(|(i, &s)| (i as f64 / rate, s as f64))
            .unzip();
        Self {
            stride,
            time,
            amplitude,
        }
    }
}

/// Summary of a clip analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralAnalysis {
    /// Sample rate of the analyzed clip
    pub sample_rate: u32,
    /// Clip length in seconds
    pub duration_secs: f64,
    /// Dominant frequency per hop
    pub dominant: Vec<f64>,
    /// Decimated waveform
    pub overview: AmplitudeOverview,
    /// Highest dominant frequency, if any window was analyzed
    pub max_frequency: Option<f64>,
    /// Lowest dominant frequency, if any window was analyzed
    pub min_frequency: Option<f64>,
}

impl SpectralAnalysis {
    /// Analyze a mono clip.
    pub fn run(samples: &[f32], sample_rate: u32) -> Self {
        let dominant = dominant_frequencies(samples, sample_rate);
        let range = crate::normalize::finite_range(&dominant);
        Self {
            sample_rate,
            duration_secs: samples.len() as f64 / sample_rate.max(1) as f64,
            overview: AmplitudeOverview::new(samples, sample_rate),
            max_frequency: range.map(|r| r.1),
            min_frequency: range.map(|r| r.0),
            dominant,
        }
    }

    /// Time of the `index`-th dominant-frequency window start.
    pub fn window_time(&self, index: usize) -> f64 {
        (index * HOP_SIZE) as f64 / self.sample_rate.max(1) as f64
    }
}

/// Mix interleaved frames down to mono by averaging channels.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    let channels = channels.max(1);
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(freq: f64, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin() as f32)
            .collect()
    }

    /// Dominant frequency of one window by direct DFT.
    fn dft_peak(window: &[f32], rate: u32) -> f64 {
        let n = window.len();
        let coeffs = hamming(n);
        let mut best = 0;
        let mut best_mag = f64::MIN;
        for k in 0..n / 2 {
            let (mut re, mut im) = (0.0, 0.0);
            for (i, (&s, &w)) in window.iter().zip(&coeffs).enumerate() {
                let angle = -2.0 * PI * (k * i) as f64 / n as f64;
                re += s as f64 * w * angle.cos();
                im += s as f64 * w * angle.sin();
            }
            let mag = (re * re + im * im).sqrt();
            if mag > best_mag {
                best = k;
                best_mag = mag;
            }
        }
        best as f64 * rate as f64 / n as f64
    }

    #[test]
    fn test_hamming_shape() {
        let w = hamming(5);
        assert_relative_eq!(w[0], 0.08, epsilon = 1e-12);
        assert_relative_eq!(w[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[4], 0.08, epsilon = 1e-12);
    }

    #[test]
    fn test_window_count() {
        let samples = vec![0.0f32; 4096];
        // starts 0, 512, 1024, 1536 (2048 is not < 4096 - 2048)
        assert_eq!(dominant_frequencies(&samples, 44100).len(), 4);
        assert!(dominant_frequencies(&samples[..2048], 44100).is_empty());
    }

    #[test]
    fn test_matches_direct_dft() {
        let rate = 8000;
        let samples = sine(1000.0, rate, 2048 + 512 + 1);
        let track = dominant_frequencies(&samples, rate);
        assert_eq!(track.len(), 2);
        assert_relative_eq!(track[0], dft_peak(&samples[..2048], rate));
        assert_relative_eq!(track[1], dft_peak(&samples[512..2560], rate));
        assert_relative_eq!(track[0], 1000.0, epsilon = rate as f64 / 2048.0);
    }

    #[test]
    fn test_overview_stride() {
        let samples = vec![0.5f32; 10_000];
        let overview = AmplitudeOverview::new(&samples, 1000);
        assert_eq!(overview.stride, 5);
        assert_eq!(overview.amplitude.len(), 2000);
        assert_relative_eq!(overview.time[1], 0.005);

        let short = AmplitudeOverview::new(&samples[..10], 1000);
        assert_eq!(short.stride, 1);
        assert_eq!(short.amplitude.len(), 10);
    }

    #[test]
    fn test_downmix() {
        assert_eq!(downmix(&[1.0, 0.0, 0.5, 0.5], 2), vec![0.5, 0.5]);
    }

    #[test]
    fn test_analysis_summary() {
        let samples = sine(500.0, 8000, 8000);
        let analysis = SpectralAnalysis::run(&samples, 8000);
        assert_relative_eq!(analysis.duration_secs, 1.0);
        let max = analysis.max_frequency.unwrap();
        assert!((max - 500.0).abs() <= 8000.0 / 2048.0);
        assert!(SpectralAnalysis::run(&[], 8000).max_frequency.is_none());
    }
}
