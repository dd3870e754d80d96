//! Doppler siren synthesis
//!
//! Models a siren passing a listener in a straight line at constant speed.
//! The listener sits [`LISTENER_DISTANCE`] metres from the path and the source
//! is closest at the midpoint of the clip. The siren itself sweeps up and down
//! by [`SWEEP_DEPTH_HZ`] over a [`SWEEP_CYCLE_SECS`] triangle; the observed
//! frequency adds the Doppler shift on top of that sweep. The output is a
//! square-wave carrier under an inverse-square loudness envelope, panned
//! across the stereo field as the source goes by.

use crate::{BiosigError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Closest approach between path and listener, in metres.
pub const LISTENER_DISTANCE: f64 = 10.0;
/// Speed of sound in air, m/s.
pub const SPEED_OF_SOUND: f64 = 343.0;
/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;
/// Period of the siren's triangle sweep.
pub const SWEEP_CYCLE_SECS: f64 = 4.0;
/// Peak upward excursion of the sweep.
pub const SWEEP_DEPTH_HZ: f64 = 350.0;
/// Longest clip that will be synthesized.
pub const MAX_DURATION_SECS: f64 = 300.0;
/// Default number of points in the decimated plot trace.
pub const DEFAULT_PLOT_POINTS: usize = 1000;

/// Synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerParams {
    /// Siren base frequency in Hz
    pub frequency_hz: f64,
    /// Source speed in m/s
    pub velocity_mps: f64,
    /// Clip length in seconds
    pub duration_secs: f64,
}

impl DopplerParams {
    /// Validated parameters.
    pub fn new(frequency_hz: f64, velocity_mps: f64, duration_secs: f64) -> Result<Self> {
        let params = Self {
            frequency_hz,
            velocity_mps,
            duration_secs,
        };
        params.validate()?;
        Ok(params)
    }

    /// Reject inputs the model cannot synthesize.
    pub fn validate(&self) -> Result<()> {
        positive("frequency", self.frequency_hz)?;
        positive("velocity", self.velocity_mps)?;
        positive("duration", self.duration_secs)?;
        if self.velocity_mps >= SPEED_OF_SOUND {
            return Err(BiosigError::Validation(format!(
                "velocity {} m/s must stay below the speed of sound ({SPEED_OF_SOUND} m/s)",
                self.velocity_mps
            )));
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return Err(BiosigError::Validation(format!(
                "duration {}s exceeds the {MAX_DURATION_SECS}s limit",
                self.duration_secs
            )));
        }
        if self.sample_count() == 0 {
            return Err(BiosigError::Validation(format!(
                "duration {}s is shorter than one sample",
                self.duration_secs
            )));
        }
        Ok(())
    }

    /// `floor(duration × 44100)`.
    pub fn sample_count(&self) -> usize {
        (self.duration_secs * SAMPLE_RATE as f64).floor() as usize
    }

    /// Time of closest approach.
    pub fn closest_approach(&self) -> f64 {
        self.duration_secs / 2.0
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BiosigError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

/// Source kinematics at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Signed position along the path (negative before closest approach)
    pub x: f64,
    /// Distance to the listener
    pub r: f64,
    /// Radial velocity, positive when approaching
    pub radial_velocity: f64,
}

impl Kinematics {
    /// Position and radial velocity at time `t`.
    pub fn at(params: &DopplerParams, t: f64) -> Self {
        let x = params.velocity_mps * (t - params.closest_approach());
        let r = (x * x + LISTENER_DISTANCE * LISTENER_DISTANCE).sqrt();
        Self {
            x,
            r,
            radial_velocity: params.velocity_mps * (-x) / r,
        }
    }

    /// Stereo position in `[-1, 1]`.
    pub fn pan(&self) -> f64 {
        self.x / self.r
    }
}

/// Siren frequency before the Doppler shift.
pub fn source_frequency(base_hz: f64, t: f64) -> f64 {
    let p = (t / SWEEP_CYCLE_SECS) % 1.0;
    let tri = if p <= 0.5 { 2.0 * p } else { 2.0 - 2.0 * p };
    base_hz + SWEEP_DEPTH_HZ * tri
}

/// Frequency heard by the listener at time `t`.
pub fn observed_frequency(params: &DopplerParams, t: f64) -> f64 {
    let k = Kinematics::at(params, t);
    source_frequency(params.frequency_hz, t) * SPEED_OF_SOUND / (SPEED_OF_SOUND - k.radial_velocity)
}

/// Stereo PCM output.
#[derive(Debug, Clone, PartialEq)]
pub struct DopplerWaveform {
    /// Left channel in `[-1, 1]`
    pub left: Vec<f32>,
    /// Right channel in `[-1, 1]`
    pub right: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DopplerWaveform {
    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the waveform holds no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Largest `sqrt(l² + r²)`; the pre-pan peak since panning is constant-power.
    pub fn combined_peak(&self) -> f32 {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| (l * l + r * r).sqrt())
            .fold(0.0, f32::max)
    }

    /// Interleaved `L R L R …` frames.
    pub fn interleaved(&self) -> Vec<f32> {
        self.left
            .iter()
            .zip(&self.right)
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }
}

/// Decimated series for plotting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DopplerTrace {
    /// Seconds
    pub time: Vec<f64>,
    /// Normalized mono signal
    pub amplitude: Vec<f64>,
    /// Observed frequency in Hz
    pub frequency: Vec<f64>,
}

impl DopplerTrace {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the trace has no points.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Frequency summary of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerStats {
    /// Highest observed frequency
    pub max_observed: f64,
    /// Lowest observed frequency
    pub min_observed: f64,
    /// `max_observed / min_observed`
    pub shift_ratio: f64,
}

/// Complete synthesis result.
#[derive(Debug, Clone, PartialEq)]
pub struct DopplerRender {
    /// Stereo audio
    pub waveform: DopplerWaveform,
    /// Plot series
    pub trace: DopplerTrace,
    /// Frequency summary
    pub stats: DopplerStats,
}

/// Synthesize a pass with the default plot resolution.
pub fn synthesize(params: &DopplerParams) -> Result<DopplerRender> {
    synthesize_with(params, DEFAULT_PLOT_POINTS)
}

/// Synthesize a pass, decimating the plot trace to about `plot_points` points.
pub fn synthesize_with(params: &DopplerParams, plot_points: usize) -> Result<DopplerRender> {
    params.validate()?;

    let n = params.sample_count();
    let fs = SAMPLE_RATE as f64;
    let dt = 1.0 / fs;

    // Envelope peak, used to normalize 1/r² to 1.
    let envelope_peak = (0..n)
        .map(|i| 1.0 / Kinematics::at(params, i as f64 / fs).r.powi(2))
        .fold(0.0, f64::max);

    let mut signal = Vec::with_capacity(n);
    let mut pans = Vec::with_capacity(n);
    let mut phase = 0.0_f64;
    let mut max_observed = f64::MIN;
    let mut min_observed = f64::MAX;
    for i in 0..n {
        let t = i as f64 / fs;
        let k = Kinematics::at(params, t);
        let f_o = source_frequency(params.frequency_hz, t) * SPEED_OF_SOUND
            / (SPEED_OF_SOUND - k.radial_velocity);
        max_observed = max_observed.max(f_o);
        min_observed = min_observed.min(f_o);

        phase = (phase + TAU * f_o * dt) % TAU;
        let envelope = 1.0 / (k.r * k.r) / envelope_peak;
        signal.push(square(phase) * envelope);
        pans.push(k.pan());
    }

    let peak = signal.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        signal.iter_mut().for_each(|s| *s /= peak);
    }

    let (left, right) = signal
        .iter()
        .zip(&pans)
        .map(|(&s, &pan)| {
            (
                (s * (0.5 * (1.0 - pan)).sqrt()) as f32,
                (s * (0.5 * (1.0 + pan)).sqrt()) as f32,
            )
        })
        .unzip();

    let stride = (n / plot_points.max(1)).max(1);
    let points = n / stride;
    let mut trace = DopplerTrace {
        time: Vec::with_capacity(points),
        amplitude: Vec::with_capacity(points),
        frequency: Vec::with_capacity(points),
    };
    for j in 0..points {
        let i = j * stride;
        let t = i as f64 / fs;
        trace.time.push(t);
        trace.amplitude.push(signal[i]);
        trace.frequency.push(observed_frequency(params, t));
    }

    log::debug!(
        "synthesized {n} frames at {} Hz, {} plot points, shift {:.3}",
        SAMPLE_RATE,
        trace.len(),
        max_observed / min_observed
    );

    Ok(DopplerRender {
        waveform: DopplerWaveform {
            left,
            right,
            sample_rate: SAMPLE_RATE,
        },
        trace,
        stats: DopplerStats {
            max_observed,
            min_observed,
            shift_ratio: max_observed / min_observed,
        },
    })
}

/// Square wave `sign(sin φ)` with `sign(0) = 0`.
#[inline]
fn square(phase: f64) -> f64 {
    let s = phase.sin();
    if s > 0.0 {
        1.0
    } else if s < 0.0 {
        -1.0
    } else {
        0.0
    }
}
