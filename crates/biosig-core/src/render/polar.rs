//! Polar sweep plot
//!
//! Each sample lands at an angle given by its position within one window
//! length (`samplesPerCycle`), so successive passes overlay on the same
//! angles. Angle 0 is at the top and angles grow clockwise.

use super::palette::{channel_color, Rgb};
use super::{RenderOutcome, RenderSkip};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// How values are brought into `[-1, 1]` before the radius mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolarScaling {
    /// Data min/max of the current window
    #[default]
    Auto,
    /// Caller-supplied value range
    Range {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Values are already in `[-1, 1]`
    Unit,
}

/// Snapshot the polar renderer draws from.
#[derive(Debug, Clone, Copy)]
pub struct PolarInput<'a> {
    /// Buffered values, one vector per channel, oldest first
    pub channels: &'a [Vec<f64>],
    /// Sampling rate in Hz
    pub sampling_rate: u32,
    /// Visible window in seconds; one revolution spans this long
    pub window_seconds: f64,
    /// Outer radius scale
    pub base_radius: f64,
    /// Value normalization
    pub scaling: PolarScaling,
    /// Channel labels, by position in `channels`
    pub names: &'a [String],
}

/// One polar sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    /// Angle in radians, clockwise from the top
    pub theta: f64,
    /// Radius
    pub r: f64,
    /// Cartesian x (`r·sin θ`)
    pub x: f64,
    /// Cartesian y (`r·cos θ`)
    pub y: f64,
}

impl PolarPoint {
    fn new(theta: f64, r: f64) -> Self {
        Self {
            theta,
            r,
            x: r * theta.sin(),
            y: r * theta.cos(),
        }
    }
}

/// One channel's polar curve, points in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarCurve {
    /// Legend label
    pub label: String,
    /// Line color
    pub color: Rgb,
    /// Points to join with straight segments
    pub points: Vec<PolarPoint>,
}

/// Geometry of a polar plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarPlot {
    /// Samples per revolution
    pub samples_per_cycle: usize,
    /// Radius scale the curves were laid out with
    pub base_radius: f64,
    /// One curve per channel
    pub curves: Vec<PolarCurve>,
}

impl PolarPlot {
    /// Largest radius a value in `[-1, 1]` can reach.
    pub fn extent(&self) -> f64 {
        self.base_radius * 0.9
    }
}

/// Map each buffered value to `(θ, r)`.
///
/// `θ = 2π·(i mod C)/C` for buffer index `i` and `C = round(window × rate)`;
/// `r = R·0.5 + value·R·0.4`.
pub fn render_polar(input: &PolarInput<'_>) -> RenderOutcome<PolarPlot> {
    let samples = input.channels.first().map_or(0, Vec::len);
    if samples < 2 {
        return RenderOutcome::Skipped(RenderSkip::TooFewPoints);
    }
    if let PolarScaling::Range { min, max } = input.scaling {
        if !(min < max) {
            return RenderOutcome::Skipped(RenderSkip::ZeroRange);
        }
    }

    let samples_per_cycle = crate::window::capacity_for(input.window_seconds, input.sampling_rate);
    let base = input.base_radius;

    let curves = input
        .channels
        .iter()
        .enumerate()
        .map(|(ch, values)| {
            let scaled = match input.scaling {
                PolarScaling::Auto => normalize(values),
                PolarScaling::Range { min, max } => {
                    let center = (max + min) / 2.0;
                    let half = (max - min) / 2.0;
                    values.iter().map(|v| (v - center) / half).collect()
                }
                PolarScaling::Unit => values.clone(),
            };
            let points = scaled
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    let theta = TAU * (i % samples_per_cycle) as f64 / samples_per_cycle as f64;
                    PolarPoint::new(theta, base * 0.5 + value * base * 0.4)
                })
                .collect();
            PolarCurve {
                label: input
                    .names
                    .get(ch)
                    .cloned()
                    .unwrap_or_else(|| format!("Channel {}", ch + 1)),
                color: channel_color(ch),
                points,
            }
        })
        .collect();

    RenderOutcome::Drawn(PolarPlot {
        samples_per_cycle,
        base_radius: base,
        curves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(channels: &[Vec<f64>], scaling: PolarScaling) -> PolarInput<'_> {
        PolarInput {
            channels,
            sampling_rate: 4,
            window_seconds: 1.0,
            base_radius: 1.0,
            scaling,
            names: &[],
        }
    }

    #[test]
    fn test_too_few_points() {
        let channels = vec![vec![1.0]];
        let outcome = render_polar(&input(&channels, PolarScaling::Auto));
        assert_eq!(outcome.skip_reason(), Some(RenderSkip::TooFewPoints));
    }

    #[test]
    fn test_invalid_range_is_zero_range() {
        let channels = vec![vec![1.0, 2.0]];
        let scaling = PolarScaling::Range { min: 1.0, max: 1.0 };
        let outcome = render_polar(&input(&channels, scaling));
        assert_eq!(outcome.skip_reason(), Some(RenderSkip::ZeroRange));
    }

    #[test]
    fn test_angles_start_at_top_and_go_clockwise() {
        let channels = vec![vec![0.0, 0.0, 0.0, 0.0]];
        let plot = render_polar(&input(&channels, PolarScaling::Unit))
            .drawn()
            .unwrap();
        let points = &plot.curves[0].points;
        assert_eq!(plot.samples_per_cycle, 4);
        assert_relative_eq!(points[0].x, 0.0);
        assert_relative_eq!(points[0].y, 0.5);
        // a quarter turn clockwise lands on the right
        assert_relative_eq!(points[1].x, 0.5);
        assert_relative_eq!(points[1].y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_keyed_by_buffer_index() {
        // six samples over a four-sample cycle: the tail overlays the start
        let channels = vec![vec![0.0; 6]];
        let plot = render_polar(&input(&channels, PolarScaling::Unit))
            .drawn()
            .unwrap();
        let points = &plot.curves[0].points;
        assert_relative_eq!(points[0].theta, 0.0);
        assert_relative_eq!(points[1].theta, TAU / 4.0);
        assert_relative_eq!(points[4].theta, 0.0);
        assert_relative_eq!(points[5].theta, TAU / 4.0);
    }

    #[test]
    fn test_range_scaling_maps_radius() {
        let channels = vec![vec![0.0, 10.0, 5.0]];
        let scaling = PolarScaling::Range { min: 0.0, max: 10.0 };
        let plot = render_polar(&input(&channels, scaling)).drawn().unwrap();
        let radii: Vec<f64> = plot.curves[0].points.iter().map(|p| p.r).collect();
        assert_relative_eq!(radii[0], 0.1);
        assert_relative_eq!(radii[1], 0.9);
        assert_relative_eq!(radii[2], 0.5);
        assert_relative_eq!(plot.extent(), 0.9);
    }

    #[test]
    fn test_auto_matches_range_of_data() {
        let channels = vec![vec![-3.0, 1.0, 7.0]];
        let auto = render_polar(&input(&channels, PolarScaling::Auto))
            .drawn()
            .unwrap();
        let range = PolarScaling::Range { min: -3.0, max: 7.0 };
        let fixed = render_polar(&input(&channels, range)).drawn().unwrap();
        for (a, b) in auto.curves[0].points.iter().zip(&fixed.curves[0].points) {
            assert_relative_eq!(a.r, b.r, epsilon = 1e-12);
        }
    }
}
