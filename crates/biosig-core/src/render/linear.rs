//! Time-domain trace plot

use super::palette::{channel_color, Rgb};
use super::{RenderOutcome, RenderSkip};
use crate::normalize::Scaling;

/// Snapshot the linear renderer draws from.
#[derive(Debug, Clone, Copy)]
pub struct LinearInput<'a> {
    /// Buffered values, one vector per channel, oldest first
    pub channels: &'a [Vec<f64>],
    /// Window read pointer into the source
    pub pointer: usize,
    /// Source length in samples
    pub source_len: usize,
    /// Sampling rate in Hz
    pub sampling_rate: u32,
    /// Visible window in seconds
    pub window_seconds: f64,
    /// Channel labels, by position in `channels`
    pub names: &'a [String],
    /// Amplitude scaling
    pub scaling: Scaling,
}

/// One channel's polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Legend label
    pub label: String,
    /// Line color
    pub color: Rgb,
    /// `(seconds, amplitude)` points; NaN amplitudes are gaps
    pub points: Vec<(f64, f64)>,
}

/// Geometry of a linear plot.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPlot {
    /// Time of the oldest visible sample
    pub start_time: f64,
    /// Source-relative time of the read pointer
    pub end_time: f64,
    /// One trace per channel, index-aligned
    pub traces: Vec<Trace>,
}

impl LinearPlot {
    /// Time extent covered by the traces.
    pub fn x_bounds(&self) -> (f64, f64) {
        let last = self
            .traces
            .iter()
            .filter_map(|t| t.points.last().map(|p| p.0))
            .fold(self.start_time, f64::max);
        (self.start_time, last)
    }

    /// Finite amplitude extent over all traces, `(-1, 1)` when there is none.
    pub fn y_bounds(&self) -> (f64, f64) {
        let values: Vec<f64> = self
            .traces
            .iter()
            .flat_map(|t| t.points.iter().map(|p| p.1))
            .collect();
        crate::normalize::finite_range(&values).unwrap_or((-1.0, 1.0))
    }
}

/// Lay out one trace per channel along the window's time axis.
///
/// `endTime = (pointer / rate) mod (len / rate)` and
/// `startTime = max(0, endTime − window)`. Sample `i` of every channel is drawn
/// at `startTime + i / rate`.
pub fn render_linear(input: &LinearInput<'_>) -> RenderOutcome<LinearPlot> {
    let samples = input.channels.first().map_or(0, Vec::len);
    if samples == 0 || input.sampling_rate == 0 {
        return RenderOutcome::Skipped(RenderSkip::Empty);
    }

    let rate = input.sampling_rate as f64;
    let total = input.source_len as f64 / rate;
    let end_time = if total > 0.0 {
        (input.pointer as f64 / rate) % total
    } else {
        0.0
    };
    let start_time = (end_time - input.window_seconds).max(0.0);

    let traces = input
        .channels
        .iter()
        .enumerate()
        .map(|(ch, values)| {
            let label = input
                .names
                .get(ch)
                .cloned()
                .unwrap_or_else(|| format!("Channel {}", ch + 1));
            let points = input
                .scaling
                .apply(values)
                .into_iter()
                .enumerate()
                .map(|(i, y)| (start_time + i as f64 / rate, y))
                .collect();
            Trace {
                label,
                color: channel_color(ch),
                points,
            }
        })
        .collect();

    RenderOutcome::Drawn(LinearPlot {
        start_time,
        end_time,
        traces,
    })
}
