//! Pixel-independent plot models
//!
//! Renderers turn a window snapshot into geometry (traces, polar points,
//! density cells). Front ends only map the geometry onto their canvas.
//! Degenerate input (nothing buffered, constant axis) is reported as a
//! [`RenderSkip`], never as an error or a panic.

pub mod linear;
pub mod palette;
pub mod polar;
pub mod recurrence;

pub use linear::{render_linear, LinearInput, LinearPlot, Trace};
pub use palette::{channel_color, density_color, Rgb, CHANNEL_COLORS};
pub use polar::{render_polar, PolarCurve, PolarInput, PolarPlot, PolarPoint, PolarScaling};
pub use recurrence::{axis_ranges, DensityCell, RecurrenceHistogram};

use std::fmt;

/// Reason a draw step was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSkip {
    /// No samples to draw
    Empty,
    /// Fewer points than the plot needs to draw a line
    TooFewPoints,
    /// Zero-width value range on an axis
    ZeroRange,
}

impl fmt::Display for RenderSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderSkip::Empty => "no samples",
            RenderSkip::TooFewPoints => "not enough points",
            RenderSkip::ZeroRange => "zero value range",
        })
    }
}

/// Result of a draw step.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome<T> {
    /// Geometry to draw
    Drawn(T),
    /// Nothing to draw this frame
    Skipped(RenderSkip),
}

impl<T> RenderOutcome<T> {
    /// The geometry, if drawn.
    pub fn drawn(self) -> Option<T> {
        match self {
            RenderOutcome::Drawn(plot) => Some(plot),
            RenderOutcome::Skipped(_) => None,
        }
    }

    /// Borrow the geometry, if drawn.
    pub fn as_drawn(&self) -> Option<&T> {
        match self {
            RenderOutcome::Drawn(plot) => Some(plot),
            RenderOutcome::Skipped(_) => None,
        }
    }

    /// The skip reason, if skipped.
    pub fn skip_reason(&self) -> Option<RenderSkip> {
        match self {
            RenderOutcome::Drawn(_) => None,
            RenderOutcome::Skipped(reason) => Some(*reason),
        }
    }

    /// Transform the geometry.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RenderOutcome<U> {
        match self {
            RenderOutcome::Drawn(plot) => RenderOutcome::Drawn(f(plot)),
            RenderOutcome::Skipped(reason) => RenderOutcome::Skipped(reason),
        }
    }
}
