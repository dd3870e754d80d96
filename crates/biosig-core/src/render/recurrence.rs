//! Two-channel density histogram (recurrence plot)
//!
//! Pairs `(a[i], b[i])` are binned on a `bins × bins` grid over the capped
//! prefix of both channels. Only occupied bins are emitted for drawing, colored
//! by their count relative to the fullest bin.

use super::palette::{density_color, Rgb};
use super::{RenderOutcome, RenderSkip};
use crate::normalize::finite_range;

/// Default number of pairs binned per draw.
pub const DEFAULT_SAMPLE_CAP: usize = 500;
/// Default pair cap for the real-time variant.
pub const DEFAULT_REALTIME_SAMPLE_CAP: usize = 5000;
/// Default grid resolution per axis.
pub const DEFAULT_BINS: usize = 100;

/// One occupied grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityCell {
    /// Bin index along the first channel
    pub column: usize,
    /// Bin index along the second channel
    pub row: usize,
    /// Pairs that fell in this bin
    pub count: u32,
    /// Gradient color for `count / max_count`
    pub color: Rgb,
}

/// Binned joint distribution of two channels.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceHistogram {
    bins: usize,
    counts: Vec<u32>,
    x_range: (f64, f64),
    y_range: (f64, f64),
    max_count: u32,
}

/// Value ranges of the capped prefixes of `a` and `b`, `None` when either
/// has no finite value.
pub fn axis_ranges(a: &[f64], b: &[f64], sample_cap: usize) -> Option<((f64, f64), (f64, f64))> {
    let n = sample_cap.min(a.len()).min(b.len());
    Some((finite_range(&a[..n])?, finite_range(&b[..n])?))
}

impl RecurrenceHistogram {
    /// Bin the first `min(cap, len a, len b)` pairs.
    ///
    /// Pairs containing a non-finite value are left out.
    pub fn build(a: &[f64], b: &[f64], sample_cap: usize, bins: usize) -> RenderOutcome<Self> {
        let n = sample_cap.min(a.len()).min(b.len());
        if n == 0 {
            return RenderOutcome::Skipped(RenderSkip::Empty);
        }
        let Some((x_range, y_range)) = axis_ranges(a, b, sample_cap) else {
            return RenderOutcome::Skipped(RenderSkip::Empty);
        };
        if x_range.0 == x_range.1 || y_range.0 == y_range.1 {
            return RenderOutcome::Skipped(RenderSkip::ZeroRange);
        }

        let bins = bins.max(1);
        let mut counts = vec![0u32; bins * bins];
        for (&x, &y) in a[..n].iter().zip(&b[..n]) {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let column = bin_index(x, x_range, bins);
            let row = bin_index(y, y_range, bins);
            counts[row * bins + column] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(0);

        RenderOutcome::Drawn(Self {
            bins,
            counts,
            x_range,
            y_range,
            max_count,
        })
    }

    /// Grid resolution per axis.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Count at `(column, row)`; zero outside the grid.
    pub fn count(&self, column: usize, row: usize) -> u32 {
        if column >= self.bins || row >= self.bins {
            return 0;
        }
        self.counts[row * self.bins + column]
    }

    /// Total binned pairs.
    pub fn sum(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Count of the fullest bin.
    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Value range of the first channel.
    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    /// Value range of the second channel.
    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Occupied bins with their colors, row by row.
    pub fn cells(&self) -> Vec<DensityCell> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, &count)| DensityCell {
                column: i % self.bins,
                row: i / self.bins,
                count,
                color: density_color(count, self.max_count),
            })
            .collect()
    }

    /// Value at the lower edge of a bin along an axis range.
    pub fn bin_value(range: (f64, f64), index: usize, bins: usize) -> f64 {
        if bins <= 1 {
            return range.0;
        }
        range.0 + (range.1 - range.0) * index as f64 / (bins - 1) as f64
    }
}

#[inline]
fn bin_index(value: f64, (min, max): (f64, f64), bins: usize) -> usize {
    let index = ((value - min) / (max - min) * (bins - 1) as f64).floor();
    (index.max(0.0) as usize).min(bins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::DENSITY_STOPS;

    #[test]
    fn test_sum_equals_capped_length() {
        let a: Vec<f64> = (0..800).map(|i| (i as f64 * 0.1).sin()).collect();
        let b: Vec<f64> = (0..700).map(|i| (i as f64 * 0.1).cos()).collect();
        let hist = RecurrenceHistogram::build(&a, &b, DEFAULT_SAMPLE_CAP, DEFAULT_BINS)
            .drawn()
            .unwrap();
        assert_eq!(hist.sum(), 500);

        let hist = RecurrenceHistogram::build(&a, &b, 5000, DEFAULT_BINS)
            .drawn()
            .unwrap();
        assert_eq!(hist.sum(), 700);
    }

    #[test]
    fn test_bin_indices_stay_in_grid() {
        let a = [0.0, 1.0, 0.5];
        let b = [0.0, 1.0, 0.25];
        let hist = RecurrenceHistogram::build(&a, &b, 10, 5).drawn().unwrap();
        assert_eq!(hist.count(0, 0), 1);
        assert_eq!(hist.count(4, 4), 1);
        assert_eq!(hist.count(2, 1), 1);
        assert_eq!(hist.count(5, 0), 0);
    }

    #[test]
    fn test_empty_and_constant_inputs_skip() {
        let outcome = RecurrenceHistogram::build(&[], &[1.0], 500, 100);
        assert_eq!(outcome.skip_reason(), Some(RenderSkip::Empty));

        let outcome = RecurrenceHistogram::build(&[1.0, 1.0], &[0.0, 2.0], 500, 100);
        assert_eq!(outcome.skip_reason(), Some(RenderSkip::ZeroRange));
        assert_eq!(
            axis_ranges(&[1.0, 1.0], &[0.0, 2.0], 500),
            Some(((1.0, 1.0), (0.0, 2.0)))
        );
    }

    #[test]
    fn test_hottest_bin_gets_last_stop() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 0.0, 0.0, 1.0];
        let hist = RecurrenceHistogram::build(&a, &b, 500, 10).drawn().unwrap();
        let cells = hist.cells();
        assert_eq!(cells.len(), 2);
        assert_eq!(hist.max_count(), 3);
        let hottest = cells.iter().find(|c| c.count == 3).unwrap();
        assert_eq!(hottest.color, DENSITY_STOPS[5]);
    }

    #[test]
    fn test_non_finite_pairs_are_dropped() {
        let a = [0.0, f64::NAN, 1.0];
        let b = [0.0, 0.5, 1.0];
        let hist = RecurrenceHistogram::build(&a, &b, 500, 10).drawn().unwrap();
        assert_eq!(hist.sum(), 2);
    }

    #[test]
    fn test_bin_value() {
        assert_eq!(RecurrenceHistogram::bin_value((0.0, 1.0), 4, 5), 1.0);
        assert_eq!(RecurrenceHistogram::bin_value((2.0, 4.0), 0, 1), 2.0);
    }
}
