//! Sliding window over a multi-channel sample stream
//!
//! The window owns a read pointer into a [`SampleMatrix`] and a bounded FIFO of
//! the most recently read samples. It is advanced once per frame by the
//! scheduler's sample count and reset explicitly whenever its source, duration
//! or channel selection changes.

use crate::recording::SampleMatrix;
use std::collections::VecDeque;

/// What happens when the pointer reaches the end of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapPolicy {
    /// Treat the source as cyclic (linear and polar plots).
    Wrap,
    /// Stop the batch at the end and restart from sample 0 on the next call
    /// (real-time recurrence plot).
    Rewind,
    /// Stop at the end and stay there; later calls produce nothing.
    Halt,
}

/// Bounded most-recent-N view over a longer sample stream.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    pointer: usize,
    buffered: VecDeque<Vec<f64>>,
    capacity: usize,
    evicted: usize,
    policy: WrapPolicy,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` samples (at least 1).
    pub fn new(capacity: usize, policy: WrapPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            pointer: 0,
            buffered: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
            policy,
        }
    }

    /// Create a window sized for `duration_secs` of signal at `sampling_rate`.
    pub fn for_duration(duration_secs: f64, sampling_rate: u32, policy: WrapPolicy) -> Self {
        Self::new(capacity_for(duration_secs, sampling_rate), policy)
    }

    /// Read the next `count` samples starting at the pointer and advance it.
    ///
    /// The buffered samples are left untouched; see [`SlidingWindow::push`].
    pub fn take_next(&mut self, source: &SampleMatrix, count: usize) -> Vec<Vec<f64>> {
        let len = source.len();
        if len == 0 || count == 0 {
            return Vec::new();
        }

        let mut samples = Vec::with_capacity(count);
        match self.policy {
            WrapPolicy::Wrap => {
                for i in 0..count {
                    let index = (self.pointer + i) % len;
                    if let Some(row) = source.row(index) {
                        samples.push(row.to_vec());
                    }
                }
                self.pointer = (self.pointer + count) % len;
            }
            WrapPolicy::Rewind | WrapPolicy::Halt => {
                for i in 0..count {
                    match source.row(self.pointer + i) {
                        Some(row) => samples.push(row.to_vec()),
                        None => break,
                    }
                }
                self.pointer += samples.len();
                if self.policy == WrapPolicy::Rewind && self.pointer >= len {
                    self.pointer = 0;
                }
            }
        }
        samples
    }

    /// Append samples, evicting the oldest until the capacity holds.
    pub fn push(&mut self, samples: Vec<Vec<f64>>) {
        self.buffered.extend(samples);
        while self.buffered.len() > self.capacity {
            self.buffered.pop_front();
            self.evicted += 1;
        }
    }

    /// Read the next `count` samples and buffer them. Returns how many were read.
    pub fn advance(&mut self, source: &SampleMatrix, count: usize) -> usize {
        let samples = self.take_next(source, count);
        let produced = samples.len();
        self.push(samples);
        produced
    }

    /// Clear the buffer and rewind the pointer.
    pub fn reset(&mut self) {
        self.buffered.clear();
        self.pointer = 0;
        self.evicted = 0;
    }

    /// Change capacity. The window is reset.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.reset();
    }

    /// Current read position in the source.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Maximum number of buffered samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.buffered.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffered.is_empty()
    }

    /// Samples dropped from the front since the last reset.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Wrap policy in use.
    pub fn policy(&self) -> WrapPolicy {
        self.policy
    }

    /// Buffered samples, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.buffered.iter().map(Vec::as_slice)
    }

    /// Buffered values of one channel, oldest first.
    ///
    /// Samples lacking the channel are skipped, so the result can be shorter
    /// than [`SlidingWindow::len`] only for malformed input.
    pub fn channel(&self, channel: usize) -> Vec<f64> {
        self.buffered
            .iter()
            .filter_map(|s| s.get(channel).copied())
            .collect()
    }

    /// Transpose the buffer into one vector per channel.
    pub fn channels(&self) -> Vec<Vec<f64>> {
        let count = self.buffered.front().map_or(0, Vec::len);
        (0..count).map(|ch| self.channel(ch)).collect()
    }
}

/// Window capacity in samples: `round(duration × rate)`, at least 1.
pub fn capacity_for(duration_secs: f64, sampling_rate: u32) -> usize {
    let samples = (duration_secs * sampling_rate as f64).round();
    if samples.is_finite() && samples >= 1.0 {
        samples as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> SampleMatrix {
        let values = (0..len).flat_map(|i| [i as f64, -(i as f64)]).collect();
        SampleMatrix::from_interleaved(values, 2).unwrap()
    }

    fn firsts(window: &SlidingWindow) -> Vec<f64> {
        window.channel(0)
    }

    #[test]
    fn test_keeps_most_recent_capacity_samples() {
        let source = ramp(10);
        let mut window = SlidingWindow::new(4, WrapPolicy::Wrap);
        for _ in 0..3 {
            window.advance(&source, 3);
        }
        assert_eq!(window.len(), 4);
        assert_eq!(firsts(&window), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(window.evicted(), 5);
    }

    #[test]
    fn test_wrap_treats_source_as_cyclic() {
        let source = ramp(5);
        let mut window = SlidingWindow::new(10, WrapPolicy::Wrap);
        assert_eq!(window.advance(&source, 7), 7);
        assert_eq!(firsts(&window), vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 1.0]);
        assert_eq!(window.pointer(), 2);
    }

    #[test]
    fn test_rewind_stops_batch_and_restarts() {
        let source = ramp(5);
        let mut window = SlidingWindow::new(10, WrapPolicy::Rewind);
        assert_eq!(window.advance(&source, 3), 3);
        assert_eq!(window.advance(&source, 3), 2);
        assert_eq!(window.pointer(), 0);
        assert_eq!(window.advance(&source, 3), 3);
        assert_eq!(firsts(&window), vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_halt_produces_nothing_after_end() {
        let source = ramp(4);
        let mut window = SlidingWindow::new(10, WrapPolicy::Halt);
        assert_eq!(window.advance(&source, 3), 3);
        assert_eq!(window.advance(&source, 3), 1);
        assert_eq!(window.advance(&source, 3), 0);
        assert_eq!(window.pointer(), 4);
    }

    #[test]
    fn test_empty_source_changes_nothing() {
        let source = SampleMatrix::empty(2);
        let mut window = SlidingWindow::new(4, WrapPolicy::Wrap);
        assert!(window.take_next(&source, 8).is_empty());
        assert_eq!(window.advance(&source, 8), 0);
        assert_eq!(window.pointer(), 0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_reset_clears_state() {
        let source = ramp(10);
        let mut window = SlidingWindow::new(4, WrapPolicy::Wrap);
        window.advance(&source, 6);
        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.pointer(), 0);
        assert_eq!(window.evicted(), 0);
    }

    #[test]
    fn test_capacity_for_duration() {
        assert_eq!(capacity_for(2.0, 500), 1000);
        assert_eq!(capacity_for(0.5, 3), 2);
        assert_eq!(capacity_for(0.0001, 1), 1);
    }

    #[test]
    fn test_channels_transposes() {
        let source = ramp(3);
        let mut window = SlidingWindow::new(3, WrapPolicy::Wrap);
        window.advance(&source, 3);
        assert_eq!(
            window.channels(),
            vec![vec![0.0, 1.0, 2.0], vec![0.0, -1.0, -2.0]]
        );
    }
}
