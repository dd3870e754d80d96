//! Per-plot playback session
//!
//! A [`PlotSession`] owns everything one animated plot needs: the shared
//! recording, its sliding window, the playback controls and the channel
//! selection. The host calls [`PlotSession::tick`] once per frame and then asks
//! for the geometry it wants to draw.

use crate::difference::threshold_difference;
use crate::normalize::Scaling;
use crate::recording::Recording;
use crate::render::{
    render_linear, render_polar, LinearInput, LinearPlot, PolarInput, PolarPlot, PolarScaling,
    RecurrenceHistogram, RenderOutcome, RenderSkip,
};
use crate::scheduler::{samples_per_frame, PlaybackState};
use crate::window::{capacity_for, SlidingWindow, WrapPolicy};
use crate::{BiosigError, Result};
use log::debug;
use std::sync::Arc;

/// Result of one frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Samples were consumed; keep scheduling frames
    Continue,
    /// Paused or out of samples
    Stopped,
}

/// Owned state of one animated plot.
#[derive(Debug, Clone)]
pub struct PlotSession {
    recording: Arc<Recording>,
    window: SlidingWindow,
    playback: PlaybackState,
    selection: Vec<usize>,
}

impl PlotSession {
    /// Create a paused session showing every channel.
    pub fn new(recording: Arc<Recording>, policy: WrapPolicy, playback: PlaybackState) -> Result<Self> {
        playback.validate()?;
        let window = SlidingWindow::for_duration(
            playback.window_seconds,
            recording.sampling_rate,
            policy,
        );
        let selection = (0..recording.channel_count()).collect();
        Ok(Self {
            recording,
            window,
            playback: PlaybackState {
                is_playing: false,
                ..playback
            },
            selection,
        })
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Advance one frame.
    pub fn tick(&mut self) -> TickStatus {
        if !self.playback.is_playing {
            return TickStatus::Stopped;
        }
        let step = samples_per_frame(self.recording.sampling_rate as f64, self.playback.speed);
        if self.window.advance(&self.recording.samples, step) == 0 {
            debug!("session '{}' exhausted", self.recording.id);
            self.playback.is_playing = false;
            return TickStatus::Stopped;
        }
        TickStatus::Continue
    }

    /// Start advancing on the next tick.
    pub fn play(&mut self) {
        self.playback.is_playing = true;
    }

    /// Stop advancing; the window keeps its contents.
    pub fn pause(&mut self) {
        self.playback.is_playing = false;
    }

    /// Toggle play/pause, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.playback.is_playing = !self.playback.is_playing;
        self.playback.is_playing
    }

    /// Change the speed multiplier. Takes effect on the next tick.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        let next = PlaybackState {
            speed,
            ..self.playback
        };
        next.validate()?;
        self.playback = next;
        Ok(())
    }

    /// Change the visible window. The window is reset.
    pub fn set_window_seconds(&mut self, window_seconds: f64) -> Result<()> {
        let next = PlaybackState {
            window_seconds,
            ..self.playback
        };
        next.validate()?;
        self.playback = next;
        self.window
            .resize(capacity_for(window_seconds, self.recording.sampling_rate));
        debug!(
            "session '{}' window set to {window_seconds}s ({} samples)",
            self.recording.id,
            self.window.capacity()
        );
        Ok(())
    }

    /// Replace the recording. The window is reset and every channel selected.
    pub fn set_recording(&mut self, recording: Arc<Recording>) {
        self.selection = (0..recording.channel_count()).collect();
        self.window
            .resize(capacity_for(self.playback.window_seconds, recording.sampling_rate));
        debug!("session switched to '{}'", recording.id);
        self.recording = recording;
    }

    /// Select channels by index. The window is reset.
    pub fn set_channels(&mut self, channels: Vec<usize>) -> Result<()> {
        let count = self.recording.channel_count();
        if let Some(bad) = channels.iter().find(|&&ch| ch >= count) {
            return Err(BiosigError::Validation(format!(
                "channel {bad} out of range ({count} channels)"
            )));
        }
        self.selection = channels;
        self.window.reset();
        debug!("session '{}' channels {:?}", self.recording.id, self.selection);
        Ok(())
    }

    /// Select channels by name. The window is reset.
    pub fn select_by_name(&mut self, names: &[&str]) -> Result<()> {
        let indices = names
            .iter()
            .map(|name| {
                self.recording.channels.index_of(name).ok_or_else(|| {
                    BiosigError::Validation(format!("unknown channel '{name}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_channels(indices)
    }

    /// Rewind to the start of the recording.
    pub fn reset(&mut self) {
        self.window.reset();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Recording being played.
    pub fn recording(&self) -> &Arc<Recording> {
        &self.recording
    }

    /// Playback controls.
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Sliding window state.
    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Selected channel indices.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Names of the selected channels.
    pub fn selected_names(&self) -> Vec<String> {
        self.selection
            .iter()
            .map(|&ch| {
                self.recording
                    .channels
                    .name(ch)
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("Channel {}", ch + 1))
            })
            .collect()
    }

    /// Buffered values of the selected channels.
    pub fn selected_values(&self) -> Vec<Vec<f64>> {
        self.selection.iter().map(|&ch| self.window.channel(ch)).collect()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Time-domain traces of the selected channels.
    pub fn linear(&self, scaling: Scaling) -> RenderOutcome<LinearPlot> {
        let channels = self.selected_values();
        let names = self.selected_names();
        render_linear(&self.linear_input(&channels, &names, scaling))
    }

    /// Polar sweep of the selected channels.
    pub fn polar(&self, scaling: PolarScaling, base_radius: f64) -> RenderOutcome<PolarPlot> {
        let channels = self.selected_values();
        let names = self.selected_names();
        render_polar(&PolarInput {
            channels: &channels,
            sampling_rate: self.recording.sampling_rate,
            window_seconds: self.playback.window_seconds,
            base_radius,
            scaling,
            names: &names,
        })
    }

    /// Density histogram of the first two selected channels.
    pub fn recurrence(&self, sample_cap: usize, bins: usize) -> RenderOutcome<RecurrenceHistogram> {
        match self.pair() {
            Some((a, b)) => RecurrenceHistogram::build(&a, &b, sample_cap, bins),
            None => RenderOutcome::Skipped(RenderSkip::Empty),
        }
    }

    /// Difference trace of the first two selected channels.
    pub fn difference(&self, threshold: f64, scaling: Scaling) -> RenderOutcome<LinearPlot> {
        let Some((a, b)) = self.pair() else {
            return RenderOutcome::Skipped(RenderSkip::Empty);
        };
        let names = self.selected_names();
        let label = format!("{} ⊕ {}", names[0], names[1]);
        let channels = vec![threshold_difference(&a, &b, threshold)];
        let names = vec![label];
        render_linear(&self.linear_input(&channels, &names, scaling))
    }

    fn pair(&self) -> Option<(Vec<f64>, Vec<f64>)> {
        match self.selection.as_slice() {
            [a, b, ..] => Some((self.window.channel(*a), self.window.channel(*b))),
            _ => None,
        }
    }

    fn linear_input<'a>(
        &self,
        channels: &'a [Vec<f64>],
        names: &'a [String],
        scaling: Scaling,
    ) -> LinearInput<'a> {
        LinearInput {
            channels,
            pointer: self.window.pointer(),
            source_len: self.recording.samples.len(),
            sampling_rate: self.recording.sampling_rate,
            window_seconds: self.playback.window_seconds,
            names,
            scaling,
        }
    }
}
