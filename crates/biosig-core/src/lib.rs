//! Streaming signal plots and Doppler siren synthesis
//!
//! Core engine for animated multi-channel signal dashboards (ECG, EEG) and the
//! Doppler siren demo. Recordings are played through a sliding window that is
//! advanced a fixed number of samples per animation frame; renderers turn the
//! window into plain geometry that any front end can draw.
//!
//! # Features
//! - JSON recording ingestion with strict validation
//! - Sliding window with wrap, rewind and halt policies
//! - Linear, polar, recurrence (density) and difference plots
//! - Doppler siren synthesis with stereo panning and 16-bit WAV export
//! - Short-time FFT dominant-frequency tracking
//! - Typed, timeout-bounded client for the prediction services
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV encoding/decoding via hound
//! - `service` (default): service client (tokio timeouts)
//!
//! # Quick start
//! ```no_run
//! use biosig::{ingest, PlaybackState, PlotSession, Scaling, WrapPolicy};
//! use std::sync::Arc;
//!
//! # fn main() -> biosig::Result<()> {
//! let recording = ingest::load_recording("00001_hr.json", Default::default())?;
//! let mut session = PlotSession::new(
//!     Arc::new(recording),
//!     WrapPolicy::Wrap,
//!     PlaybackState::default(),
//! )?;
//! session.play();
//! session.tick();
//! if let Some(plot) = session.linear(Scaling::Auto).drawn() {
//!     println!("{} traces from {:.2}s", plot.traces.len(), plot.start_time);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod clip;
pub mod config;
pub mod difference;
pub mod doppler;
pub mod error;
pub mod ingest;
pub mod normalize;
pub mod recording;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod spectral;
pub mod synthetic;
pub mod window;

#[cfg(feature = "export-wav")]
pub mod wav;

#[cfg(feature = "service")]
pub mod service;

pub use clip::AudioSlot;
pub use config::DashboardConfig;
pub use doppler::{synthesize, DopplerParams, DopplerRender};
pub use error::{BiosigError, Result};
pub use normalize::{normalize, Scaling};
pub use recording::{ChannelSet, Recording, SampleMatrix};
pub use render::{RenderOutcome, RenderSkip};
pub use scheduler::{samples_per_frame, FrameClock, PlaybackState};
pub use session::{PlotSession, TickStatus};
pub use window::{SlidingWindow, WrapPolicy};
