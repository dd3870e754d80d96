//! Dashboard configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "playback": { "window_seconds": 4.0 },
//!   "polar": { "scaling": { "range": { "min": -1.5, "max": 1.5 } } } }
//! ```

use crate::doppler::DEFAULT_PLOT_POINTS;
use crate::render::polar::PolarScaling;
use crate::render::recurrence::{DEFAULT_BINS, DEFAULT_REALTIME_SAMPLE_CAP, DEFAULT_SAMPLE_CAP};
use crate::scheduler::PlaybackState;
use crate::{BiosigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Playback defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Visible window in seconds
    pub window_seconds: f64,
    /// Speed multiplier
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            window_seconds: 2.0,
            speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Paused playback state with these settings.
    pub fn state(&self) -> Result<PlaybackState> {
        PlaybackState::new(self.speed, self.window_seconds)
    }
}

/// Polar plot settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarConfig {
    /// Value normalization
    pub scaling: PolarScaling,
    /// Radius scale
    pub base_radius: f64,
}

impl Default for PolarConfig {
    fn default() -> Self {
        Self {
            scaling: PolarScaling::Auto,
            base_radius: 1.0,
        }
    }
}

/// Recurrence plot settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Pairs binned for a static recording
    pub sample_cap: usize,
    /// Pairs binned for the live window
    pub realtime_sample_cap: usize,
    /// Grid resolution per axis
    pub bins: usize,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            realtime_sample_cap: DEFAULT_REALTIME_SAMPLE_CAP,
            bins: DEFAULT_BINS,
        }
    }
}

/// Difference trace settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferenceConfig {
    /// Absolute difference at or below which the trace shows a gap
    pub threshold: f64,
}

impl Default for DifferenceConfig {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

/// Doppler synthesis settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DopplerConfig {
    /// Target points in the plot trace
    pub plot_points: usize,
}

impl Default for DopplerConfig {
    fn default() -> Self {
        Self {
            plot_points: DEFAULT_PLOT_POINTS,
        }
    }
}

/// Remote service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root, e.g. `http://127.0.0.1:8000/api`
    pub base_url: String,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ServiceConfig {
    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Playback defaults
    pub playback: PlaybackConfig,
    /// Polar plot settings
    pub polar: PolarConfig,
    /// Recurrence plot settings
    pub recurrence: RecurrenceConfig,
    /// Difference trace settings
    pub difference: DifferenceConfig,
    /// Doppler synthesis settings
    pub doppler: DopplerConfig,
    /// Remote service settings
    pub service: ServiceConfig,
}

impl DashboardConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| BiosigError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Set the visible window.
    pub fn window_seconds(mut self, secs: f64) -> Self {
        self.playback.window_seconds = secs;
        self
    }

    /// Set the playback speed.
    pub fn speed(mut self, speed: f64) -> Self {
        self.playback.speed = speed;
        self
    }

    /// Set the polar scaling.
    pub fn polar_scaling(mut self, scaling: PolarScaling) -> Self {
        self.polar.scaling = scaling;
        self
    }

    /// Set the service root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.service.base_url = url.into();
        self
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<()> {
        let p = &self.playback;
        if !(p.window_seconds.is_finite() && p.window_seconds > 0.0) {
            return Err(config_error("playback.window_seconds must be positive"));
        }
        if !(p.speed.is_finite() && p.speed > 0.0) {
            return Err(config_error("playback.speed must be positive"));
        }
        if !(self.polar.base_radius.is_finite() && self.polar.base_radius > 0.0) {
            return Err(config_error("polar.base_radius must be positive"));
        }
        if let PolarScaling::Range { min, max } = self.polar.scaling {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(config_error("polar.scaling range needs min < max"));
            }
        }
        let r = &self.recurrence;
        if r.sample_cap == 0 || r.realtime_sample_cap == 0 {
            return Err(config_error("recurrence sample caps must be at least 1"));
        }
        if r.bins < 2 {
            return Err(config_error("recurrence.bins must be at least 2"));
        }
        let t = self.difference.threshold;
        if !(t.is_finite() && t >= 0.0) {
            return Err(config_error("difference.threshold must be non-negative"));
        }
        if self.doppler.plot_points == 0 {
            return Err(config_error("doppler.plot_points must be at least 1"));
        }
        if self.service.base_url.trim().is_empty() {
            return Err(config_error("service.base_url is empty"));
        }
        if self.service.timeout_ms == 0 {
            return Err(config_error("service.timeout_ms must be at least 1"));
        }
        Ok(())
    }
}

fn config_error(msg: &str) -> BiosigError {
    BiosigError::Config(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.playback.window_seconds, 2.0);
        assert_eq!(config.recurrence.sample_cap, 500);
        assert_eq!(config.recurrence.realtime_sample_cap, 5000);
        assert_eq!(config.recurrence.bins, 100);
        assert_eq!(config.doppler.plot_points, 1000);
        assert_eq!(config.difference.threshold, 0.1);
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"playback":{{"window_seconds":4.0}},"polar":{{"scaling":{{"range":{{"min":-1.5,"max":1.5}}}}}}}}"#
        )
        .unwrap();
        let config = DashboardConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.playback.window_seconds, 4.0);
        assert_eq!(config.playback.speed, 1.0);
        assert_eq!(config.polar.scaling, PolarScaling::Range { min: -1.5, max: 1.5 });
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let bad = DashboardConfig::default().speed(0.0);
        assert!(matches!(bad.validate(), Err(BiosigError::Config(_))));
        let bad = DashboardConfig::default().polar_scaling(PolarScaling::Range { min: 1.0, max: 1.0 });
        assert!(bad.validate().is_err());
        let bad = DashboardConfig::default().base_url(" ");
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = DashboardConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, BiosigError::Config(_)));
    }
}
