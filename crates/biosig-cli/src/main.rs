//! Terminal front end for the biosig signal engine
//!
//! - `view`: animated linear, polar, recurrence and difference plots
//! - `doppler`: siren pass synthesis with WAV export and optional playback
//! - `analyze`: dominant-frequency tracking of a WAV clip

mod analyze;
mod args;
#[cfg(feature = "playback")]
mod audio;
mod doppler;
mod tui;

use anyhow::{bail, Context, Result};
use args::{CliArgs, Command, ViewArgs};
use biosig::ingest::{load_recording, IngestOptions, MatrixLayout};
use biosig::synthetic::SyntheticEcg;
use biosig::{DashboardConfig, Recording};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse_args();
    match args.command {
        Command::View(view) => run_view(&view),
        Command::Doppler(doppler) => doppler::run(&doppler),
        Command::Analyze(analyze) => analyze::run(&analyze),
    }
}

/// Merge the config file with command-line overrides.
fn view_config(args: &ViewArgs) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(window) = args.window {
        config = config.window_seconds(window);
    }
    if let Some(speed) = args.speed {
        config = config.speed(speed);
    }
    config.validate()?;
    Ok(config)
}

fn load_view_recording(args: &ViewArgs) -> Result<Recording> {
    if args.demo {
        return Ok(SyntheticEcg::new().generate()?);
    }
    let Some(path) = &args.file else {
        bail!("no recording given (pass a JSON file or --demo)");
    };
    let layout = if args.channel_major {
        MatrixLayout::ChannelMajor
    } else {
        MatrixLayout::SampleMajor
    };
    load_recording(path, IngestOptions::default().layout(layout))
        .with_context(|| format!("loading {}", path.display()))
}

fn run_view(args: &ViewArgs) -> Result<()> {
    let config = view_config(args)?;
    let recording = load_view_recording(args)?;
    log::info!(
        "recording '{}': {} channels, {} samples at {} Hz",
        recording.id,
        recording.channel_count(),
        recording.samples.len(),
        recording.sampling_rate
    );

    let app = tui::App::new(Arc::new(recording), config, &args.channels)?;
    if !tui::terminal_supports_tui() {
        bail!(
            "terminal too small for the dashboard (need {}x{})",
            tui::MIN_COLS,
            tui::MIN_ROWS
        );
    }
    tui::run_tui_loop(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn view_args(argv: &[&str]) -> ViewArgs {
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::View(view) => view,
            _ => panic!("expected view"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = view_config(&view_args(&["biosig", "view", "--demo", "-w", "5", "-s", "2"])).unwrap();
        assert_eq!(config.playback.window_seconds, 5.0);
        assert_eq!(config.playback.speed, 2.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(view_config(&view_args(&["biosig", "view", "--demo", "-w", "0"])).is_err());
    }

    #[test]
    fn test_view_needs_a_source() {
        assert!(load_view_recording(&view_args(&["biosig", "view"])).is_err());
        let demo = load_view_recording(&view_args(&["biosig", "view", "--demo"])).unwrap();
        assert_eq!(demo.channel_count(), 6);
    }
}
