//! `biosig doppler`: synthesize, export and optionally play a siren pass.

use crate::args::DopplerArgs;
use anyhow::{Context, Result};
use biosig::doppler::{synthesize_with, DopplerParams, DopplerRender};
use biosig::{wav, AudioSlot, DashboardConfig};
use std::path::Path;

pub fn run(args: &DopplerArgs) -> Result<()> {
    if args.play && !cfg!(feature = "playback") {
        anyhow::bail!("audio playback is not compiled in (rebuild with --features playback)");
    }
    let config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    let params = DopplerParams::new(args.frequency, args.velocity, args.duration)?;
    let render = synthesize_with(&params, config.doppler.plot_points)?;
    log::info!(
        "synthesized {} samples at {} Hz",
        render.waveform.len(),
        render.waveform.sample_rate
    );

    if let Some(path) = &args.output {
        wav::write_waveform(&render.waveform, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    print_summary(&params, &render, args);

    if args.play {
        let mut slot = AudioSlot::new();
        play(stage_clip(&mut slot, &render)?)?;
        slot.release();
    }
    Ok(())
}

/// Encode the pass into the slot, replacing any clip it held.
fn stage_clip<'a>(slot: &'a mut AudioSlot, render: &DopplerRender) -> Result<&'a Path> {
    let clip = slot.store_waveform(&render.waveform)?;
    log::debug!("clip staged at {}", clip.display());
    Ok(clip)
}

fn print_summary(params: &DopplerParams, render: &DopplerRender, args: &DopplerArgs) {
    let stats = render.stats;
    if args.json {
        let summary = serde_json::json!({
            "frequency": params.frequency_hz,
            "velocity": params.velocity_mps,
            "duration": params.duration_secs,
            "samples": render.waveform.len(),
            "sample_rate": render.waveform.sample_rate,
            "output": args.output.as_ref().map(|p| p.display().to_string()),
            "stats": stats,
        });
        println!("{summary:#}");
        return;
    }
    println!(
        "Doppler pass: {:.1} Hz siren at {:.1} m/s for {:.1} s",
        params.frequency_hz, params.velocity_mps, params.duration_secs
    );
    println!(
        "  observed {:.1} Hz .. {:.1} Hz (shift ratio {:.4})",
        stats.min_observed, stats.max_observed, stats.shift_ratio
    );
    println!(
        "  {} samples, {} plot points",
        render.waveform.len(),
        render.trace.len()
    );
    if let Some(path) = &args.output {
        println!("  written to {}", path.display());
    }
}

#[cfg(feature = "playback")]
fn play(clip: &Path) -> Result<()> {
    crate::audio::play_file(clip)
}

#[cfg(not(feature = "playback"))]
fn play(_clip: &Path) -> Result<()> {
    anyhow::bail!("audio playback is not compiled in (rebuild with --features playback)")
}
