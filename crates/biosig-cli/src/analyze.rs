//! `biosig analyze`: dominant-frequency track of a WAV clip.

use crate::args::AnalyzeArgs;
use anyhow::{Context, Result};
use biosig::spectral::{SpectralAnalysis, HOP_SIZE, WINDOW_SIZE};
use biosig::wav::{self, DecodedWav};

/// Rows printed in the text summary.
const SUMMARY_ROWS: usize = 10;

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let clip = wav::read_wav(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    log::info!(
        "{}: {} ch, {} Hz, {:.2} s",
        args.file.display(),
        clip.channels,
        clip.sample_rate,
        clip.duration_secs()
    );
    let samples = select_samples(&clip, args)?;
    let analysis = SpectralAnalysis::run(&samples, clip.sample_rate);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{}: {:.2} s at {} Hz ({} channel{})",
        args.file.display(),
        analysis.duration_secs,
        analysis.sample_rate,
        clip.channels,
        if clip.channels == 1 { "" } else { "s" }
    );
    match (analysis.min_frequency, analysis.max_frequency) {
        (Some(min), Some(max)) => {
            println!("  dominant frequency {min:.1} Hz .. {max:.1} Hz");
        }
        _ => {
            println!("  clip shorter than one {WINDOW_SIZE}-sample window, no frequency track");
            return Ok(());
        }
    }
    for (index, freq) in sampled_rows(&analysis.dominant) {
        println!("  {:>8.3} s  {:>9.1} Hz", analysis.window_time(index), freq);
    }
    println!(
        "  {} windows, hop {HOP_SIZE} samples",
        analysis.dominant.len()
    );
    Ok(())
}

/// The analyzed signal: one channel (the first by default) or the mixdown.
fn select_samples(clip: &DecodedWav, args: &AnalyzeArgs) -> Result<Vec<f32>> {
    if args.mix {
        return Ok(clip.mono());
    }
    clip.channel(args.channel).ok_or_else(|| {
        anyhow::anyhow!(
            "channel {} out of range ({} channels)",
            args.channel,
            clip.channels
        )
    })
}

/// Evenly spaced rows of the track, always including the last one.
fn sampled_rows(track: &[f64]) -> Vec<(usize, f64)> {
    if track.is_empty() {
        return Vec::new();
    }
    let step = track.len().div_ceil(SUMMARY_ROWS).max(1);
    let mut rows: Vec<(usize, f64)> = track.iter().copied().enumerate().step_by(step).collect();
    let last = track.len() - 1;
    if rows.last().map(|r| r.0) != Some(last) {
        rows.push((last, track[last]));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_rows_include_last() {
        let track: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let rows = sampled_rows(&track);
        assert_eq!(rows.first(), Some(&(0, 0.0)));
        assert_eq!(rows.last(), Some(&(24, 24.0)));
        assert!(rows.len() <= SUMMARY_ROWS + 1);
    }

    fn stereo_clip() -> DecodedWav {
        DecodedWav {
            channels: 2,
            sample_rate: 8000,
            samples: vec![1.0, 0.0, 0.5, 0.5],
        }
    }

    fn args(channel: usize, mix: bool) -> AnalyzeArgs {
        AnalyzeArgs {
            file: "clip.wav".into(),
            json: false,
            channel,
            mix,
        }
    }

    #[test]
    fn test_first_channel_by_default() {
        let clip = stereo_clip();
        assert_eq!(select_samples(&clip, &args(0, false)).unwrap(), vec![1.0, 0.5]);
        assert_eq!(select_samples(&clip, &args(1, false)).unwrap(), vec![0.0, 0.5]);
        assert_eq!(select_samples(&clip, &args(0, true)).unwrap(), vec![0.5, 0.5]);
        assert!(select_samples(&clip, &args(2, false)).is_err());
    }

    #[test]
    fn test_sampled_rows_short_track() {
        assert!(sampled_rows(&[]).is_empty());
        assert_eq!(sampled_rows(&[5.0]), vec![(0, 5.0)]);
    }
}
