//! Doppler synthesis through WAV encoding

use approx::assert_relative_eq;
use biosig::doppler::{observed_frequency, source_frequency, synthesize, DopplerParams};
use biosig::wav;
use biosig::AudioSlot;

#[test]
fn test_reference_pass() {
    let params = DopplerParams::new(650.0, 20.0, 10.0).unwrap();
    let render = synthesize(&params).unwrap();

    assert_eq!(render.waveform.len(), 441_000);
    assert_eq!(render.waveform.sample_rate, 44_100);
    assert_relative_eq!(render.waveform.combined_peak(), 1.0, epsilon = 1e-5);

    let t0 = params.closest_approach();
    assert_relative_eq!(
        observed_frequency(&params, t0),
        source_frequency(650.0, t0),
        epsilon = 1e-9
    );

    // stride 441 → 1000 points
    assert_eq!(render.trace.len(), 1000);
    assert_relative_eq!(render.trace.time[1], 441.0 / 44_100.0);

    let stats = render.stats;
    assert!(stats.max_observed > 1000.0);
    assert!(stats.min_observed < 650.0);
    assert_relative_eq!(stats.shift_ratio, stats.max_observed / stats.min_observed);
}

#[test]
fn test_source_moves_left_to_right() {
    let params = DopplerParams::new(650.0, 20.0, 4.0).unwrap();
    let render = synthesize(&params).unwrap();
    let w = &render.waveform;
    let energy = |range: std::ops::Range<usize>, ch: &[f32]| -> f32 {
        ch[range].iter().map(|s| s * s).sum()
    };
    let early = 0..w.len() / 4;
    let late = 3 * w.len() / 4..w.len();
    assert!(energy(early.clone(), &w.left) > energy(early, &w.right));
    assert!(energy(late.clone(), &w.right) > energy(late, &w.left));
}

#[test]
fn test_wav_round_trip_through_slot() {
    let params = DopplerParams::new(440.0, 30.0, 0.25).unwrap();
    let render = synthesize(&params).unwrap();

    let bytes = wav::encode_waveform(&render.waveform).unwrap();
    assert_eq!(bytes.len(), wav::HEADER_LEN + render.waveform.len() * 4);

    let dir = tempfile::tempdir().unwrap();
    let mut slot = AudioSlot::in_dir(dir.path());
    let path = slot.store_waveform(&render.waveform).unwrap().to_path_buf();
    let decoded = wav::read_wav(&path).unwrap();
    assert_eq!(decoded.channels, 2);
    assert_eq!(decoded.sample_rate, 44_100);
    assert_eq!(decoded.frames(), render.waveform.len());

    for (i, frame) in decoded.samples.chunks_exact(2).enumerate().step_by(97) {
        assert_eq!(wav::quantize(frame[0]), wav::quantize(render.waveform.left[i]));
        assert_eq!(wav::quantize(frame[1]), wav::quantize(render.waveform.right[i]));
    }

    drop(slot);
    assert!(!path.exists());
}
