//! WAV encoding and decoding
//!
//! Output is always 16-bit signed PCM with interleaved channels and the
//! canonical 44-byte header. Decoding accepts any integer PCM or 32-bit float
//! file hound can read and returns normalized `f32` samples.

use crate::doppler::DopplerWaveform;
use crate::{BiosigError, Result};
use std::io::{Cursor, Read};
use std::path::Path;

/// Size of the header written by [`encode_interleaved`].
pub const HEADER_LEN: usize = 44;

/// Decoded PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWav {
    /// Channel count
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved samples in `[-1, 1]`
    pub samples: Vec<f32>,
}

impl DecodedWav {
    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }

    /// Samples of one channel, `None` when out of range.
    pub fn channel(&self, index: usize) -> Option<Vec<f32>> {
        let channels = self.channels.max(1) as usize;
        (index < channels).then(|| {
            self.samples
                .iter()
                .skip(index)
                .step_by(channels)
                .copied()
                .collect()
        })
    }

    /// Average of all channels per frame.
    pub fn mono(&self) -> Vec<f32> {
        crate::spectral::downmix(&self.samples, self.channels as usize)
    }
}

/// Quantize a sample: `round(clamp(s, −1, 1) × 32767)`.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Encode interleaved samples as a 16-bit PCM WAV file in memory.
pub fn encode_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Vec<u8>> {
    if channels == 0 {
        return Err(BiosigError::Validation("WAV needs at least one channel".into()));
    }
    if samples.len() % channels as usize != 0 {
        return Err(BiosigError::Validation(format!(
            "{} samples do not fill {channels}-channel frames",
            samples.len()
        )));
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for &sample in samples {
            writer.write_sample(quantize(sample)).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    Ok(cursor.into_inner())
}

/// Encode a stereo Doppler waveform.
pub fn encode_waveform(waveform: &DopplerWaveform) -> Result<Vec<u8>> {
    encode_interleaved(&waveform.interleaved(), 2, waveform.sample_rate)
}

/// Write a stereo Doppler waveform to `path`.
pub fn write_waveform<P: AsRef<Path>>(waveform: &DopplerWaveform, path: P) -> Result<()> {
    let bytes = encode_waveform(waveform)?;
    std::fs::write(path.as_ref(), bytes)?;
    log::debug!("wrote {} frames to {}", waveform.len(), path.as_ref().display());
    Ok(())
}

/// Decode WAV bytes.
pub fn decode(bytes: &[u8]) -> Result<DecodedWav> {
    decode_reader(Cursor::new(bytes))
}

/// Decode a WAV file.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<DecodedWav> {
    let file = std::fs::File::open(path.as_ref())?;
    decode_reader(std::io::BufReader::new(file))
}

fn decode_reader<R: Read>(reader: R) -> Result<DecodedWav> {
    let mut reader = hound::WavReader::new(reader).map_err(decode_error)?;
    let spec = reader.spec();
    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(decode_error)?,
        (hound::SampleFormat::Int, bits @ 1..=32) => {
            let full_scale = ((1_i64 << (bits - 1)) - 1).max(1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v as f32 / full_scale).clamp(-1.0, 1.0)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(decode_error)?
        }
        (format, bits) => {
            return Err(BiosigError::Decode(format!(
                "unsupported WAV sample format {format:?} with {bits} bits"
            )))
        }
    };
    Ok(DecodedWav {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        samples,
    })
}

fn wav_error(e: hound::Error) -> BiosigError {
    match e {
        hound::Error::IoError(io) => BiosigError::Io(io),
        other => BiosigError::Validation(format!("WAV encoding failed: {other}")),
    }
}

fn decode_error(e: hound::Error) -> BiosigError {
    BiosigError::Decode(format!("invalid WAV data: {e}"))
}
