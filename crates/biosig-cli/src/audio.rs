//! Audio output using rodio

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Play a WAV clip on the default device and wait for it to finish.
pub fn play_file(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("decoding {}", path.display()))?;

    // The stream must outlive the sink.
    let (_stream, handle) =
        OutputStream::try_default().context("no audio output device available")?;
    let sink = Sink::try_new(&handle).context("failed to open audio sink")?;
    sink.append(source);
    log::debug!("playing {}", path.display());
    sink.sleep_until_end();
    Ok(())
}
