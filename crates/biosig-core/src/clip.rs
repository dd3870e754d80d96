//! Single-clip audio slot
//!
//! Holds at most one synthesized clip as a temporary file. Storing a new clip
//! deletes the previous one first, and dropping the slot deletes the current
//! one, so a long session never accumulates stale audio files.

use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Owner of the current clip file.
#[derive(Debug, Default)]
pub struct AudioSlot {
    current: Option<NamedTempFile>,
    dir: Option<PathBuf>,
}

impl AudioSlot {
    /// Slot writing into the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot writing into `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            current: None,
            dir: Some(dir.into()),
        }
    }

    /// Replace the current clip with `bytes` and return the new file's path.
    pub fn store(&mut self, bytes: &[u8]) -> Result<&Path> {
        self.release();

        let mut builder = tempfile::Builder::new();
        builder.prefix("biosig-clip-").suffix(".wav");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        log::debug!("stored clip ({} bytes) at {}", bytes.len(), file.path().display());

        Ok(self.current.insert(file).path())
    }

    /// Encode a Doppler waveform and store it.
    #[cfg(feature = "export-wav")]
    pub fn store_waveform(&mut self, waveform: &crate::doppler::DopplerWaveform) -> Result<&Path> {
        let bytes = crate::wav::encode_waveform(waveform)?;
        self.store(&bytes)
    }

    /// Path of the current clip.
    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(NamedTempFile::path)
    }

    /// Delete the current clip. Returns whether there was one.
    pub fn release(&mut self) -> bool {
        match self.current.take() {
            Some(file) => {
                let path = file.path().to_path_buf();
                if let Err(e) = file.close() {
                    log::warn!("failed to remove clip {}: {e}", path.display());
                } else {
                    log::debug!("released clip {}", path.display());
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_previous_clip() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = AudioSlot::in_dir(dir.path());

        let first = slot.store(b"first").unwrap().to_path_buf();
        assert_eq!(std::fs::read(&first).unwrap(), b"first");

        let second = slot.store(b"second").unwrap().to_path_buf();
        assert!(!first.exists());
        assert!(second.exists());
        assert_eq!(slot.path(), Some(second.as_path()));
    }

    #[test]
    fn test_release_and_drop_delete_clip() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = AudioSlot::in_dir(dir.path());
        let path = slot.store(b"clip").unwrap().to_path_buf();
        assert!(slot.release());
        assert!(!path.exists());
        assert!(!slot.release());

        let path = slot.store(b"clip").unwrap().to_path_buf();
        drop(slot);
        assert!(!path.exists());
    }

    #[cfg(feature = "export-wav")]
    #[test]
    fn test_store_waveform_writes_wav() {
        let waveform = crate::doppler::DopplerWaveform {
            left: vec![0.0, 0.5],
            right: vec![0.0, -0.5],
            sample_rate: 44100,
        };
        let mut slot = AudioSlot::new();
        let path = slot.store_waveform(&waveform).unwrap().to_path_buf();
        let decoded = crate::wav::read_wav(&path).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.frames(), 2);
    }
}
