//! Microphone capture collaborators

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::simulation::{StageError, StageResult};
use crate::speech::{AudioClip, ClipSource};

/// Captures a voice rant
pub trait Microphone {
    /// Acquire the microphone and start capturing
    fn start(&mut self) -> StageResult<()>;

    /// Stop capturing and hand back the recording
    fn stop(&mut self) -> StageResult<AudioClip>;

    /// Whether a capture is running
    fn is_recording(&self) -> bool;

    /// Drop any running capture without producing a clip
    fn release(&mut self);
}

/// Microphone that plays back a pre-recorded file
///
/// Without a file it behaves like a device the user refused access to.
#[derive(Debug, Clone, Default)]
pub struct PrerecordedMicrophone {
    source: Option<PathBuf>,
    recording: bool,
}

impl PrerecordedMicrophone {
    /// Use the audio file at `path` as the captured recording
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self { source: Some(path.as_ref().to_path_buf()), recording: false }
    }

    /// A microphone the user denied access to
    pub fn denied() -> Self {
        Self::default()
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "audio/webm",
    }
}

impl Microphone for PrerecordedMicrophone {
    fn start(&mut self) -> StageResult<()> {
        let Some(path) = &self.source else {
            return Err(StageError::permission_error("microphone access denied"));
        };
        if !path.exists() {
            return Err(StageError::permission_error(format!(
                "recording source {} is unavailable",
                path.display()
            )));
        }

        self.recording = true;
        debug!("Recording from {}", path.display());
        Ok(())
    }

    fn stop(&mut self) -> StageResult<AudioClip> {
        let path = match (&self.source, self.recording) {
            (Some(path), true) => path,
            _ => return Err(StageError::invalid_input("microphone is not recording")),
        };

        self.recording = false;
        let bytes = fs::read(path)?;
        info!("Captured {} bytes of audio", bytes.len());
        Ok(AudioClip::new(bytes, mime_for(path), ClipSource::Recorded))
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn release(&mut self) {
        if self.recording {
            debug!("Microphone released mid-capture");
        }
        self.recording = false;
    }
}
