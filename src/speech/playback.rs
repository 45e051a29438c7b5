//! Audio playback collaborators

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::simulation::StageResult;
use crate::speech::AudioClip;

/// Plays clips for the presentation layer
pub trait AudioSink {
    /// Start playing a clip, replacing whatever is playing
    fn play(&mut self, label: &str, clip: &AudioClip) -> StageResult<()>;

    /// Stop playback; no-op when silent
    fn stop(&mut self);

    /// Whether a clip is playing
    fn is_playing(&self) -> bool;
}

/// Sink that only tracks playback state
#[derive(Debug, Clone, Default)]
pub struct HeadlessSink {
    now_playing: Option<String>,
    plays: usize,
}

impl HeadlessSink {
    /// Create a silent sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the clip playing
    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    /// Clips started so far
    pub fn plays(&self) -> usize {
        self.plays
    }
}

impl AudioSink for HeadlessSink {
    fn play(&mut self, label: &str, clip: &AudioClip) -> StageResult<()> {
        debug!("Playing {} ({} bytes)", label, clip.len());
        self.now_playing = Some(label.to_string());
        self.plays += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.now_playing = None;
    }

    fn is_playing(&self) -> bool {
        self.now_playing.is_some()
    }
}

/// Sink that writes every played clip into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
    written: Vec<PathBuf>,
    playing: bool,
}

impl FileSink {
    /// Write clips into `directory`, creating it on first play
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), written: Vec::new(), playing: false }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl AudioSink for FileSink {
    fn play(&mut self, label: &str, clip: &AudioClip) -> StageResult<()> {
        fs::create_dir_all(&self.directory)?;
        let name = format!("{:03}-{}.{}", self.written.len() + 1, label, clip.extension());
        let path = self.directory.join(name);
        fs::write(&path, &clip.bytes)?;

        info!("Wrote {} to {}", label, path.display());
        self.written.push(path);
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::ClipSource;
    use tempfile::tempdir;

    fn clip() -> AudioClip {
        AudioClip::new(vec![1, 2, 3], "audio/mpeg", ClipSource::Synthesized)
    }

    #[test]
    fn test_headless_sink_tracks_playback() {
        let mut sink = HeadlessSink::new();
        sink.play("rant", &clip()).unwrap();
        assert_eq!(sink.now_playing(), Some("rant"));
        sink.stop();
        assert!(!sink.is_playing());
        assert_eq!(sink.plays(), 1);
    }

    #[test]
    fn test_file_sink_writes_numbered_clips() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("audio"));

        sink.play("example", &clip()).unwrap();
        sink.play("rant", &clip()).unwrap();

        let names: Vec<String> = sink
            .written()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["001-example.mp3", "002-rant.mp3"]);
        assert_eq!(fs::read(&sink.written()[1]).unwrap(), vec![1, 2, 3]);
    }
}
