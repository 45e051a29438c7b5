//! Speech collaborators
//!
//! This module contains the seams between the stage and the outside world's
//! audio: text-to-speech synthesis, microphone capture and playback. Every
//! failure here degrades the stage to text-only; none of it is fatal.
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::speech::*;
//!
//! let voice = find_voice("Domi").unwrap();
//! let result = DisabledSynthesizer.synthesize("Socks with sandals!", voice, &VoiceSettings::default());
//! assert!(result.is_err());
//! ```

pub mod microphone;
pub mod playback;
pub mod synthesizer;
pub mod voices;

pub use microphone::{Microphone, PrerecordedMicrophone};
pub use playback::{AudioSink, FileSink, HeadlessSink};
pub use synthesizer::{
    validate_speech_text, AudioClip, ClipSource, DisabledSynthesizer, ElevenLabsClient, SpeechSynthesizer,
};
pub use voices::{default_voice, example_voices, find_voice, random_voice, Voice, VoiceSettings, AI_VOICES};
