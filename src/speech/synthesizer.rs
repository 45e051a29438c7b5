//! Text-to-speech collaborators
//!
//! This module contains the synthesizer seam the stage controller talks to,
//! an HTTP client for ElevenLabs-compatible providers and a disabled stand-in
//! for stages running text-only.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::simulation::{StageError, StageResult};
use crate::speech::{Voice, VoiceSettings};
use crate::types::{stage, SpeechConfig};

/// Where a clip came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipSource {
    /// Generated by the text-to-speech provider
    Synthesized,
    /// Captured from the microphone
    Recorded,
}

/// A playable audio resource
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub mime_type: String,
    /// Origin of the clip
    pub source: ClipSource,
}

impl AudioClip {
    /// Wrap encoded audio
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, source: ClipSource) -> Self {
        Self { bytes, mime_type: mime_type.into(), source }
    }

    /// Size of the encoded audio
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the clip holds no audio
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "audio/webm" => "webm",
            _ => "bin",
        }
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("source", &self.source)
            .finish()
    }
}

/// Turns rant text into audio
pub trait SpeechSynthesizer {
    /// Read `text` aloud in `voice`
    fn synthesize(&self, text: &str, voice: &Voice, settings: &VoiceSettings) -> StageResult<AudioClip>;

    /// Whether a credential is available at all
    fn is_configured(&self) -> bool {
        true
    }
}

/// Reject text the provider would refuse
pub fn validate_speech_text(text: &str) -> StageResult<()> {
    let chars = text.chars().count();
    if text.trim().is_empty() {
        return Err(StageError::invalid_input("nothing to say"));
    }
    if chars > stage::MAX_RANT_CHARS {
        return Err(StageError::invalid_input(format!(
            "text is {} characters, the limit is {}",
            chars,
            stage::MAX_RANT_CHARS
        )));
    }
    Ok(())
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// HTTP client for an ElevenLabs-compatible text-to-speech API
pub struct ElevenLabsClient {
    client: Client,
    config: SpeechConfig,
}

impl fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("base_url", &self.config.base_url)
            .field("model_id", &self.config.model_id)
            .field("configured", &self.config.has_valid_api_key())
            .finish()
    }
}

impl ElevenLabsClient {
    /// Build a client from speech settings
    pub fn new(config: SpeechConfig) -> StageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StageError::network_error(format!("failed to build HTTP client: {}", e)))?;

        if !config.has_valid_api_key() {
            warn!("Speech API key missing or a placeholder; voice generation disabled");
        }

        Ok(Self { client, config })
    }

    /// Endpoint for a voice
    pub fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.config.base_url.trim_end_matches('/'), voice_id)
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    #[instrument(skip(self, text, voice, settings), fields(voice = voice.name, chars = text.len()))]
    fn synthesize(&self, text: &str, voice: &Voice, settings: &VoiceSettings) -> StageResult<AudioClip> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if crate::types::is_valid_api_key(key) => key,
            _ => {
                return Err(StageError::configuration_error(
                    "speech API key is not configured",
                ))
            }
        };
        validate_speech_text(text)?;
        settings.validate()?;

        let body = SynthesisRequest { text, model_id: &self.config.model_id, voice_settings: settings };

        debug!("Requesting speech from {}", self.endpoint(voice.id));
        let response = self
            .client
            .post(self.endpoint(voice.id))
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| StageError::network_error(format!("speech request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(StageError::configuration_error("speech API key was rejected"));
        }
        if !status.is_success() {
            let error_body =
                response.text().unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(StageError::network_error(format!(
                "speech provider returned {}: {}",
                status, error_body
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| StageError::network_error(format!("speech response read failed: {}", e)))?;

        info!("Synthesized {} bytes of audio", bytes.len());
        Ok(AudioClip::new(bytes.to_vec(), "audio/mpeg", ClipSource::Synthesized))
    }

    fn is_configured(&self) -> bool {
        self.config.has_valid_api_key()
    }
}

/// Synthesizer for stages without a speech provider
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSynthesizer;

impl SpeechSynthesizer for DisabledSynthesizer {
    fn synthesize(&self, _text: &str, _voice: &Voice, _settings: &VoiceSettings) -> StageResult<AudioClip> {
        Err(StageError::configuration_error("speech synthesis is disabled"))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::default_voice;

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let client = ElevenLabsClient::new(SpeechConfig::default()).unwrap();
        assert!(!client.is_configured());

        let result = client.synthesize("hello", default_voice(), &VoiceSettings::default());
        assert!(matches!(result, Err(StageError::ConfigurationError(_))));
    }

    #[test]
    fn test_placeholder_key_is_not_configured() {
        let config = SpeechConfig {
            api_key: Some("your_api_key_here".to_string()),
            ..Default::default()
        };
        let client = ElevenLabsClient::new(config).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_endpoint_shape() {
        let config = SpeechConfig { base_url: "http://localhost:9/".to_string(), ..Default::default() };
        let client = ElevenLabsClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("pNInz6obpgDQGcFmaJgB"),
            "http://localhost:9/v1/text-to-speech/pNInz6obpgDQGcFmaJgB"
        );
    }

    #[test]
    fn test_text_limits() {
        assert!(validate_speech_text("   ").is_err());
        assert!(validate_speech_text(&"a".repeat(1000)).is_ok());
        assert!(validate_speech_text(&"a".repeat(1001)).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let settings = VoiceSettings::default();
        let body = SynthesisRequest { text: "hi", model_id: "eleven_monolingual_v1", voice_settings: &settings };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model_id"], "eleven_monolingual_v1");
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
    }

    #[test]
    fn test_disabled_synthesizer() {
        let result = DisabledSynthesizer.synthesize("hi", default_voice(), &VoiceSettings::default());
        assert!(result.unwrap_err().degrades_to_text_only());
    }
}
