//! Voice catalog and synthesis settings

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::simulation::{StageError, StageResult};

/// A voice offered by the text-to-speech provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    /// Provider voice identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description of the delivery
    pub description: &'static str,
}

/// The fixed catalog of voices a rant can be read in
pub static AI_VOICES: [Voice; 6] = [
    Voice { id: "pNInz6obpgDQGcFmaJgB", name: "Adam", description: "Confident and clear" },
    Voice { id: "EXAVITQu4vr4xnSDxMaL", name: "Bella", description: "Warm and engaging" },
    Voice { id: "VR6AewLTigWG4xSOukaG", name: "Josh", description: "Energetic and youthful" },
    Voice { id: "AZnzlk1XvdvUeBnXmlld", name: "Domi", description: "Dramatic and expressive" },
    Voice { id: "CYw3kZ02Hs0563khs1Fj", name: "Dave", description: "Casual and friendly" },
    Voice { id: "N2lVS1w4EtoT3dr4eOWO", name: "Callum", description: "Authoritative and serious" },
];

/// Voices the example rant is read in
pub fn example_voices() -> &'static [Voice] {
    &AI_VOICES[..4]
}

/// Look a voice up by provider id or by name
pub fn find_voice(key: &str) -> Option<&'static Voice> {
    AI_VOICES.iter().find(|v| v.id == key || v.name.eq_ignore_ascii_case(key))
}

/// The first catalog voice
pub fn default_voice() -> &'static Voice {
    &AI_VOICES[0]
}

/// Any catalog voice, picked uniformly
pub fn random_voice<R: Rng + ?Sized>(rng: &mut R) -> &'static Voice {
    AI_VOICES.choose(rng).unwrap_or_else(default_voice)
}

/// Provider voice tuning, every knob in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Consistency of delivery
    pub stability: f64,
    /// Closeness to the original voice
    pub similarity_boost: f64,
    /// Style exaggeration
    pub style: f64,
    /// Provider speaker boost toggle
    pub use_speaker_boost: bool,
}

impl VoiceSettings {
    /// Randomized settings for a user rant
    pub fn random_for_user<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random_in(rng, 0.5..=0.8, 0.7..=0.9, 0.2..=0.5)
    }

    /// Randomized settings for the example rant
    pub fn random_for_example<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random_in(rng, 0.6..=0.8, 0.8..=0.9, 0.3..=0.5)
    }

    fn random_in<R: Rng + ?Sized>(
        rng: &mut R,
        stability: RangeInclusive<f64>,
        similarity: RangeInclusive<f64>,
        style: RangeInclusive<f64>,
    ) -> Self {
        Self {
            stability: rng.gen_range(stability),
            similarity_boost: rng.gen_range(similarity),
            style: rng.gen_range(style),
            use_speaker_boost: true,
        }
    }

    /// Check every knob lies in [0, 1]
    pub fn validate(&self) -> StageResult<()> {
        for (name, value) in [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StageError::invalid_input(format!(
                    "voice setting {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self { stability: 0.65, similarity_boost: 0.8, style: 0.35, use_speaker_boost: true }
    }
}
