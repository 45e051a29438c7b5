//! Archived rants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::ReactionStats;
use crate::types::{RantId, UserId};

/// A finished rant kept in the Hall of Howls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rant {
    /// Unique identifier for the rant
    pub id: RantId,
    /// Who ranted
    pub user_id: UserId,
    /// Nickname at the time of the rant
    pub nickname: String,
    /// Typed rant
    #[serde(default)]
    pub text: Option<String>,
    /// Location of the recorded or synthesized audio
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Transcript of the audio
    #[serde(default)]
    pub transcript: Option<String>,
    /// Reaction totals
    pub reactions: ReactionStats,
    /// Length in seconds
    pub duration: u32,
    /// Whether the speaker made it to the end
    pub survived: bool,
    /// When the rant happened
    pub created_at: DateTime<Utc>,
}

impl Rant {
    /// Case-insensitive match against nickname, text and transcript
    ///
    /// `needle` must already be lowercase. An empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(needle);

        contains(&self.nickname)
            || self.text.as_deref().is_some_and(contains)
            || self.transcript.as_deref().is_some_and(contains)
    }

    /// Text shown in listings: the typed rant, else the transcript
    pub fn preview(&self, max_chars: usize) -> String {
        let body = self.text.as_deref().or(self.transcript.as_deref()).unwrap_or("");
        if body.chars().count() <= max_chars {
            return body.to_string();
        }
        let cut: String = body.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
