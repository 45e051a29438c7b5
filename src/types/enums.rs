//! Enumeration types for the stage engine
//!
//! This module contains the reaction emoji set, authentication methods, the
//! stage lifecycle phases and the Hall of Howls sort orders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of audience reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emoji {
    /// Thrown tomato - boo!
    Tomato,
    /// Confused audience member asking for an explanation
    Explain,
    /// Agreement
    PlusOne,
    /// Second-hand embarrassment; drives the cringe meter
    Cringe,
}

impl Emoji {
    /// All reactions in display order
    pub const ALL: [Emoji; 4] = [Emoji::Tomato, Emoji::Explain, Emoji::PlusOne, Emoji::Cringe];

    /// The emoji glyph shown in the reaction stream
    pub fn symbol(&self) -> &'static str {
        match self {
            Emoji::Tomato => "🥫",
            Emoji::Explain => "❓",
            Emoji::PlusOne => "👍",
            Emoji::Cringe => "😬",
        }
    }

    /// Short audience-facing description of the reaction
    pub fn description(&self) -> &'static str {
        match self {
            Emoji::Tomato => "Boo!",
            Emoji::Explain => "What?",
            Emoji::PlusOne => "Agree!",
            Emoji::Cringe => "Yikes!",
        }
    }

    /// Whether this reaction counts toward the cringe meter
    pub fn is_cringe(&self) -> bool {
        matches!(self, Emoji::Cringe)
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emoji::Tomato => write!(f, "Tomato"),
            Emoji::Explain => write!(f, "Explain?"),
            Emoji::PlusOne => write!(f, "+1"),
            Emoji::Cringe => write!(f, "Cringe"),
        }
    }
}

impl FromStr for Emoji {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tomato" | "🥫" => Ok(Emoji::Tomato),
            "explain" | "explain?" | "❓" => Ok(Emoji::Explain),
            "plus_one" | "plusone" | "+1" | "👍" => Ok(Emoji::PlusOne),
            "cringe" | "😬" => Ok(Emoji::Cringe),
            _ => Err(format!("Unknown reaction: {}", s)),
        }
    }
}

/// How a user signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Nickname-only sign-in
    Anonymous,
    /// Google account sign-in
    Google,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Anonymous => write!(f, "anonymous"),
            AuthMethod::Google => write!(f, "google"),
        }
    }
}

/// Lifecycle phase of the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagePhase {
    /// Nobody on stage; the stage is open
    Idle,
    /// The scripted example rant is playing
    ExampleDemo,
    /// A real user holds the stage
    UserSpeaking,
    /// The last speaker was ejected by the cringe meter
    Ejected,
    /// The last speaker survived the full countdown
    Completed,
}

impl StagePhase {
    /// Whether somebody (real or scripted) currently holds the stage
    pub fn is_occupied(&self) -> bool {
        matches!(self, StagePhase::ExampleDemo | StagePhase::UserSpeaking)
    }
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagePhase::Idle => write!(f, "Idle"),
            StagePhase::ExampleDemo => write!(f, "Example Demo"),
            StagePhase::UserSpeaking => write!(f, "User Speaking"),
            StagePhase::Ejected => write!(f, "Ejected"),
            StagePhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Sort orders offered by the Hall of Howls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RantSort {
    /// Newest first
    #[default]
    Recent,
    /// Most +1 reactions first
    Popular,
    /// Longest duration first
    Longest,
    /// Highest cringe + tomato count first
    Controversial,
}

impl fmt::Display for RantSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RantSort::Recent => write!(f, "recent"),
            RantSort::Popular => write!(f, "popular"),
            RantSort::Longest => write!(f, "longest"),
            RantSort::Controversial => write!(f, "controversial"),
        }
    }
}

impl FromStr for RantSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recent" | "newest" => Ok(RantSort::Recent),
            "popular" => Ok(RantSort::Popular),
            "longest" => Ok(RantSort::Longest),
            "controversial" => Ok(RantSort::Controversial),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_parsing_accepts_names_and_symbols() {
        assert_eq!("cringe".parse::<Emoji>().unwrap(), Emoji::Cringe);
        assert_eq!("😬".parse::<Emoji>().unwrap(), Emoji::Cringe);
        assert_eq!("+1".parse::<Emoji>().unwrap(), Emoji::PlusOne);
        assert_eq!("Tomato".parse::<Emoji>().unwrap(), Emoji::Tomato);
        assert!("heart".parse::<Emoji>().is_err());
    }

    #[test]
    fn test_only_cringe_counts_toward_meter() {
        let cringe: Vec<_> = Emoji::ALL.iter().filter(|e| e.is_cringe()).collect();
        assert_eq!(cringe, vec![&Emoji::Cringe]);
    }

    #[test]
    fn test_emoji_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Emoji::PlusOne).unwrap(), "\"plus_one\"");
    }

    #[test]
    fn test_stage_phase_occupancy() {
        assert!(StagePhase::ExampleDemo.is_occupied());
        assert!(StagePhase::UserSpeaking.is_occupied());
        assert!(!StagePhase::Idle.is_occupied());
        assert!(!StagePhase::Ejected.is_occupied());
        assert!(!StagePhase::Completed.is_occupied());
    }

    #[test]
    fn test_rant_sort_parsing() {
        assert_eq!("popular".parse::<RantSort>().unwrap(), RantSort::Popular);
        assert_eq!("CONTROVERSIAL".parse::<RantSort>().unwrap(), RantSort::Controversial);
        assert!("random".parse::<RantSort>().is_err());
        assert_eq!(RantSort::default(), RantSort::Recent);
    }
}
