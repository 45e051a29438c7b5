//! Unique identifier types for the stage engine
//!
//! This module contains the opaque string identifiers for users, sessions,
//! reactions and archived rants. Generated identifiers carry a readable prefix
//! followed by a UUID so they stay unique across simulated audiences.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier reserved for the scripted example speaker
pub const EXAMPLE_SPEAKER_ID: &str = "example_speaker";

macro_rules! prefixed_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Fresh random identifier of the form `", $prefix, "_<uuid>`")]
            pub fn new() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::new_v4().simple()))
            }

            /// Wrap an identifier that already exists elsewhere
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from_raw(raw)
            }
        }
    };
}

prefixed_id!(
    /// A signed-in user, audience member or the example speaker
    UserId,
    "user"
);
prefixed_id!(
    /// One stage session
    SessionId,
    "session"
);
prefixed_id!(
    /// One emoji reaction
    ReactionId,
    "reaction"
);
prefixed_id!(
    /// An archived rant in the Hall of Howls
    RantId,
    "rant"
);

impl UserId {
    /// The fixed identity of the scripted example speaker
    pub fn example_speaker() -> Self {
        Self(EXAMPLE_SPEAKER_ID.to_string())
    }

    /// Whether this is the scripted example speaker
    pub fn is_example_speaker(&self) -> bool {
        self.0 == EXAMPLE_SPEAKER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_prefixed() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("user_"));
        assert!(SessionId::new().as_str().starts_with("session_"));
        assert!(ReactionId::new().as_str().starts_with("reaction_"));
        assert!(RantId::new().as_str().starts_with("rant_"));
        assert_eq!(RantId::from("r1").to_string(), "r1");
    }

    #[test]
    fn test_example_speaker_identity() {
        let example = UserId::example_speaker();
        assert!(example.is_example_speaker());
        assert_eq!(example.to_string(), "example_speaker");
        assert!(!UserId::new().is_example_speaker());
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let id = UserId::from_raw("u1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u1\"");

        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
