//! Core user struct and methods
//!
//! This module contains the User struct shared by signed-in users and the
//! synthetic audience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AuthMethod, UserId};

/// Nickname shown for the scripted example speaker
pub const EXAMPLE_SPEAKER_NICKNAME: &str = "ExampleRanter";

/// Represents a user on the stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: UserId,
    /// Display name
    pub nickname: String,
    /// Optional avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// How the user signed in
    pub auth_method: AuthMethod,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new anonymous user with a fresh identifier
    pub fn new(nickname: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            nickname: nickname.into(),
            avatar: None,
            auth_method: AuthMethod::Anonymous,
            created_at,
        }
    }

    /// Create a user with a known identifier
    pub fn with_id(id: UserId, nickname: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self { id, nickname: nickname.into(), avatar: None, auth_method: AuthMethod::Anonymous, created_at }
    }

    /// The scripted speaker of the example rant
    pub fn example_speaker(created_at: DateTime<Utc>) -> Self {
        Self::with_id(UserId::example_speaker(), EXAMPLE_SPEAKER_NICKNAME, created_at)
    }

    /// Whether this is the scripted example speaker
    pub fn is_example_speaker(&self) -> bool {
        self.id.is_example_speaker()
    }
}
