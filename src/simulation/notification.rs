//! Transient user-visible messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Something went right
    Success,
    /// A feature degraded but the stage keeps running
    Warning,
    /// Something went wrong for the user
    Error,
}

/// A toast-style message for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
    /// When it was raised
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification
    pub fn new(level: NotificationLevel, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self { level, message: message.into(), at }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warn",
            NotificationLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}
