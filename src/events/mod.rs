//! Audience reaction events
//!
//! This module contains the reaction event, per-emoji aggregate counts and the
//! bounded arrival-ordered log that the cringe meter reads from.
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::events::*;
//! use soapbox_stage::types::*;
//!
//! let mut log = ReactionLog::new(50);
//! log.push(Reaction::new(UserId::new(), SessionId::new(), Emoji::Cringe, chrono::Utc::now()));
//!
//! let stats: ReactionStats = log.iter().collect();
//! assert_eq!(stats.cringe, 1);
//! ```

pub mod log;
pub mod reaction;

// Re-export all public types for convenience
pub use log::ReactionLog;
pub use reaction::{Reaction, ReactionStats};
