//! Core types and identifiers for the stage engine
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the stage engine.
//!
//! # Overview
//!
//! - **Identifiers**: opaque string identifiers for users, sessions, reactions and rants
//! - **Enums**: the reaction emoji set, stage phases and Hall of Howls sort orders
//! - **Configuration**: stage configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::types::*;
//!
//! let speaker = UserId::example_speaker();
//! assert!(speaker.is_example_speaker());
//!
//! let reaction: Emoji = "😬".parse().unwrap();
//! assert!(reaction.is_cringe());
//!
//! let config = StageConfig {
//!     rant_duration_secs: 30,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
