//! r/Soapbox Stage Engine
//!
//! The session, reaction and cringe engine behind r/Soapbox: users queue for a
//! virtual stage, deliver a 60-second rant (typed text read by a
//! text-to-speech voice, or a microphone recording), and a live audience
//! reacts with emoji that drive a cringe meter. At 100% the speaker is ejected.
//!
//! # Overview
//!
//! The audience is simulated locally. There is no server and no multi-client
//! broadcast; every stage owns its own fabricated crowd. Time is virtual: the
//! stage only moves when it is advanced, so whole sessions replay
//! deterministically from a seed.
//!
//! ## Key Features
//!
//! - **Session State Machine**: `Idle → ExampleDemo → UserSpeaking → Ejected/Completed → Idle`
//! - **Cringe Meter**: share of cringe reactions among the last 20, ejecting at 100%
//! - **Audience Simulator**: 5-12 fake users reacting on a randomized cadence
//! - **Stage Controller**: commands, countdowns and teardown over cancellable timers
//! - **Speech**: text-to-speech over HTTP, microphone capture, playback sinks
//! - **Hall of Howls**: searchable archive of past rants
//!
//! ## Quick Start
//!
//! ```rust
//! use soapbox_stage::*;
//! use std::time::Duration;
//!
//! let mut store = LocalStore::in_memory();
//! let me = user::identity::sign_in(&mut store, "RantMaster", chrono::Utc::now())?;
//!
//! let config = StageConfig { seed: Some(7), ..Default::default() };
//! let mut stage = StageController::mount(config, me, store, StageCollaborators::headless())?;
//!
//! stage.start_speaking()?;
//! stage.submit_text_rant("Return your shopping carts!", None)?;
//! stage.advance_by(Duration::from_secs(10));
//!
//! println!("cringe: {}%", stage.cringe_percentage());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`events`]: reactions and the reaction log
//! - [`session`]: session state machine and cringe meter
//! - [`user`]: users, the synthetic audience and sign-in
//! - [`storage`]: client-local persistence
//! - [`speech`]: text-to-speech, microphone and playback collaborators
//! - [`archive`]: the Hall of Howls
//! - [`simulation`]: the stage controller, clock, timers and statistics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Events    │    │    User     │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Reactions   │    │ Generator   │
//! │ Enums       │    │ Log         │    │ Identity    │
//! │ Config      │    │             │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │    │  Speech     │    │ Simulation  │
//! │             │    │             │    │             │
//! │ State       │◄───┤ Synthesizer │◄───┤ Controller  │
//! │ Cringe      │    │ Microphone  │    │ Clock/Timers│
//! │             │    │ Playback    │    │ Audience    │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod archive;
pub mod events;
pub mod session;
pub mod simulation;
pub mod speech;
pub mod storage;
pub mod types;
pub mod user;

// Core types and identifiers
pub use types::{
    AuthMethod, ConfigError, ConfigValidationError, Emoji, RantId, RantSort, ReactionId,
    SessionId, StageConfig, StagePhase, UserId,
};

// Events and session
pub use events::{Reaction, ReactionLog, ReactionStats};
pub use session::{CringeAggregator, Session, SessionState, TurnOutcome};

// Users and persistence
pub use storage::LocalStore;
pub use user::{User, UserGenerator};

// Speech collaborators
pub use speech::{
    AudioClip, AudioSink, ElevenLabsClient, Microphone, SpeechSynthesizer, Voice, VoiceSettings,
};

// Archive
pub use archive::{HallOfHowls, Rant};

// Stage control
pub use simulation::{
    AudienceSimulator, LoggingConfig, Notification, NotificationLevel, RantContent, StageClock,
    StageCollaborators, StageController, StageError, StageResult, StageStatistics, TimerQueue,
};
