//! Stage orchestration and control
//!
//! This module contains the stage controller and everything it drives: the
//! virtual clock, the timer queue, the simulated audience, statistics,
//! notifications, logging setup and error handling.
//!
//! # Overview
//!
//! - **StageController**: explicitly mounted owner of one stage
//! - **StageClock** / **TimerQueue**: virtual time and cancellable timers
//! - **AudienceSimulator**: the local illusion of a live crowd
//! - **StageStatistics**: counters and the end-of-run report
//! - **StageError**: error taxonomy; every error is recovered locally
//!
//! # Usage Example
//!
//! ```rust
//! use soapbox_stage::simulation::*;
//! use soapbox_stage::storage::LocalStore;
//! use soapbox_stage::types::*;
//! use soapbox_stage::user::User;
//! use std::time::Duration;
//!
//! let config = StageConfig { seed: Some(42), ..Default::default() };
//! let user = User::new("RantMaster", chrono::Utc::now());
//!
//! let mut stage = StageController::mount(
//!     config,
//!     user,
//!     LocalStore::in_memory(),
//!     StageCollaborators::headless(),
//! )
//! .unwrap();
//! assert_eq!(stage.phase(), StagePhase::ExampleDemo);
//!
//! stage.advance_by(Duration::from_secs(45));
//! assert_eq!(stage.phase(), StagePhase::Idle);
//! ```

pub mod audience;
pub mod clock;
pub mod controller;
pub mod error;
pub mod logging;
pub mod notification;
pub mod scheduler;
pub mod statistics;

// Re-export all public types for convenience
pub use audience::*;
pub use clock::*;
pub use controller::*;
pub use error::*;
pub use logging::*;
pub use notification::*;
pub use scheduler::*;
pub use statistics::*;
