//! Stage session lifecycle
//!
//! This module contains the session record, the state machine that drives
//! speaker turns, and the cringe meter that can end them early.

pub mod cringe;
pub mod state;

pub use cringe::{cringe_percentage, CringeAggregator};
pub use state::{Session, SessionState, TurnOutcome};
