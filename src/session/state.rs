//! Session state machine
//!
//! This module contains the stage session record and the state machine that
//! moves it through `Idle → ExampleDemo → UserSpeaking → Ejected/Completed →
//! Idle`. Rejected moves return `InvalidTransition` and never touch state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::simulation::{StageError, StageResult};
use crate::types::{SessionId, StagePhase, UserId};

/// The singleton stage session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub id: SessionId,
    /// Who holds the stage, if anyone
    pub current_speaker: Option<UserId>,
    /// Users waiting to speak, first in first out
    pub speaker_queue: VecDeque<UserId>,
    /// When the current speaker took the stage
    pub start_time: Option<DateTime<Utc>>,
    /// Last published cringe percentage (0-100)
    pub cringe_level: u8,
    /// Whether the stage is live
    pub active: bool,
}

impl Session {
    /// Create an open, empty session
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            current_speaker: None,
            speaker_queue: VecDeque::new(),
            start_time: None,
            cringe_level: 0,
            active: true,
        }
    }

    /// Clear the speaker slot back to idle
    fn reset_speaker(&mut self) {
        self.current_speaker = None;
        self.start_time = None;
        self.cringe_level = 0;
    }

    /// Whether the user is waiting in the queue
    pub fn is_queued(&self, user_id: &UserId) -> bool {
        self.speaker_queue.contains(user_id)
    }

    /// Zero-based queue position of the user
    pub fn queue_position(&self, user_id: &UserId) -> Option<usize> {
        self.speaker_queue.iter().position(|id| id == user_id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// How the most recent speaking turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// The cringe meter ejected the speaker
    Ejected,
    /// The rant countdown ran out
    Completed,
    /// The speaker stepped down
    Stopped,
}

/// State machine wrapping the session
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Session,
    phase: StagePhase,
    /// Armed at the start of each turn, consumed by the first ejection
    ejection_armed: bool,
    last_outcome: Option<TurnOutcome>,
}

impl SessionState {
    /// Create an idle stage
    pub fn new() -> Self {
        Self::with_session(Session::new())
    }

    /// Wrap an existing session, deriving the phase from its speaker
    pub fn with_session(session: Session) -> Self {
        let phase = match &session.current_speaker {
            Some(id) if id.is_example_speaker() => StagePhase::ExampleDemo,
            Some(_) => StagePhase::UserSpeaking,
            None => StagePhase::Idle,
        };
        Self { ejection_armed: phase == StagePhase::UserSpeaking, session, phase, last_outcome: None }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Read-only session snapshot
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Who holds the stage
    pub fn current_speaker(&self) -> Option<&UserId> {
        self.session.current_speaker.as_ref()
    }

    /// Whether the given user is the current real speaker
    pub fn is_speaking(&self, user_id: &UserId) -> bool {
        self.phase == StagePhase::UserSpeaking && self.current_speaker() == Some(user_id)
    }

    /// Whether the given user waits in the queue
    pub fn is_queued(&self, user_id: &UserId) -> bool {
        self.session.is_queued(user_id)
    }

    /// Whether a new speaker may take the stage right now
    pub fn accepts_speaker(&self) -> bool {
        matches!(self.phase, StagePhase::Idle | StagePhase::ExampleDemo)
    }

    /// Whether the next ejection would fire
    pub fn ejection_armed(&self) -> bool {
        self.ejection_armed
    }

    /// How the most recent turn ended
    pub fn last_outcome(&self) -> Option<TurnOutcome> {
        self.last_outcome
    }

    /// Put the scripted example speaker on stage
    #[instrument(skip(self))]
    pub fn begin_demo(&mut self, now: DateTime<Utc>) -> StageResult<()> {
        if self.phase != StagePhase::Idle {
            return Err(StageError::invalid_transition(self.phase, "begin example demo"));
        }

        self.session.current_speaker = Some(UserId::example_speaker());
        self.session.start_time = Some(now);
        self.session.cringe_level = 0;
        self.phase = StagePhase::ExampleDemo;
        info!("Example demo started");
        Ok(())
    }

    /// Take the example speaker off stage; no-op outside the demo
    pub fn end_demo(&mut self) -> bool {
        if self.phase != StagePhase::ExampleDemo {
            return false;
        }

        self.session.reset_speaker();
        self.phase = StagePhase::Idle;
        info!("Example demo ended");
        true
    }

    /// Append a user to the speaker queue
    ///
    /// Returns `false` when the user is already queued. The current speaker
    /// cannot queue.
    pub fn join_queue(&mut self, user_id: &UserId) -> StageResult<bool> {
        if self.current_speaker() == Some(user_id) {
            return Err(StageError::invalid_transition(
                self.phase,
                format!("{} cannot queue while holding the stage", user_id),
            ));
        }

        if self.session.is_queued(user_id) {
            debug!("{} is already queued", user_id);
            return Ok(false);
        }

        self.session.speaker_queue.push_back(user_id.clone());
        info!("{} joined the queue at position {}", user_id, self.session.speaker_queue.len());
        Ok(true)
    }

    /// Remove a user from the speaker queue
    pub fn leave_queue(&mut self, user_id: &UserId) -> bool {
        let before = self.session.speaker_queue.len();
        self.session.speaker_queue.retain(|id| id != user_id);
        before != self.session.speaker_queue.len()
    }

    /// Give the stage to a user, preempting any example demo
    ///
    /// Returns `false` when the user is already speaking.
    #[instrument(skip(self))]
    pub fn start_speaking(&mut self, user_id: &UserId, now: DateTime<Utc>) -> StageResult<bool> {
        match self.phase {
            StagePhase::UserSpeaking if self.current_speaker() == Some(user_id) => {
                debug!("{} is already speaking", user_id);
                return Ok(false);
            }
            StagePhase::UserSpeaking => {
                return Err(StageError::invalid_transition(
                    self.phase,
                    format!("{} cannot start while another user speaks", user_id),
                ));
            }
            StagePhase::Ejected => {
                return Err(StageError::invalid_transition(
                    self.phase,
                    "ejection must be acknowledged before the next turn",
                ));
            }
            StagePhase::Idle | StagePhase::ExampleDemo | StagePhase::Completed => {}
        }

        if self.phase == StagePhase::ExampleDemo {
            info!("{} preempted the example demo", user_id);
        }

        self.leave_queue(user_id);
        self.session.current_speaker = Some(user_id.clone());
        self.session.start_time = Some(now);
        self.session.cringe_level = 0;
        self.phase = StagePhase::UserSpeaking;
        self.ejection_armed = true;
        info!("{} took the stage", user_id);
        Ok(true)
    }

    /// Start the user at the front of the queue
    pub fn advance_queue(&mut self, now: DateTime<Utc>) -> StageResult<Option<UserId>> {
        if !self.accepts_speaker() {
            return Err(StageError::invalid_transition(self.phase, "advance queue"));
        }

        let Some(next) = self.session.speaker_queue.front().cloned() else {
            return Ok(None);
        };

        self.start_speaking(&next, now)?;
        Ok(Some(next))
    }

    /// Publish a freshly computed cringe percentage
    pub fn set_cringe_level(&mut self, level: u8) {
        self.session.cringe_level = level.min(100);
    }

    /// Eject the current speaker
    ///
    /// Fires at most once per turn; returns whether it fired.
    #[instrument(skip(self))]
    pub fn eject(&mut self) -> bool {
        if self.phase != StagePhase::UserSpeaking || !self.ejection_armed {
            return false;
        }

        self.ejection_armed = false;
        let speaker = self.session.current_speaker.take();
        self.session.reset_speaker();
        self.phase = StagePhase::Ejected;
        self.last_outcome = Some(TurnOutcome::Ejected);
        info!("Speaker {:?} ejected by the cringe meter", speaker.map(|id| id.to_string()));
        true
    }

    /// Finish the current turn after the countdown ran out
    ///
    /// `Completed` settles straight back to `Idle`; returns whether a turn ended.
    pub fn complete(&mut self) -> bool {
        if self.phase != StagePhase::UserSpeaking {
            return false;
        }

        self.ejection_armed = false;
        self.session.reset_speaker();
        self.phase = StagePhase::Completed;
        self.last_outcome = Some(TurnOutcome::Completed);
        info!("Rant completed without ejection");

        self.phase = StagePhase::Idle;
        true
    }

    /// Step down from the stage or clear an ejection
    ///
    /// No-op when nobody is speaking.
    pub fn stop(&mut self) -> bool {
        match self.phase {
            StagePhase::UserSpeaking => {
                self.ejection_armed = false;
                self.session.reset_speaker();
                self.phase = StagePhase::Idle;
                self.last_outcome = Some(TurnOutcome::Stopped);
                info!("Speaker stepped down");
                true
            }
            StagePhase::Ejected | StagePhase::Completed => self.acknowledge(),
            StagePhase::Idle | StagePhase::ExampleDemo => false,
        }
    }

    /// Return to `Idle` after an ejection
    pub fn acknowledge(&mut self) -> bool {
        if !matches!(self.phase, StagePhase::Ejected | StagePhase::Completed) {
            return false;
        }

        self.phase = StagePhase::Idle;
        debug!("Stage reopened");
        true
    }

    /// Close the stage for good
    pub fn deactivate(&mut self) {
        self.session.active = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::from_raw(id)
    }

    #[test]
    fn test_join_then_start_clears_queue_and_cringe() {
        let mut state = SessionState::new();
        let u1 = user("u1");

        state.join_queue(&u1).unwrap();
        assert_eq!(state.session().speaker_queue, VecDeque::from(vec![u1.clone()]));

        state.set_cringe_level(40);
        assert!(state.start_speaking(&u1, Utc::now()).unwrap());

        assert_eq!(state.current_speaker(), Some(&u1));
        assert!(state.session().speaker_queue.is_empty());
        assert_eq!(state.session().cringe_level, 0);
        assert_eq!(state.phase(), StagePhase::UserSpeaking);
    }

    #[test]
    fn test_double_join_is_idempotent() {
        let mut state = SessionState::new();
        let u1 = user("u1");

        assert!(state.join_queue(&u1).unwrap());
        assert!(!state.join_queue(&u1).unwrap());
        assert_eq!(state.session().speaker_queue.len(), 1);
    }

    #[test]
    fn test_speaker_cannot_join_queue() {
        let mut state = SessionState::new();
        let u1 = user("u1");
        state.start_speaking(&u1, Utc::now()).unwrap();

        let before = state.session().clone();
        match state.join_queue(&u1) {
            Err(StageError::InvalidTransition { phase, .. }) => {
                assert_eq!(phase, StagePhase::UserSpeaking)
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
        assert_eq!(state.session(), &before);
    }

    #[test]
    fn test_start_while_speaking_is_noop() {
        let mut state = SessionState::new();
        let u1 = user("u1");
        let t0 = Utc::now();
        state.start_speaking(&u1, t0).unwrap();
        state.set_cringe_level(30);

        assert!(!state.start_speaking(&u1, t0 + chrono::Duration::seconds(5)).unwrap());
        assert_eq!(state.session().start_time, Some(t0));
        assert_eq!(state.session().cringe_level, 30);
    }

    #[test]
    fn test_start_while_other_speaks_is_rejected() {
        let mut state = SessionState::new();
        state.start_speaking(&user("u1"), Utc::now()).unwrap();

        assert!(state.start_speaking(&user("u2"), Utc::now()).is_err());
        assert_eq!(state.current_speaker(), Some(&user("u1")));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut state = SessionState::new();
        assert!(!state.stop());
        assert_eq!(state.phase(), StagePhase::Idle);
    }

    #[test]
    fn test_demo_is_preempted_by_speaker() {
        let mut state = SessionState::new();
        state.begin_demo(Utc::now()).unwrap();
        assert_eq!(state.current_speaker(), Some(&UserId::example_speaker()));
        assert!(state.accepts_speaker());

        state.start_speaking(&user("u1"), Utc::now()).unwrap();
        assert_eq!(state.phase(), StagePhase::UserSpeaking);
        assert!(!state.end_demo());
    }

    #[test]
    fn test_ejection_fires_once_per_turn() {
        let mut state = SessionState::new();
        let u1 = user("u1");
        state.start_speaking(&u1, Utc::now()).unwrap();

        assert!(state.eject());
        assert!(!state.eject());
        assert_eq!(state.phase(), StagePhase::Ejected);
        assert_eq!(state.last_outcome(), Some(TurnOutcome::Ejected));
        assert!(state.current_speaker().is_none());

        // Ejected blocks new turns until acknowledged
        assert!(state.start_speaking(&u1, Utc::now()).is_err());
        assert!(state.acknowledge());

        state.start_speaking(&u1, Utc::now()).unwrap();
        assert!(state.ejection_armed());
        assert!(state.eject());
    }

    #[test]
    fn test_complete_settles_to_idle() {
        let mut state = SessionState::new();
        state.start_speaking(&user("u1"), Utc::now()).unwrap();
        state.set_cringe_level(40);

        assert!(state.complete());
        assert_eq!(state.phase(), StagePhase::Idle);
        assert_eq!(state.last_outcome(), Some(TurnOutcome::Completed));
        assert_eq!(state.session().cringe_level, 0);
        assert!(state.session().start_time.is_none());
        assert!(!state.eject());
    }

    #[test]
    fn test_advance_queue_is_fifo() {
        let mut state = SessionState::new();
        state.join_queue(&user("u1")).unwrap();
        state.join_queue(&user("u2")).unwrap();

        assert_eq!(state.advance_queue(Utc::now()).unwrap(), Some(user("u1")));
        assert_eq!(state.session().queue_position(&user("u2")), Some(0));
        assert!(state.advance_queue(Utc::now()).is_err());

        state.stop();
        assert_eq!(state.advance_queue(Utc::now()).unwrap(), Some(user("u2")));
        state.stop();
        assert_eq!(state.advance_queue(Utc::now()).unwrap(), None);
    }
}
