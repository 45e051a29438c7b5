//! Simulated audience
//!
//! There is no backend. Everything this module produces is a local illusion
//! of a live crowd: made-up users and made-up reactions on a randomized
//! cadence. Replacing it with a real publish/subscribe channel leaves the
//! session state machine and the cringe meter untouched.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::events::Reaction;
use crate::types::{Emoji, SessionId, StageConfig};
use crate::user::{User, UserGenerator};

/// Emoji pool drawn from during the example demo; favors agreement and cringe
pub const DEMO_EMOJI_WEIGHTS: [Emoji; 6] =
    [Emoji::PlusOne, Emoji::PlusOne, Emoji::Cringe, Emoji::Cringe, Emoji::Tomato, Emoji::Explain];

/// How often the audience reacts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionCadence {
    /// Generator period
    pub interval_ms: u64,
    /// Chance that a tick produces a reaction
    pub probability: f64,
}

/// Fake connected users and fake reactions
#[derive(Debug)]
pub struct AudienceSimulator {
    users: UserGenerator,
    rng: StdRng,
    audience_range: (usize, usize),
    normal: ReactionCadence,
    demo: ReactionCadence,
    connected: Vec<User>,
}

impl AudienceSimulator {
    /// Create a simulator from the stage configuration
    ///
    /// A configured seed makes both the audience and the reactions reproducible.
    pub fn new(config: &StageConfig) -> Self {
        let (users, rng) = match config.seed {
            Some(seed) => (UserGenerator::with_seed(seed), StdRng::seed_from_u64(seed.wrapping_add(1))),
            None => (UserGenerator::new(), StdRng::from_entropy()),
        };

        Self {
            users,
            rng,
            audience_range: config.audience_range(),
            normal: ReactionCadence {
                interval_ms: config.reaction_interval_ms,
                probability: config.reaction_probability,
            },
            demo: ReactionCadence {
                interval_ms: config.demo_reaction_interval_ms,
                probability: config.demo_reaction_probability,
            },
            connected: Vec::new(),
        }
    }

    /// Replace the audience with a fresh random crowd
    ///
    /// The example speaker stays connected while the demo runs.
    #[instrument(skip(self))]
    pub fn roll_audience(&mut self, demo_active: bool, now: DateTime<Utc>) -> &[User] {
        let (min, max) = self.audience_range;
        let mut crowd = self.users.generate_audience(min, max, now);
        if demo_active {
            crowd.insert(0, User::example_speaker(now));
        }

        debug!("Audience re-rolled to {} users", crowd.len());
        self.connected = crowd;
        &self.connected
    }

    /// Users currently shown as connected
    pub fn connected_users(&self) -> &[User] {
        &self.connected
    }

    /// Make sure a user appears in the connected list
    pub fn ensure_connected(&mut self, user: &User) {
        if !self.connected.iter().any(|u| u.id == user.id) {
            self.connected.push(user.clone());
        }
    }

    /// Drop the example speaker once the demo is over
    pub fn dismiss_example_speaker(&mut self) {
        self.connected.retain(|u| !u.is_example_speaker());
    }

    /// Reaction cadence for the current stage mood
    pub fn cadence(&self, demo_active: bool) -> ReactionCadence {
        if demo_active {
            self.demo
        } else {
            self.normal
        }
    }

    /// Pick an emoji: uniform normally, weighted during the demo
    pub fn pick_emoji(&mut self, demo_active: bool) -> Emoji {
        let pool: &[Emoji] = if demo_active { &DEMO_EMOJI_WEIGHTS } else { &Emoji::ALL };
        pool.choose(&mut self.rng).copied().unwrap_or(Emoji::PlusOne)
    }

    /// One generator tick: maybe produce a reaction from a random audience member
    pub fn next_reaction(
        &mut self,
        session_id: &SessionId,
        demo_active: bool,
        now: DateTime<Utc>,
    ) -> Option<Reaction> {
        let cadence = self.cadence(demo_active);
        if !self.rng.gen_bool(cadence.probability.clamp(0.0, 1.0)) {
            return None;
        }

        let reactors: Vec<&User> = self.connected.iter().filter(|u| !u.is_example_speaker()).collect();
        let reactor = reactors.choose(&mut self.rng)?.id.clone();
        let emoji = self.pick_emoji(demo_active);

        Some(Reaction::new(reactor, session_id.clone(), emoji, now))
    }
}
