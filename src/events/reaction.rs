//! Reaction events and aggregate counts
//!
//! This module contains the immutable reaction event and the per-emoji
//! counters used by archived rants and the statistics report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Emoji, ReactionId, SessionId, UserId};

/// A single audience reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Unique identifier for the reaction
    pub id: ReactionId,
    /// Who reacted
    pub user_id: UserId,
    /// Stage the reaction belongs to
    pub session_id: SessionId,
    /// Which reaction
    pub emoji: Emoji,
    /// When the reaction arrived
    pub timestamp: DateTime<Utc>,
}

impl Reaction {
    /// Create a new reaction
    pub fn new(user_id: UserId, session_id: SessionId, emoji: Emoji, timestamp: DateTime<Utc>) -> Self {
        Self { id: ReactionId::new(), user_id, session_id, emoji, timestamp }
    }
}

/// Aggregate reaction counts per emoji
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStats {
    /// Tomatoes thrown
    pub tomato: u32,
    /// Requests for explanation
    pub explain: u32,
    /// Agreements
    pub plus_one: u32,
    /// Cringes
    pub cringe: u32,
}

impl ReactionStats {
    /// Count one reaction
    pub fn record(&mut self, emoji: Emoji) {
        let counter = match emoji {
            Emoji::Tomato => &mut self.tomato,
            Emoji::Explain => &mut self.explain,
            Emoji::PlusOne => &mut self.plus_one,
            Emoji::Cringe => &mut self.cringe,
        };
        *counter = counter.saturating_add(1);
    }

    /// Count for a single emoji
    pub fn count(&self, emoji: Emoji) -> u32 {
        match emoji {
            Emoji::Tomato => self.tomato,
            Emoji::Explain => self.explain,
            Emoji::PlusOne => self.plus_one,
            Emoji::Cringe => self.cringe,
        }
    }

    /// Total reactions across all emoji
    pub fn total(&self) -> u32 {
        self.tomato + self.explain + self.plus_one + self.cringe
    }

    /// Cringe plus tomato count; how divisive a rant was
    pub fn controversy_score(&self) -> u32 {
        self.cringe + self.tomato
    }
}

impl<'a> FromIterator<&'a Reaction> for ReactionStats {
    fn from_iter<I: IntoIterator<Item = &'a Reaction>>(iter: I) -> Self {
        let mut stats = Self::default();
        for reaction in iter {
            stats.record(reaction.emoji);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_stats_counting() {
        let mut stats = ReactionStats::default();
        stats.record(Emoji::Cringe);
        stats.record(Emoji::Cringe);
        stats.record(Emoji::Tomato);
        stats.record(Emoji::PlusOne);

        assert_eq!(stats.count(Emoji::Cringe), 2);
        assert_eq!(stats.count(Emoji::Explain), 0);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.controversy_score(), 3);
    }

    #[test]
    fn test_reaction_stats_from_reactions() {
        let session = SessionId::new();
        let user = UserId::new();
        let reactions: Vec<Reaction> = [Emoji::Explain, Emoji::Explain, Emoji::Cringe]
            .into_iter()
            .map(|e| Reaction::new(user.clone(), session.clone(), e, Utc::now()))
            .collect();

        let stats: ReactionStats = reactions.iter().collect();
        assert_eq!(stats.explain, 2);
        assert_eq!(stats.cringe, 1);
    }
}
