//! Ordered reaction log
//!
//! Reactions are appended in arrival order and only the most recent entries
//! are retained. Readers always see the latest state; there are no snapshots.

use std::collections::VecDeque;

use crate::events::Reaction;

/// Bounded, arrival-ordered log of reactions
#[derive(Debug, Clone)]
pub struct ReactionLog {
    entries: VecDeque<Reaction>,
    capacity: usize,
    total_received: u64,
}

impl ReactionLog {
    /// Create a log retaining at most `capacity` reactions
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity, total_received: 0 }
    }

    /// Append a reaction, evicting the oldest when full
    pub fn push(&mut self, reaction: Reaction) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(reaction);
        self.total_received += 1;
    }

    /// The most recent `n` reactions, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Reaction> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// All retained reactions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.entries.iter()
    }

    /// The most recently appended reaction
    pub fn latest(&self) -> Option<&Reaction> {
        self.entries.back()
    }

    /// Number of retained reactions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no reaction is retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained reactions
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reactions received over the log's lifetime, including evicted ones
    pub fn total_received(&self) -> u64 {
        self.total_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Emoji, SessionId, UserId};
    use chrono::Utc;

    fn reaction(emoji: Emoji) -> Reaction {
        Reaction::new(UserId::new(), SessionId::from_raw("s"), emoji, Utc::now())
    }

    #[test]
    fn test_log_evicts_oldest_beyond_capacity() {
        let mut log = ReactionLog::new(3);
        let first = reaction(Emoji::Tomato);
        let first_id = first.id.clone();
        log.push(first);
        for _ in 0..3 {
            log.push(reaction(Emoji::Cringe));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.total_received(), 4);
        assert!(log.iter().all(|r| r.id != first_id));
    }

    #[test]
    fn test_recent_returns_tail_in_arrival_order() {
        let mut log = ReactionLog::new(10);
        log.push(reaction(Emoji::Tomato));
        log.push(reaction(Emoji::Explain));
        log.push(reaction(Emoji::Cringe));

        let tail: Vec<Emoji> = log.recent(2).map(|r| r.emoji).collect();
        assert_eq!(tail, vec![Emoji::Explain, Emoji::Cringe]);

        let everything: Vec<Emoji> = log.recent(20).map(|r| r.emoji).collect();
        assert_eq!(everything.len(), 3);
        assert_eq!(log.latest().map(|r| r.emoji), Some(Emoji::Cringe));
    }
}
