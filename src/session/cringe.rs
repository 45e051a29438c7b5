//! Cringe meter
//!
//! The meter looks at the most recent reactions by arrival order, not by
//! timestamp, so a burst of old reactions only leaves the window once newer
//! ones push it out.

use crate::events::ReactionLog;
use crate::types::Emoji;

/// Derives the 0-100 cringe percentage from the reaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CringeAggregator {
    window: usize,
    threshold: u8,
}

impl CringeAggregator {
    /// Create an aggregator over the last `window` reactions
    pub fn new(window: usize, threshold: u8) -> Self {
        Self { window: window.max(1), threshold: threshold.clamp(1, 100) }
    }

    /// Number of reactions considered
    pub fn window(&self) -> usize {
        self.window
    }

    /// Percentage at which the speaker is ejected
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Cringe percentage of the latest window, or `fallback` when the log is empty
    pub fn percentage(&self, log: &ReactionLog, fallback: u8) -> u8 {
        cringe_percentage(log.recent(self.window).map(|r| r.emoji)).unwrap_or(fallback.min(100))
    }

    /// Whether a percentage reaches the ejection threshold
    pub fn breaches(&self, percentage: u8) -> bool {
        percentage >= self.threshold
    }
}

impl Default for CringeAggregator {
    fn default() -> Self {
        Self::new(crate::types::stage::CRINGE_WINDOW, crate::types::stage::EJECT_THRESHOLD)
    }
}

/// Rounded share of cringe reactions, `None` for an empty window
pub fn cringe_percentage<I>(emojis: I) -> Option<u8>
where
    I: IntoIterator<Item = Emoji>,
{
    let (cringe, total) = emojis
        .into_iter()
        .fold((0u64, 0u64), |(c, n), e| (c + u64::from(e.is_cringe()), n + 1));

    if total == 0 {
        return None;
    }

    // round half up: (100c/n + 1/2)
    let rounded = (200 * cringe + total) / (2 * total);
    Some(rounded.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Reaction;
    use crate::types::{SessionId, UserId};
    use chrono::Utc;

    fn log_of(emojis: &[Emoji]) -> ReactionLog {
        let mut log = ReactionLog::new(50);
        for emoji in emojis {
            log.push(Reaction::new(UserId::new(), SessionId::from_raw("s"), *emoji, Utc::now()));
        }
        log
    }

    #[test]
    fn test_empty_log_falls_back_to_stored_level() {
        let aggregator = CringeAggregator::default();
        assert_eq!(aggregator.percentage(&ReactionLog::new(50), 0), 0);
        assert_eq!(aggregator.percentage(&ReactionLog::new(50), 37), 37);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(cringe_percentage([Emoji::Cringe, Emoji::Tomato, Emoji::Tomato]), Some(33));
        assert_eq!(cringe_percentage([Emoji::Cringe, Emoji::Cringe, Emoji::Tomato]), Some(67));
        let one_in_eight = std::iter::once(Emoji::Cringe).chain(std::iter::repeat(Emoji::Tomato).take(7));
        assert_eq!(cringe_percentage(one_in_eight), Some(13));
        assert_eq!(cringe_percentage(std::iter::empty()), None);
    }

    #[test]
    fn test_only_last_window_counts() {
        let mut emojis = vec![Emoji::Cringe; 20];
        emojis.extend(std::iter::repeat(Emoji::PlusOne).take(10));
        let aggregator = CringeAggregator::default();

        // last 20: 10 cringe then 10 plus-one
        assert_eq!(aggregator.percentage(&log_of(&emojis), 0), 50);
    }

    #[test]
    fn test_full_cringe_window_breaches() {
        let aggregator = CringeAggregator::default();
        let pct = aggregator.percentage(&log_of(&[Emoji::Cringe; 20]), 0);
        assert_eq!(pct, 100);
        assert!(aggregator.breaches(pct));
        assert!(!aggregator.breaches(99));
    }
}
