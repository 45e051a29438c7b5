//! Tests for the cringe meter
//!
//! These tests verify the rolling-window percentage, its rounding, the empty
//! window fallback and that the meter always reads the newest reactions.

use chrono::Utc;
use soapbox_stage::events::{Reaction, ReactionLog};
use soapbox_stage::session::{cringe_percentage, CringeAggregator};
use soapbox_stage::types::{Emoji, SessionId, UserId};

fn push(log: &mut ReactionLog, emoji: Emoji) {
    log.push(Reaction::new(UserId::from_raw("viewer"), SessionId::from_raw("stage"), emoji, Utc::now()));
}

/// Empty window falls back to the stored level
#[test]
fn test_empty_window_uses_fallback() {
    let meter = CringeAggregator::default();
    let log = ReactionLog::new(50);

    assert_eq!(meter.percentage(&log, 0), 0);
    assert_eq!(meter.percentage(&log, 42), 42);
    assert_eq!(meter.percentage(&log, 200), 100);
}

/// Percentages round half up
#[test]
fn test_rounding() {
    use Emoji::*;

    assert_eq!(cringe_percentage([Cringe, PlusOne, PlusOne]), Some(33));
    assert_eq!(cringe_percentage([Cringe, Cringe, PlusOne]), Some(67));
    let one_in_eight = [Cringe, PlusOne, PlusOne, PlusOne, PlusOne, PlusOne, PlusOne, PlusOne];
    assert_eq!(cringe_percentage(one_in_eight), Some(13));
    assert_eq!(cringe_percentage([Tomato, Explain]), Some(0));
    assert_eq!(cringe_percentage(std::iter::empty::<Emoji>()), None);
}

/// Only the newest twenty reactions count
#[test]
fn test_window_slides_by_arrival() {
    let meter = CringeAggregator::new(20, 100);
    let mut log = ReactionLog::new(50);

    for _ in 0..20 {
        push(&mut log, Emoji::Cringe);
    }
    assert_eq!(meter.percentage(&log, 0), 100);

    for _ in 0..10 {
        push(&mut log, Emoji::PlusOne);
    }
    assert_eq!(meter.percentage(&log, 0), 50);

    for _ in 0..10 {
        push(&mut log, Emoji::Tomato);
    }
    assert_eq!(meter.percentage(&log, 0), 0);
}

/// Below a full window the divisor is the reactions so far
#[test]
fn test_partial_window_divides_by_reaction_count() {
    let meter = CringeAggregator::default();
    let mut log = ReactionLog::new(50);

    let stream = [Emoji::PlusOne, Emoji::PlusOne, Emoji::PlusOne, Emoji::Cringe, Emoji::Cringe];
    let expected = [0, 0, 0, 25, 40];
    for (emoji, want) in stream.into_iter().zip(expected) {
        push(&mut log, emoji);
        assert_eq!(meter.percentage(&log, 0), want);
    }
}

/// Output stays in range for any stream and matches the closed form
#[test]
fn test_output_matches_closed_form() {
    let meter = CringeAggregator::default();
    let mut log = ReactionLog::new(50);
    let mut history = Vec::new();

    for i in 0..120 {
        let emoji = Emoji::ALL[(i * 7 + i / 3) % Emoji::ALL.len()];
        push(&mut log, emoji);
        history.push(emoji);

        let window = &history[history.len().saturating_sub(20)..];
        let cringe = window.iter().filter(|e| e.is_cringe()).count() as f64;
        let expected = (100.0 * cringe / window.len() as f64).round() as u8;

        let got = meter.percentage(&log, 0);
        assert!(got <= 100);
        assert_eq!(got, expected, "after {} reactions", i + 1);
    }
}

/// Threshold breach is inclusive
#[test]
fn test_threshold_is_inclusive() {
    let meter = CringeAggregator::new(20, 80);
    assert!(!meter.breaches(79));
    assert!(meter.breaches(80));
    assert!(meter.breaches(100));

    assert_eq!(CringeAggregator::new(0, 0).window(), 1);
    assert_eq!(CringeAggregator::new(0, 0).threshold(), 1);
}

/// The log keeps the newest entries up to its capacity
#[test]
fn test_reaction_log_capacity() {
    let mut log = ReactionLog::new(50);
    for _ in 0..49 {
        push(&mut log, Emoji::PlusOne);
    }
    push(&mut log, Emoji::Cringe);
    push(&mut log, Emoji::Tomato);

    assert_eq!(log.len(), 50);
    assert_eq!(log.total_received(), 51);
    assert_eq!(log.latest().map(|r| r.emoji), Some(Emoji::Tomato));

    let newest: Vec<Emoji> = log.recent(2).map(|r| r.emoji).collect();
    assert_eq!(newest, vec![Emoji::Cringe, Emoji::Tomato]);
}
