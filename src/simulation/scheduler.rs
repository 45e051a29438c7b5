//! Scheduled timers with cancellation tokens
//!
//! Timers fire in `(due time, scheduling order)` order. Cancelling a token
//! removes the timer lazily: it is skipped when it reaches the front of the
//! queue. Repeating timers are re-armed from their due time, not from when
//! they were processed, so cadences do not drift.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use tracing::debug;

/// What a timer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// 1 Hz tick of the user rant countdown
    RantCountdown,
    /// 1 Hz tick of the example demo countdown
    DemoCountdown,
    /// Audience reaction generator
    AudienceReaction,
    /// Audience re-roll
    AudienceRefresh,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::RantCountdown => write!(f, "rant countdown"),
            TimerKind::DemoCountdown => write!(f, "demo countdown"),
            TimerKind::AudienceReaction => write!(f, "audience reaction"),
            TimerKind::AudienceRefresh => write!(f, "audience refresh"),
        }
    }
}

/// Shared flag that cancels a scheduled timer
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a live token
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every timer holding this token
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    /// Whether the token was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Owner's handle on a scheduled timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    kind: TimerKind,
    token: CancellationToken,
}

impl TimerHandle {
    /// Timer identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// What the timer drives
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Cancel the timer
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// Timer identifier
    pub id: u64,
    /// What the timer drives
    pub kind: TimerKind,
    /// Clock reading the timer was due at
    pub due_ms: u64,
}

#[derive(Debug)]
struct ScheduledTimer {
    due_ms: u64,
    seq: u64,
    id: u64,
    kind: TimerKind,
    period_ms: Option<u64>,
    token: CancellationToken,
}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for ScheduledTimer {}

impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTimer {
    // reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_ms, other.seq).cmp(&(self.due_ms, self.seq))
    }
}

/// Priority queue of pending timers
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<ScheduledTimer>,
    next_id: u64,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay_ms` after `now_ms`
    pub fn schedule_once(&mut self, kind: TimerKind, now_ms: u64, delay_ms: u64) -> TimerHandle {
        self.schedule(kind, now_ms.saturating_add(delay_ms), None)
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`
    pub fn schedule_repeating(&mut self, kind: TimerKind, now_ms: u64, period_ms: u64) -> TimerHandle {
        let period_ms = period_ms.max(1);
        self.schedule(kind, now_ms.saturating_add(period_ms), Some(period_ms))
    }

    fn schedule(&mut self, kind: TimerKind, due_ms: u64, period_ms: Option<u64>) -> TimerHandle {
        self.next_id += 1;
        let id = self.next_id;
        let token = CancellationToken::new();

        self.push(ScheduledTimer { due_ms, seq: 0, id, kind, period_ms, token: token.clone() });
        debug!(timer_id = id, %kind, due_ms, "Scheduled timer");
        TimerHandle { id, kind, token }
    }

    fn push(&mut self, mut timer: ScheduledTimer) {
        self.next_seq += 1;
        timer.seq = self.next_seq;
        self.heap.push(timer);
    }

    fn discard_cancelled(&mut self) {
        while self.heap.peek().is_some_and(|t| t.token.is_cancelled()) {
            self.heap.pop();
        }
    }

    /// Due time of the earliest live timer
    pub fn next_due(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.heap.peek().map(|t| t.due_ms)
    }

    /// Pop the earliest live timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer> {
        self.discard_cancelled();
        if self.heap.peek()?.due_ms > now_ms {
            return None;
        }

        let mut timer = self.heap.pop()?;
        let fired = FiredTimer { id: timer.id, kind: timer.kind, due_ms: timer.due_ms };

        if let Some(period) = timer.period_ms {
            timer.due_ms = timer.due_ms.saturating_add(period);
            self.push(timer);
        }

        Some(fired)
    }

    /// Cancel every pending timer
    pub fn cancel_all(&mut self) {
        for timer in self.heap.drain() {
            timer.token.cancel();
        }
    }

    /// Number of live timers
    pub fn active_count(&self) -> usize {
        self.heap.iter().filter(|t| !t.token.is_cancelled()).count()
    }

    /// Whether a live timer of `kind` is pending
    pub fn has_active(&self, kind: TimerKind) -> bool {
        self.heap.iter().any(|t| t.kind == kind && !t.token.is_cancelled())
    }
}
