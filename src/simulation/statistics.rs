//! Statistics collection and reporting
//!
//! This module contains the counters a stage run accumulates and the reports
//! the `soapbox` binary prints at the end of a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::events::ReactionStats;
use crate::session::TurnOutcome;
use crate::types::Emoji;

/// Counters collected over the lifetime of a stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageStatistics {
    /// Reactions per emoji, simulated and local together
    pub reactions: ReactionStats,
    /// Reactions produced by the simulated audience
    pub simulated_reactions: usize,
    /// Reactions sent by the local user
    pub local_reactions: usize,

    /// Speaking turns started by real users
    pub turns_started: usize,
    /// Turns ended by the cringe meter
    pub ejections: usize,
    /// Turns that ran the full countdown
    pub completions: usize,
    /// Turns the speaker ended early
    pub stops: usize,
    /// Rants submitted (text or voice)
    pub rants_submitted: usize,

    /// Times the example demo took the stage
    pub demos_played: usize,
    /// Audience re-rolls
    pub audience_refreshes: usize,
    /// Text-to-speech requests that failed
    pub synthesis_failures: usize,
    /// Microphone captures that failed
    pub recording_failures: usize,

    /// Highest cringe percentage observed
    pub peak_cringe: u8,
    /// Simulated time covered by the run
    pub simulated_duration: Duration,
}

impl StageStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a reaction
    pub fn record_reaction(&mut self, emoji: Emoji, simulated: bool) {
        self.reactions.record(emoji);
        if simulated {
            self.simulated_reactions += 1;
        } else {
            self.local_reactions += 1;
        }
    }

    /// Track the highest cringe reading
    pub fn observe_cringe(&mut self, percentage: u8) {
        self.peak_cringe = self.peak_cringe.max(percentage);
    }

    /// Count a new speaking turn
    pub fn record_turn_started(&mut self) {
        self.turns_started += 1;
    }

    /// Count how a turn ended
    pub fn record_turn_outcome(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::Ejected => self.ejections += 1,
            TurnOutcome::Completed => self.completions += 1,
            TurnOutcome::Stopped => self.stops += 1,
        }
    }

    /// Count a submitted rant
    pub fn record_rant_submitted(&mut self) {
        self.rants_submitted += 1;
    }

    /// Count an example demo
    pub fn record_demo(&mut self) {
        self.demos_played += 1;
    }

    /// Count an audience re-roll
    pub fn record_audience_refresh(&mut self) {
        self.audience_refreshes += 1;
    }

    /// Count a failed text-to-speech request
    pub fn record_synthesis_failure(&mut self) {
        self.synthesis_failures += 1;
    }

    /// Count a failed microphone capture
    pub fn record_recording_failure(&mut self) {
        self.recording_failures += 1;
    }

    /// Set the simulated time covered
    pub fn set_simulated_duration(&mut self, duration: Duration) {
        self.simulated_duration = duration;
    }

    /// Total reactions recorded
    pub fn total_reactions(&self) -> usize {
        self.simulated_reactions + self.local_reactions
    }

    /// Turns that have ended one way or another
    pub fn finished_turns(&self) -> usize {
        self.ejections + self.completions + self.stops
    }

    /// Share of reactions with the given emoji
    pub fn emoji_percentage(&self, emoji: Emoji) -> f64 {
        percentage(self.reactions.count(emoji) as usize, self.total_reactions())
    }

    /// Share of finished turns ended by ejection
    pub fn ejection_rate(&self) -> f64 {
        percentage(self.ejections, self.finished_turns())
    }

    /// Share of finished turns that survived the countdown
    pub fn survival_rate(&self) -> f64 {
        percentage(self.completions, self.finished_turns())
    }

    /// Reactions per simulated minute
    pub fn reactions_per_minute(&self) -> f64 {
        let minutes = self.simulated_duration.as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            0.0
        } else {
            self.total_reactions() as f64 / minutes
        }
    }

    /// One-line summary
    pub fn compact_summary(&self) -> String {
        format!(
            "{} reactions, {} turns ({} ejected, {} completed, {} stopped), peak cringe {}%",
            self.total_reactions(),
            self.turns_started,
            self.ejections,
            self.completions,
            self.stops,
            self.peak_cringe
        )
    }

    /// Multi-line report printed at the end of a run
    pub fn generate_summary_report(&self) -> String {
        let mut output = String::new();

        output.push_str("🎤 Soapbox Stage Closed!\n");
        output.push_str("========================\n\n");

        output.push_str("📊 Run Summary:\n");
        output.push_str(&format!(
            "   Simulated Time: {:.0} seconds\n",
            self.simulated_duration.as_secs_f64()
        ));
        output.push_str(&format!("   Example Demos: {}\n", self.demos_played));
        output.push_str(&format!("   Audience Re-rolls: {}\n\n", self.audience_refreshes));

        output.push_str("📣 Reactions:\n");
        output.push_str(&format!(
            "   Total: {} ({} audience, {} local, {:.1}/min)\n",
            self.total_reactions(),
            self.simulated_reactions,
            self.local_reactions,
            self.reactions_per_minute()
        ));
        for emoji in Emoji::ALL {
            output.push_str(&format!(
                "   {} {:<9} {:>4} ({:.1}%)\n",
                emoji.symbol(),
                emoji.to_string(),
                self.reactions.count(emoji),
                self.emoji_percentage(emoji)
            ));
        }
        output.push_str(&format!("   Peak Cringe: {}%\n\n", self.peak_cringe));

        output.push_str("🎙️ Speaking Turns:\n");
        output.push_str(&format!(
            "   Started: {} ({} rants submitted)\n",
            self.turns_started, self.rants_submitted
        ));
        output.push_str(&format!(
            "   Ejected: {} ({:.1}%)\n",
            self.ejections,
            self.ejection_rate()
        ));
        output.push_str(&format!(
            "   Survived: {} ({:.1}%)\n",
            self.completions,
            self.survival_rate()
        ));
        output.push_str(&format!("   Stepped Down: {}\n", self.stops));

        if self.synthesis_failures > 0 || self.recording_failures > 0 {
            output.push_str("\n⚠️ Degraded Features:\n");
            output.push_str(&format!("   Speech Synthesis Failures: {}\n", self.synthesis_failures));
            output.push_str(&format!("   Recording Failures: {}\n", self.recording_failures));
        }

        output
    }
}

impl fmt::Display for StageStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact_summary())
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
