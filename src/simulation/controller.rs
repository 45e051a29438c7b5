//! Stage controller
//!
//! This module contains the StageController, the explicitly mounted owner of
//! one stage: session state machine, reaction log, cringe meter, simulated
//! audience, speech collaborators and every timer. All state changes happen
//! in single atomic steps driven by commands or by timers coming due on the
//! virtual clock.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

use crate::events::{Reaction, ReactionLog};
use crate::session::{CringeAggregator, Session, SessionState, TurnOutcome};
use crate::simulation::{
    AudienceSimulator, FiredTimer, Notification, NotificationLevel, StageClock, StageError,
    StageResult, StageStatistics, TimerHandle, TimerKind, TimerQueue,
};
use crate::speech::{
    default_voice, example_voices, random_voice, AudioClip, AudioSink, DisabledSynthesizer,
    HeadlessSink, Microphone, PrerecordedMicrophone, SpeechSynthesizer, Voice, VoiceSettings,
};
use crate::stage_event;
use crate::storage::LocalStore;
use crate::types::{Emoji, StageConfig, StagePhase};
use crate::user::User;

/// Script read by the example speaker
pub const EXAMPLE_RANT_TEXT: &str = "Okay, here's something that's been driving me absolutely INSANE lately - people who don't return their shopping carts! Like, seriously? You just walked around a massive store for an hour, but suddenly those extra 20 steps to the cart return are too much effort? And don't give me that 'it's someone's job' excuse - that's like throwing trash on the ground because janitors exist! It's basic human decency, people! The shopping cart test is the ultimate measure of whether you're a good person or not. There's no law forcing you to return it, no punishment if you don't, and no reward if you do. It's purely about doing the right thing because it's the right thing to do!";

const TICK_MS: u64 = 1000;

/// What the current speaker submitted
#[derive(Debug, Clone, PartialEq)]
pub struct RantContent {
    /// Typed rant, if any
    pub text: Option<String>,
    /// Synthesized or recorded audio, if any
    pub audio: Option<AudioClip>,
    /// Estimated speaking time in seconds
    pub duration_secs: u32,
}

/// Audio collaborators handed to a stage at mount
pub struct StageCollaborators {
    /// Text-to-speech provider
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    /// Voice capture device
    pub microphone: Box<dyn Microphone>,
    /// Playback device
    pub sink: Box<dyn AudioSink>,
}

impl StageCollaborators {
    /// No speech provider, no microphone, silent playback
    pub fn headless() -> Self {
        Self {
            synthesizer: Box::new(DisabledSynthesizer),
            microphone: Box::new(PrerecordedMicrophone::denied()),
            sink: Box::new(HeadlessSink::new()),
        }
    }
}

impl fmt::Debug for StageCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageCollaborators")
            .field("speech_configured", &self.synthesizer.is_configured())
            .field("recording", &self.microphone.is_recording())
            .field("playing", &self.sink.is_playing())
            .finish()
    }
}

#[derive(Debug, Default)]
struct StageTimers {
    rant: Option<TimerHandle>,
    demo: Option<TimerHandle>,
    reaction: Option<TimerHandle>,
    refresh: Option<TimerHandle>,
}

impl StageTimers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::RantCountdown => &mut self.rant,
            TimerKind::DemoCountdown => &mut self.demo,
            TimerKind::AudienceReaction => &mut self.reaction,
            TimerKind::AudienceRefresh => &mut self.refresh,
        }
    }

    fn is_current(&self, fired: &FiredTimer) -> bool {
        let handle = match fired.kind {
            TimerKind::RantCountdown => &self.rant,
            TimerKind::DemoCountdown => &self.demo,
            TimerKind::AudienceReaction => &self.reaction,
            TimerKind::AudienceRefresh => &self.refresh,
        };
        handle.as_ref().is_some_and(|h| h.id() == fired.id && !h.is_cancelled())
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.slot(kind).take() {
            handle.cancel();
        }
    }
}

/// One mounted stage
pub struct StageController {
    config: StageConfig,
    clock: StageClock,
    timers: TimerQueue,
    handles: StageTimers,
    state: SessionState,
    log: ReactionLog,
    aggregator: CringeAggregator,
    audience: AudienceSimulator,
    local_user: User,
    store: LocalStore,
    collaborators: StageCollaborators,
    voice_rng: StdRng,
    rant: Option<RantContent>,
    time_left: Option<u32>,
    demo_time_left: Option<u32>,
    example_voice: &'static Voice,
    example_audio: Option<AudioClip>,
    notifications: Vec<Notification>,
    statistics: StageStatistics,
    mounted: bool,
}

impl fmt::Debug for StageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageController")
            .field("phase", &self.state.phase())
            .field("local_user", &self.local_user.id)
            .field("elapsed_ms", &self.clock.elapsed_ms())
            .field("cringe", &self.state.session().cringe_level)
            .field("time_left", &self.time_left)
            .field("demo_time_left", &self.demo_time_left)
            .field("active_timers", &self.timers.active_count())
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl StageController {
    /// Mount a stage for `local_user`
    ///
    /// Starts the example demo when the store says this client has not seen
    /// it, rolls the first audience and arms the audience timers.
    #[instrument(skip_all, fields(user = %local_user.id))]
    pub fn mount(
        config: StageConfig,
        local_user: User,
        store: LocalStore,
        collaborators: StageCollaborators,
    ) -> StageResult<Self> {
        Self::mount_with_clock(config, local_user, store, collaborators, StageClock::starting_now())
    }

    /// Mount a stage on an explicit clock
    pub fn mount_with_clock(
        config: StageConfig,
        local_user: User,
        store: LocalStore,
        collaborators: StageCollaborators,
        clock: StageClock,
    ) -> StageResult<Self> {
        config
            .validate()
            .map_err(|e| StageError::configuration_error(e.to_string()))?;
        if local_user.is_example_speaker() {
            return Err(StageError::invalid_input("the example speaker cannot mount a stage"));
        }

        let voice_rng = match config.seed {
            Some(seed) => {
                info!("Using deterministic seed: {}", seed);
                StdRng::seed_from_u64(seed.wrapping_add(2))
            }
            None => {
                debug!("Using entropy-based random seed");
                StdRng::from_entropy()
            }
        };

        let mut controller = Self {
            audience: AudienceSimulator::new(&config),
            log: ReactionLog::new(config.reaction_log_capacity),
            aggregator: CringeAggregator::new(config.cringe_window, config.eject_threshold),
            clock,
            timers: TimerQueue::new(),
            handles: StageTimers::default(),
            state: SessionState::new(),
            local_user,
            store,
            collaborators,
            voice_rng,
            rant: None,
            time_left: None,
            demo_time_left: None,
            example_voice: default_voice(),
            example_audio: None,
            notifications: Vec::new(),
            statistics: StageStatistics::new(),
            mounted: true,
            config,
        };

        controller.initialize()?;
        Ok(controller)
    }

    fn initialize(&mut self) -> StageResult<()> {
        let now = self.clock.now();

        if !self.store.has_seen_example() {
            self.state.begin_demo(now)?;
            self.demo_time_left = Some(self.config.demo_duration_secs);
            let handle = self.timers.schedule_repeating(TimerKind::DemoCountdown, self.clock.elapsed_ms(), TICK_MS);
            self.handles.demo = Some(handle);
            self.statistics.record_demo();

            if let Err(e) = self.store.mark_example_seen() {
                warn!("Could not remember that the example was shown: {}", e);
            }
        }

        let demo = self.demo_active();
        self.audience.roll_audience(demo, now);
        self.audience.ensure_connected(&self.local_user);

        let refresh_ms = u64::from(self.config.audience_refresh_secs) * 1000;
        let handle = self.timers.schedule_repeating(TimerKind::AudienceRefresh, self.clock.elapsed_ms(), refresh_ms);
        self.handles.refresh = Some(handle);
        self.reschedule_reactions();

        if let Some(voice) = example_voices().choose(&mut self.voice_rng) {
            self.example_voice = voice;
        }
        self.prepare_example_audio();

        if demo {
            self.notify(
                NotificationLevel::Success,
                format!(
                    "🎭 Welcome! An AI example rant is ready with {} voice - play it and try reacting!",
                    self.example_voice.name
                ),
            );
        }

        stage_event!(info, "Stage mounted", demo = demo, audience = self.audience.connected_users().len());
        Ok(())
    }

    // ---- views ----

    /// Current lifecycle phase
    pub fn phase(&self) -> StagePhase {
        self.state.phase()
    }

    /// Read-only session snapshot
    pub fn session(&self) -> &Session {
        self.state.session()
    }

    /// The user this stage was mounted for
    pub fn local_user(&self) -> &User {
        &self.local_user
    }

    /// Whether the local user holds the stage
    pub fn is_local_speaking(&self) -> bool {
        self.state.is_speaking(&self.local_user.id)
    }

    /// Whether the local user waits in the queue
    pub fn is_local_queued(&self) -> bool {
        self.state.is_queued(&self.local_user.id)
    }

    /// Last published cringe percentage
    pub fn cringe_percentage(&self) -> u8 {
        self.state.session().cringe_level
    }

    /// Seconds left in the running rant
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// Seconds left in the example demo
    pub fn demo_time_left(&self) -> Option<u32> {
        self.demo_time_left
    }

    /// Whether the example demo holds the stage
    pub fn demo_active(&self) -> bool {
        self.state.phase() == StagePhase::ExampleDemo
    }

    /// Nobody on stage and no demo running
    pub fn stage_open(&self) -> bool {
        self.state.phase() == StagePhase::Idle
    }

    /// Users shown as connected
    pub fn connected_users(&self) -> &[User] {
        self.audience.connected_users()
    }

    /// The live reaction log
    pub fn reactions(&self) -> &ReactionLog {
        &self.log
    }

    /// What the local user submitted for the running turn
    pub fn current_rant(&self) -> Option<&RantContent> {
        self.rant.as_ref()
    }

    /// Voice the example rant is read in
    pub fn example_voice(&self) -> &'static Voice {
        self.example_voice
    }

    /// Whether example audio has been generated
    pub fn example_audio_ready(&self) -> bool {
        self.example_audio.is_some()
    }

    /// Whether a clip is playing
    pub fn is_audio_playing(&self) -> bool {
        self.collaborators.sink.is_playing()
    }

    /// Whether the microphone is capturing
    pub fn is_recording(&self) -> bool {
        self.collaborators.microphone.is_recording()
    }

    /// How the most recent turn ended
    pub fn last_outcome(&self) -> Option<TurnOutcome> {
        self.state.last_outcome()
    }

    /// Current simulated time
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Simulated time since mount
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Number of live timers
    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }

    /// Whether the stage is still mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Run statistics
    pub fn statistics(&self) -> &StageStatistics {
        &self.statistics
    }

    /// The local store
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Pending notifications
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain pending notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ---- clock ----

    /// Advance the virtual clock, firing every timer that comes due on the way
    pub fn advance_by(&mut self, duration: Duration) {
        if !self.mounted {
            return;
        }

        let step = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let target = self.clock.elapsed_ms().saturating_add(step);

        while let Some(fired) = self.timers.pop_due(target) {
            self.clock.advance_to(fired.due_ms);
            if self.handles.is_current(&fired) {
                self.on_timer(fired);
            }
        }

        self.clock.advance_to(target);
        self.statistics.set_simulated_duration(self.clock.elapsed());
    }

    fn on_timer(&mut self, fired: FiredTimer) {
        match fired.kind {
            TimerKind::RantCountdown => self.tick_rant(),
            TimerKind::DemoCountdown => self.tick_demo(),
            TimerKind::AudienceReaction => {
                let demo = self.demo_active();
                let session_id = self.state.session().id.clone();
                if let Some(reaction) = self.audience.next_reaction(&session_id, demo, self.clock.now()) {
                    self.ingest_reaction(reaction, true);
                }
            }
            TimerKind::AudienceRefresh => {
                let demo = self.demo_active();
                self.audience.roll_audience(demo, self.clock.now());
                self.audience.ensure_connected(&self.local_user);
                self.statistics.record_audience_refresh();
            }
        }
    }

    fn tick_rant(&mut self) {
        let Some(left) = self.time_left else {
            self.handles.cancel(TimerKind::RantCountdown);
            return;
        };

        let left = left.saturating_sub(1);
        self.time_left = Some(left);
        if left == 0 {
            self.complete_rant();
        }
    }

    fn tick_demo(&mut self) {
        let Some(left) = self.demo_time_left else {
            self.handles.cancel(TimerKind::DemoCountdown);
            return;
        };

        let left = left.saturating_sub(1);
        self.demo_time_left = Some(left);
        if left == 0 {
            self.finish_demo();
        }
    }

    fn finish_demo(&mut self) {
        self.handles.cancel(TimerKind::DemoCountdown);
        self.demo_time_left = None;
        if self.state.end_demo() {
            self.audience.dismiss_example_speaker();
            self.reschedule_reactions();
            stage_event!(info, "Example demo finished");
        }
    }

    fn reschedule_reactions(&mut self) {
        self.handles.cancel(TimerKind::AudienceReaction);
        let cadence = self.audience.cadence(self.demo_active());
        let handle =
            self.timers
                .schedule_repeating(TimerKind::AudienceReaction, self.clock.elapsed_ms(), cadence.interval_ms);
        debug!(interval_ms = cadence.interval_ms, probability = cadence.probability, "Reaction cadence set");
        self.handles.reaction = Some(handle);
    }

    // ---- reactions ----

    fn ingest_reaction(&mut self, reaction: Reaction, simulated: bool) {
        let emoji = reaction.emoji;
        self.log.push(reaction);
        self.statistics.record_reaction(emoji, simulated);

        let fallback = self.state.session().cringe_level;
        let percentage = self.aggregator.percentage(&self.log, fallback);
        self.state.set_cringe_level(percentage);
        self.statistics.observe_cringe(percentage);
        debug!(%emoji, percentage, simulated, "Reaction received");

        self.check_ejection();
    }

    /// Eject once the meter breaches while the local user's rant is running
    fn check_ejection(&mut self) {
        let percentage = self.state.session().cringe_level;
        if self.rant.is_some() && self.is_local_speaking() && self.aggregator.breaches(percentage) {
            self.eject();
        }
    }

    /// React as the local user
    pub fn send_reaction(&mut self, emoji: Emoji) -> StageResult<()> {
        self.ensure_mounted()?;

        let reaction = Reaction::new(
            self.local_user.id.clone(),
            self.state.session().id.clone(),
            emoji,
            self.clock.now(),
        );
        let demo = self.demo_active();
        self.ingest_reaction(reaction, false);

        if demo {
            let message = match emoji {
                Emoji::Tomato => "Nice tomato throw! 🍅",
                Emoji::Explain => "Good question! The speaker sees this.",
                Emoji::PlusOne => "You're supporting the speaker! 👏",
                Emoji::Cringe => "Ouch! That adds to the cringe meter! 📈",
            };
            self.notify(NotificationLevel::Success, message);
        }
        Ok(())
    }

    // ---- turn lifecycle ----

    /// Put the local user in the speaker queue
    pub fn join_queue(&mut self) -> StageResult<()> {
        self.ensure_mounted()?;

        match self.state.join_queue(&self.local_user.id) {
            Ok(true) => {
                self.notify(NotificationLevel::Success, "Added to speaker queue!");
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("Rejected queue join: {}", e);
                Err(e)
            }
        }
    }

    /// Leave the speaker queue
    pub fn leave_queue(&mut self) -> bool {
        self.state.leave_queue(&self.local_user.id)
    }

    /// Take the stage directly, skipping the queue
    pub fn start_speaking(&mut self) -> StageResult<()> {
        self.ensure_mounted()?;

        let was_demo = self.demo_active();
        let user_id = self.local_user.id.clone();
        match self.state.start_speaking(&user_id, self.clock.now()) {
            Ok(true) => {
                self.on_turn_started(was_demo);
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("Rejected start speaking: {}", e);
                Err(e)
            }
        }
    }

    /// Hand the stage to whoever is first in the queue
    pub fn advance_queue(&mut self) -> StageResult<()> {
        self.ensure_mounted()?;

        let was_demo = self.demo_active();
        match self.state.advance_queue(self.clock.now()) {
            Ok(Some(_)) => {
                self.on_turn_started(was_demo);
                Ok(())
            }
            Ok(None) => {
                debug!("Speaker queue is empty");
                Ok(())
            }
            Err(e) => {
                warn!("Rejected queue advance: {}", e);
                Err(e)
            }
        }
    }

    fn on_turn_started(&mut self, preempted_demo: bool) {
        if preempted_demo {
            self.collaborators.sink.stop();
            self.finish_demo_preempted();
        }

        self.statistics.record_turn_started();
        if self.is_local_speaking() {
            self.notify(NotificationLevel::Success, "You're now the speaker! Choose your rant style below.");
        }
    }

    fn finish_demo_preempted(&mut self) {
        self.handles.cancel(TimerKind::DemoCountdown);
        self.demo_time_left = None;
        self.audience.dismiss_example_speaker();
        self.reschedule_reactions();
        info!("Example demo preempted");
    }

    /// Submit a typed rant; it is read aloud when speech is available
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub fn submit_text_rant(&mut self, text: &str, voice: Option<&'static Voice>) -> StageResult<()> {
        self.ensure_rant_slot()?;
        let text = self.checked_rant_text(text)?;

        let voice = voice.unwrap_or_else(|| random_voice(&mut self.voice_rng));
        let settings = VoiceSettings::random_for_user(&mut self.voice_rng);
        let audio = match self.collaborators.synthesizer.synthesize(text, voice, &settings) {
            Ok(clip) => Some(clip),
            Err(e) => {
                self.statistics.record_synthesis_failure();
                warn!("Speech synthesis failed, continuing text-only: {}", e);
                self.notify(
                    NotificationLevel::Warning,
                    format!("Voice generation unavailable, rant will be shown as text ({})", e.category()),
                );
                None
            }
        };

        let content = RantContent {
            text: Some(text.to_string()),
            audio,
            duration_secs: self.config.estimate_text_duration(text),
        };
        self.begin_rant(content);
        Ok(())
    }

    /// Hear a typed rant before going live
    ///
    /// Plays under the `preview` label and starts no countdown. Returns the
    /// voice used so the same one can be passed to [`Self::submit_text_rant`].
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub fn preview_text_rant(
        &mut self,
        text: &str,
        voice: Option<&'static Voice>,
    ) -> StageResult<&'static Voice> {
        self.ensure_rant_slot()?;
        let text = self.checked_rant_text(text)?;

        let voice = voice.unwrap_or_else(|| random_voice(&mut self.voice_rng));
        let settings = VoiceSettings::random_for_user(&mut self.voice_rng);
        let clip = match self.collaborators.synthesizer.synthesize(text, voice, &settings) {
            Ok(clip) => clip,
            Err(e) => {
                self.statistics.record_synthesis_failure();
                warn!("Preview synthesis failed: {}", e);
                self.notify(NotificationLevel::Warning, format!("Preview unavailable ({})", e.category()));
                return Err(e);
            }
        };

        self.collaborators.sink.stop();
        if let Err(e) = self.collaborators.sink.play("preview", &clip) {
            self.notify(NotificationLevel::Error, "Failed to play audio");
            return Err(e);
        }
        debug!(voice = voice.name, "Previewing rant");
        Ok(voice)
    }

    fn checked_rant_text<'t>(&self, text: &'t str) -> StageResult<&'t str> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StageError::invalid_input("rant text must not be empty"));
        }
        let chars = text.chars().count();
        if chars > self.config.max_rant_chars {
            return Err(StageError::invalid_input(format!(
                "rant is {} characters, the limit is {}",
                chars, self.config.max_rant_chars
            )));
        }
        Ok(text)
    }

    /// Start capturing a voice rant
    pub fn start_recording(&mut self) -> StageResult<()> {
        self.ensure_rant_slot()?;
        if self.collaborators.microphone.is_recording() {
            return Ok(());
        }

        if let Err(e) = self.collaborators.microphone.start() {
            self.statistics.record_recording_failure();
            warn!("Microphone unavailable: {}", e);
            self.notify(NotificationLevel::Warning, format!("Voice recording unavailable: {}", e));
            return Err(e);
        }

        self.notify(NotificationLevel::Success, "🎙️ Recording...");
        Ok(())
    }

    /// Stop capturing and submit the recording
    pub fn finish_recording(&mut self) -> StageResult<()> {
        self.ensure_rant_slot()?;

        let clip = match self.collaborators.microphone.stop() {
            Ok(clip) => clip,
            Err(e) => {
                self.statistics.record_recording_failure();
                self.notify(NotificationLevel::Error, format!("Recording failed: {}", e));
                return Err(e);
            }
        };

        let content = RantContent {
            text: None,
            audio: Some(clip),
            duration_secs: self.config.rant_duration_secs,
        };
        self.begin_rant(content);
        Ok(())
    }

    fn ensure_rant_slot(&self) -> StageResult<()> {
        self.ensure_mounted()?;
        if !self.is_local_speaking() {
            return Err(StageError::invalid_transition(self.state.phase(), "only the speaker can rant"));
        }
        if self.rant.is_some() {
            return Err(StageError::invalid_transition(self.state.phase(), "a rant is already running"));
        }
        Ok(())
    }

    fn begin_rant(&mut self, content: RantContent) {
        self.time_left = Some(self.config.rant_duration_secs);
        let handle = self.timers.schedule_repeating(TimerKind::RantCountdown, self.clock.elapsed_ms(), TICK_MS);
        self.handles.rant = Some(handle);
        self.statistics.record_rant_submitted();
        self.collaborators.sink.stop();

        let message = match &content.audio {
            Some(clip) => match self.collaborators.sink.play("rant", clip) {
                Ok(()) => "🎤 You're live! Audio playing for everyone!".to_string(),
                Err(e) => {
                    warn!("Playback failed: {}", e);
                    self.notify(NotificationLevel::Error, "Failed to play audio");
                    format!("🎤 You're live! {} seconds on the clock!", self.config.rant_duration_secs)
                }
            },
            None => format!("🎤 You're live! {} seconds on the clock!", self.config.rant_duration_secs),
        };

        stage_event!(
            info,
            "Rant started",
            voice = content.audio.is_some(),
            estimated_secs = content.duration_secs,
        );
        self.rant = Some(content);
        self.notify(NotificationLevel::Success, message);

        // cringe gathered while choosing counts once the rant is live
        self.check_ejection();
    }

    fn end_rant(&mut self) {
        self.handles.cancel(TimerKind::RantCountdown);
        self.time_left = None;
        self.rant = None;
        self.collaborators.sink.stop();
        self.collaborators.microphone.release();
    }

    fn eject(&mut self) {
        if !self.state.eject() {
            return;
        }

        self.end_rant();
        self.statistics.record_turn_outcome(TurnOutcome::Ejected);
        stage_event!(warn, "Speaker ejected", cringe = self.aggregator.threshold());
        self.notify(NotificationLevel::Error, "💥 EJECTED! The cringe meter hit 100%!");
    }

    fn complete_rant(&mut self) {
        if !self.state.complete() {
            self.end_rant();
            return;
        }

        self.end_rant();
        self.statistics.record_turn_outcome(TurnOutcome::Completed);
        stage_event!(info, "Rant completed");
        self.notify(
            NotificationLevel::Success,
            format!("🎉 Rant complete! You survived the full {} seconds!", self.config.rant_duration_secs),
        );
    }

    /// Step down, or clear an ejection; no-op when not speaking
    pub fn stop(&mut self) -> StageResult<()> {
        self.ensure_mounted()?;

        match self.state.phase() {
            StagePhase::UserSpeaking if self.is_local_speaking() => {
                self.state.stop();
                self.end_rant();
                self.statistics.record_turn_outcome(TurnOutcome::Stopped);
                self.notify(NotificationLevel::Success, "Rant ended!");
            }
            StagePhase::Ejected | StagePhase::Completed => {
                self.state.acknowledge();
            }
            _ => debug!("Stop ignored, local user is not speaking"),
        }
        Ok(())
    }

    /// Return to the open stage after an ejection
    pub fn acknowledge_ejection(&mut self) -> bool {
        self.state.acknowledge()
    }

    // ---- example audio ----

    fn prepare_example_audio(&mut self) -> bool {
        if self.example_audio.is_some() {
            return true;
        }
        if !self.collaborators.synthesizer.is_configured() {
            debug!("Speech provider not configured, example audio skipped");
            return false;
        }

        let settings = VoiceSettings::random_for_example(&mut self.voice_rng);
        match self.collaborators.synthesizer.synthesize(EXAMPLE_RANT_TEXT, self.example_voice, &settings) {
            Ok(clip) => {
                info!("Example audio ready in {} voice", self.example_voice.name);
                self.example_audio = Some(clip);
                true
            }
            Err(e) => {
                self.statistics.record_synthesis_failure();
                warn!("Failed to generate example audio: {}", e);
                false
            }
        }
    }

    /// Play the example rant, generating it first if needed
    pub fn play_example_audio(&mut self) -> StageResult<()> {
        self.ensure_mounted()?;

        if !self.prepare_example_audio() {
            self.notify(NotificationLevel::Warning, "Example audio is unavailable");
            return Err(StageError::configuration_error("example audio could not be generated"));
        }

        if let Some(clip) = &self.example_audio {
            if let Err(e) = self.collaborators.sink.play("example", clip) {
                self.notify(NotificationLevel::Error, "Click to enable audio playback");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stop whatever is playing
    pub fn stop_audio(&mut self) {
        self.collaborators.sink.stop();
    }

    // ---- teardown ----

    /// Cancel every timer, silence audio and release the microphone
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }

        self.timers.cancel_all();
        self.handles = StageTimers::default();
        self.collaborators.sink.stop();
        self.collaborators.microphone.release();
        self.state.deactivate();
        self.mounted = false;
        stage_event!(info, "Stage unmounted", elapsed_ms = self.clock.elapsed_ms());
    }

    fn ensure_mounted(&self) -> StageResult<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(StageError::invalid_transition(self.state.phase(), "stage is unmounted"))
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification::new(level, message, self.clock.now());
        debug!("Notification: {}", notification);
        self.notifications.push(notification);
    }
}

impl Drop for StageController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::Utc;

    fn quiet_config() -> StageConfig {
        StageConfig { seed: Some(11), reaction_probability: 0.0, demo_reaction_probability: 0.0, ..Default::default() }
    }

    fn seen_store() -> LocalStore {
        let mut store = LocalStore::in_memory();
        store.mark_example_seen().unwrap();
        store
    }

    fn local() -> User {
        User::with_id(UserId::from_raw("u1"), "RantMaster", Utc::now())
    }

    fn mount_seen() -> StageController {
        StageController::mount(quiet_config(), local(), seen_store(), StageCollaborators::headless()).unwrap()
    }

    #[test]
    fn test_mount_without_seen_flag_starts_demo() {
        let stage =
            StageController::mount(quiet_config(), local(), LocalStore::in_memory(), StageCollaborators::headless())
                .unwrap();

        assert_eq!(stage.phase(), StagePhase::ExampleDemo);
        assert!(stage.session().current_speaker.as_ref().is_some_and(|id| id.is_example_speaker()));
        assert_eq!(stage.demo_time_left(), Some(45));
        assert!(stage.store().has_seen_example());
        assert!(!stage.stage_open());
    }

    #[test]
    fn test_mount_with_seen_flag_is_idle() {
        let stage = mount_seen();
        assert!(stage.stage_open());
        assert_eq!(stage.demo_time_left(), None);
        assert!(stage.connected_users().iter().any(|u| u.id == stage.local_user().id));
    }

    #[test]
    fn test_rant_rejected_before_taking_stage() {
        let mut stage = mount_seen();
        assert!(matches!(
            stage.submit_text_rant("hello", None),
            Err(StageError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_text_rant_degrades_without_speech() {
        let mut stage = mount_seen();
        stage.start_speaking().unwrap();
        stage.submit_text_rant("Pineapple belongs on pizza", None).unwrap();

        let rant = stage.current_rant().unwrap();
        assert!(rant.audio.is_none());
        assert_eq!(rant.duration_secs, 3);
        assert_eq!(stage.time_left(), Some(60));
        assert_eq!(stage.statistics().synthesis_failures, 1);
        assert!(stage
            .notifications()
            .iter()
            .any(|n| n.level == NotificationLevel::Warning));
    }

    #[test]
    fn test_rant_text_limits() {
        let mut stage = mount_seen();
        stage.start_speaking().unwrap();

        assert!(matches!(stage.submit_text_rant("   ", None), Err(StageError::InvalidInput(_))));
        let long = "x".repeat(1001);
        assert!(matches!(stage.submit_text_rant(&long, None), Err(StageError::InvalidInput(_))));
        assert!(stage.current_rant().is_none());
    }

    #[test]
    fn test_denied_microphone_leaves_text_mode_working() {
        let mut stage = mount_seen();
        stage.start_speaking().unwrap();

        let err = stage.start_recording().unwrap_err();
        assert!(matches!(err, StageError::PermissionError(_)));
        assert!(stage.submit_text_rant("Still here", None).is_ok());
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut stage = StageController::mount(
            quiet_config(),
            local(),
            LocalStore::in_memory(),
            StageCollaborators::headless(),
        )
        .unwrap();
        assert!(stage.active_timers() >= 3);

        stage.teardown();
        assert_eq!(stage.active_timers(), 0);
        assert!(!stage.is_mounted());
        assert!(!stage.session().active);
        assert!(stage.join_queue().is_err());

        // advancing an unmounted stage does nothing
        stage.advance_by(Duration::from_secs(60));
        assert_eq!(stage.elapsed(), Duration::ZERO);
    }
}
