#![forbid(unsafe_code)]

//! The session controller.
//!
//! [`Session`] owns every piece of mutable interaction state: the active
//! path, the classifier's tap memory, the current context, the interaction
//! state machine, timers, usage preferences, the transcript, and the
//! conversation sent to the response service. All mutation goes through
//! `&mut Session`; nothing here spawns threads or sleeps.
//!
//! # Pipeline
//!
//! ```text
//! TouchFrame ─▶ PathRecorder ─▶ GestureClassifier ─▶ intent tables
//!                                                    │
//!        ┌──────────────┬──────────────┬─────────────┼──────────────┐
//!        ▼              ▼              ▼             ▼              ▼
//!   state machine   preferences     haptics      transcript   ResponseRequest
//! ```
//!
//! # Driving a session
//!
//! ```rust,ignore
//! let mut session = Session::with_defaults();
//! for frame in frames {
//!     if let Some(req) = session.tick(frame.at) { resolve(req) }
//!     if let Some(req) = session.handle_frame(&frame) { resolve(req) }
//! }
//! // later
//! session.complete_response(completion, now);
//! ```
//!
//! # Invariants
//!
//! 1. At most one touch sequence is active; a start frame replaces it.
//! 2. A completion is applied at most once, and only if its ticket was
//!    issued in the current conversation generation.
//! 3. Failed resolutions never touch the conversation history.

use std::fmt;

use serde::{Deserialize, Serialize};
use touchlang_core::context::Context;
use touchlang_core::event::{Pressure, Sample, TouchFrame, TouchPhase, TouchStart};
use touchlang_core::gesture::{GestureClassification, GestureClassifier, GestureConfig};
use touchlang_core::intent::{Emotion, intent_prompt, resolve_intent};
use touchlang_core::path::{DEFAULT_TRAIL_CAPACITY, PathRecorder};
use web_time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::haptics::{HapticCue, HapticIntensity, HapticSink, Haptics, NullHaptics};
use crate::preferences::{
    HistoryEntry, HistoryLimits, MemoryStore, PreferenceStore, UserPreferences, load_or_default,
};
use crate::response::{
    ConversationTurn, FALLBACK_REPLY, ResponseCompletion, ResponseRequest, ResponseTicket,
};
use crate::state::{InteractionState, StateEvent, StateMachine};
use crate::timers::{TimerKey, TimerSet};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub gesture: GestureConfig,
    /// Delay from `confirming` back to `ready` (default: 500ms).
    pub settle_delay: Duration,
    /// Inactivity after which the combo clears (default: 2000ms).
    pub combo_window: Duration,
    /// Points kept in the visual trail (default: 20).
    pub trail_capacity: usize,
    pub history: HistoryLimits,
    /// When false the sink never receives a pattern.
    pub haptics_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            settle_delay: Duration::from_millis(500),
            combo_window: Duration::from_millis(2000),
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
            history: HistoryLimits::default(),
            haptics_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// A recognized gesture and what it meant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub classification: GestureClassification,
    pub context: Context,
    pub label: String,
    /// Wall-clock milliseconds since the Unix epoch.
    pub at: u64,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// The user's gesture.
    #[serde(rename = "user")]
    Gesture(IntentRecord),
    /// A reply, or the fallback apology.
    Ai {
        text: String,
        emotion: Emotion,
        options: Vec<String>,
    },
    System { text: String },
}

impl Message {
    /// Display text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Gesture(record) => &record.label,
            Self::Ai { text, .. } | Self::System { text } => text,
        }
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PendingRequest {
    ticket: ResponseTicket,
    prompt: String,
}

pub struct Session {
    config: SessionConfig,
    classifier: GestureClassifier,
    recorder: PathRecorder,
    touch_start: Option<TouchStart>,
    state: StateMachine,
    timers: TimerSet,
    context: Context,
    prefs: UserPreferences,
    store: Box<dyn PreferenceStore>,
    haptics: Haptics,
    messages: Vec<Message>,
    conversation: Vec<ConversationTurn>,
    intents: Vec<IntentRecord>,
    last_gesture: Option<IntentRecord>,
    combo: Vec<GestureClassification>,
    generation: u64,
    next_ticket: u64,
    pending: Vec<PendingRequest>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state.state())
            .field("context", &self.context)
            .field("messages", &self.messages.len())
            .field("generation", &self.generation)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session, loading preferences from `store`.
    pub fn new(
        config: SessionConfig,
        sink: Box<dyn HapticSink>,
        store: Box<dyn PreferenceStore>,
    ) -> Self {
        let prefs = load_or_default(store.as_ref());
        let intensity = if config.haptics_enabled {
            prefs.haptic_intensity
        } else {
            HapticIntensity::Off
        };
        Self {
            classifier: GestureClassifier::new(config.gesture.clone()),
            recorder: PathRecorder::new(config.trail_capacity),
            touch_start: None,
            state: StateMachine::new(),
            timers: TimerSet::new(),
            context: Context::default(),
            prefs,
            store,
            haptics: Haptics::new(sink, intensity),
            messages: Vec::new(),
            conversation: Vec::new(),
            intents: Vec::new(),
            last_gesture: None,
            combo: Vec::new(),
            generation: 0,
            next_ticket: 0,
            pending: Vec::new(),
            config,
        }
    }

    /// Default configuration, no haptics, in-memory preferences.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            SessionConfig::default(),
            Box::new(NullHaptics),
            Box::new(MemoryStore::new()),
        )
    }

    // --- Touch input -------------------------------------------------------

    /// Feed one touch frame.
    ///
    /// Returns a request when the frame completes a recognized gesture.
    pub fn handle_frame(&mut self, frame: &TouchFrame) -> Option<ResponseRequest> {
        match frame.phase {
            TouchPhase::Start => {
                self.touch_started(frame);
                None
            }
            TouchPhase::Move => {
                self.touch_moved(frame);
                None
            }
            TouchPhase::End => self.touch_ended(frame),
        }
    }

    fn touch_started(&mut self, frame: &TouchFrame) {
        let Some(contact) = frame.primary() else {
            return;
        };
        let start = TouchStart::from_contact(contact, frame.at);
        self.recorder.begin(start.sample);
        self.classifier.begin(start, frame.finger_count());
        self.touch_start = Some(start);
        self.timers.arm(
            TimerKey::LongPress,
            frame.at + self.config.gesture.long_press_threshold,
        );
        self.timers.cancel(TimerKey::Settle);
        self.state.apply(StateEvent::TouchStarted);
        self.haptics.play(HapticCue::Light);
        tracing::trace!(
            target: "touchlang.session",
            x = start.sample.x,
            y = start.sample.y,
            fingers = frame.finger_count(),
            "touch started"
        );
    }

    fn touch_moved(&mut self, frame: &TouchFrame) {
        if self.touch_start.is_none() {
            return;
        }
        let Some(contact) = frame.primary() else {
            return;
        };
        let sample = contact.sample(frame.at);
        self.recorder.append(sample);
        if self.classifier.track(&sample, frame.finger_count()) {
            self.timers.cancel(TimerKey::LongPress);
        }
    }

    fn touch_ended(&mut self, frame: &TouchFrame) -> Option<ResponseRequest> {
        self.touch_start.take()?;
        self.timers.cancel(TimerKey::LongPress);

        let (end, pressure) = match frame.primary() {
            Some(contact) => (contact.sample(frame.at), contact.pressure()),
            None => {
                let last = self.recorder.trailing_window(1).first().copied()?;
                (Sample::new(last.x, last.y, frame.at), Pressure::default())
            }
        };
        self.recorder.append(end);
        let path = self.recorder.end();

        let classification = self
            .classifier
            .finish(&path, pressure, frame.finger_count())?;
        if classification.is_unknown() {
            self.state.apply(StateEvent::Unrecognized);
            tracing::debug!(
                target: "touchlang.session",
                samples = path.len(),
                "touch sequence not recognized"
            );
            return None;
        }
        self.haptics.play(HapticCue::Medium);
        Some(self.dispatch(classification, frame.at))
    }

    /// Fire every timer due at `now`.
    ///
    /// Returns a request when the long-press timer fires.
    pub fn tick(&mut self, now: Instant) -> Option<ResponseRequest> {
        let mut request = None;
        for key in self.timers.take_due(now) {
            match key {
                TimerKey::LongPress => {
                    if let Some(c) = self
                        .classifier
                        .check_long_press(now, self.recorder.samples())
                    {
                        self.haptics.play(HapticCue::Heavy);
                        request = Some(self.dispatch(c, now));
                    }
                }
                TimerKey::Settle => {
                    self.state.apply(StateEvent::Settled);
                }
                TimerKey::ComboClear => {
                    tracing::trace!(
                        target: "touchlang.session",
                        gestures = self.combo.len(),
                        "combo window elapsed"
                    );
                    self.combo.clear();
                }
            }
        }
        request
    }

    /// Earliest moment [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn dispatch(&mut self, classification: GestureClassification, now: Instant) -> ResponseRequest {
        let label = resolve_intent(&classification.kind, self.context);
        let at = wall_clock_ms();
        let record = IntentRecord {
            classification,
            context: self.context,
            label: label.to_string(),
            at,
        };
        tracing::debug!(
            target: "touchlang.session",
            kind = %classification.kind,
            context = %self.context,
            intent = label,
            "gesture recognized"
        );

        self.combo.push(classification);
        self.timers
            .arm(TimerKey::ComboClear, now + self.config.combo_window);

        self.config.history.record(
            &mut self.prefs,
            HistoryEntry::new(classification.kind, self.context, at),
        );
        self.persist_preferences();

        self.state.apply(StateEvent::Recognized);
        self.last_gesture = Some(record.clone());
        self.intents.push(record.clone());
        self.messages.push(Message::Gesture(record));

        let ticket = ResponseTicket {
            id: self.next_ticket,
            generation: self.generation,
        };
        self.next_ticket += 1;
        let prompt = intent_prompt(&classification, self.context, label);
        self.pending.push(PendingRequest {
            ticket,
            prompt: prompt.clone(),
        });

        self.state.apply(StateEvent::Dispatched);
        self.haptics.play(HapticCue::Thinking);

        ResponseRequest {
            ticket,
            classification,
            context: self.context,
            intent: label.to_string(),
            prompt,
            history: self.conversation.clone(),
        }
    }

    // --- Responses ---------------------------------------------------------

    /// Apply a resolution. Returns `false` if it was stale and dropped.
    pub fn complete_response(&mut self, completion: ResponseCompletion, now: Instant) -> bool {
        let ticket = completion.ticket;
        let position = (ticket.generation == self.generation)
            .then(|| self.pending.iter().position(|p| p.ticket == ticket))
            .flatten();
        let Some(index) = position else {
            tracing::debug!(
                target: "touchlang.response",
                ticket = %ticket,
                generation = self.generation,
                "stale completion discarded"
            );
            return false;
        };
        let pending = self.pending.remove(index);

        match completion.result {
            Ok(reply) => {
                tracing::debug!(
                    target: "touchlang.response",
                    ticket = %ticket,
                    emotion = %reply.emotion,
                    "reply received"
                );
                self.conversation.push(ConversationTurn::user(pending.prompt));
                self.conversation
                    .push(ConversationTurn::assistant(reply.text.clone()));
                self.haptics.play(HapticCue::for_reply(reply.emotion));
                self.messages.push(Message::Ai {
                    text: reply.text,
                    emotion: reply.emotion,
                    options: reply.options,
                });
                if self.state.apply(StateEvent::Resolved) {
                    self.timers
                        .arm(TimerKey::Settle, now + self.config.settle_delay);
                }
            }
            Err(err) => {
                tracing::warn!(
                    target: "touchlang.response",
                    ticket = %ticket,
                    error = %err,
                    "response service failed"
                );
                self.messages.push(Message::Ai {
                    text: FALLBACK_REPLY.to_string(),
                    emotion: Emotion::Neutral,
                    options: Vec::new(),
                });
                self.haptics.play(HapticCue::Error);
                self.state.apply(StateEvent::Failed);
            }
        }
        true
    }

    // --- User actions ------------------------------------------------------

    pub fn switch_context(&mut self, context: Context) {
        let from = self.context;
        self.context = context;
        self.messages.push(Message::System {
            text: format!("Context switched to {context} mode"),
        });
        self.haptics.play(HapticCue::Success);
        tracing::info!(
            target: "touchlang.session",
            from = %from,
            to = %context,
            "context switched"
        );
    }

    /// Clear the transcript and conversation and drop in-flight requests.
    pub fn clear_conversation(&mut self) {
        self.messages.clear();
        self.conversation.clear();
        self.last_gesture = None;
        self.combo.clear();
        self.timers.cancel(TimerKey::ComboClear);
        self.timers.cancel(TimerKey::Settle);
        let dropped = self.pending.len();
        self.pending.clear();
        self.generation += 1;
        self.state.apply(StateEvent::Cleared);
        self.haptics.play(HapticCue::Success);
        tracing::info!(
            target: "touchlang.session",
            generation = self.generation,
            dropped,
            "conversation cleared"
        );
    }

    /// Change and persist the haptic intensity preference.
    pub fn set_haptic_intensity(&mut self, intensity: HapticIntensity) {
        self.prefs.haptic_intensity = intensity;
        if self.config.haptics_enabled {
            self.haptics.set_intensity(intensity);
        }
        self.persist_preferences();
    }

    /// Send a raw vibration pattern to the sink, subject to intensity.
    pub fn vibrate_raw(&mut self, pattern: &[u32]) {
        self.haptics.play_raw(pattern);
    }

    fn persist_preferences(&mut self) {
        if let Err(err) = self.store.save(&self.prefs) {
            tracing::warn!(
                target: "touchlang.prefs",
                error = %err,
                "failed to save preferences"
            );
        }
    }

    // --- Accessors ---------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state.state()
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> Context {
        self.context
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    /// Every gesture recognized this session, including before clears.
    #[must_use]
    pub fn intents(&self) -> &[IntentRecord] {
        &self.intents
    }

    #[must_use]
    pub fn last_gesture(&self) -> Option<&IntentRecord> {
        self.last_gesture.as_ref()
    }

    /// Gestures within the current inactivity window.
    #[must_use]
    pub fn combo(&self) -> &[GestureClassification] {
        &self.combo
    }

    #[must_use]
    pub fn preferences(&self) -> &UserPreferences {
        &self.prefs
    }

    /// The current conversation generation.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tickets issued but not yet completed.
    pub fn pending_tickets(&self) -> impl Iterator<Item = ResponseTicket> + '_ {
        self.pending.iter().map(|p| p.ticket)
    }

    /// Whether a touch sequence is in progress.
    #[inline]
    #[must_use]
    pub fn is_touching(&self) -> bool {
        self.touch_start.is_some()
    }

    /// The visual trail of the active sequence, oldest point first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.recorder.trail()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
