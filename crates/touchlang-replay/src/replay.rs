#![forbid(unsafe_code)]

//! Drive a [`Session`] from a parsed trace on a virtual clock.
//!
//! Frame and action timestamps are taken as given. Each response resolves on
//! a [`ResponseWorker`] and is applied `latency` after it was issued, in
//! issue order. Timers fire at their deadlines between trace lines, and a
//! final drain runs until no timer or response is outstanding.
//!
//! # Invariants
//!
//! - Events are applied in nondecreasing virtual time. At equal times, timers
//!   fire before completions, and both come before the trace line.
//! - Completions are applied in the order requests were issued.

use std::collections::VecDeque;
use std::path::PathBuf;

use serde::Serialize;
use touchlang_core::Context;
use touchlang_runtime::preferences::GestureStyle;
use touchlang_runtime::{
    FileStore, HapticSink, InteractionState, LocalResponder, MemoryStore, Message,
    PreferenceStore, RecordingHaptics, ResponseRequest, ResponseTicket, ResponseWorker,
    ServiceError, Session, SessionConfig, TouchPolicy,
};
use web_time::{Duration, Instant};

use crate::error::{ReplayError, Result};
use crate::trace::{TraceAction, TraceLine};

/// How long to wait on the worker beyond the configured latency.
const WORKER_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOptions {
    pub context: Context,
    pub policy: Option<PathBuf>,
    pub prefs: Option<PathBuf>,
    /// Virtual delay between issuing a request and applying its reply.
    pub latency: Duration,
    /// Make the responder block for `latency` in wall-clock time too.
    pub realtime: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            context: Context::General,
            policy: None,
            prefs: None,
            latency: Duration::from_millis(800),
            realtime: false,
        }
    }
}

/// What the session looked like after the trace ran out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub messages: Vec<Message>,
    pub state: InteractionState,
    pub context: Context,
    pub gesture_style: GestureStyle,
    pub recognized: usize,
    pub haptics: Vec<Vec<u32>>,
}

impl Transcript {
    /// One line per message, then a status line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            match message {
                Message::Gesture(record) => {
                    out.push_str(&format!(
                        "user    {} -> {}\n",
                        record.classification.kind, record.label
                    ));
                }
                Message::Ai {
                    text,
                    emotion,
                    options,
                } => {
                    out.push_str(&format!("ai      [{emotion}] {text}\n"));
                    if !options.is_empty() {
                        out.push_str(&format!("        options: {}\n", options.join(" | ")));
                    }
                }
                Message::System { text } => {
                    out.push_str(&format!("system  {text}\n"));
                }
            }
        }
        out.push_str(&format!(
            "-- state={} context={} style={} recognized={}\n",
            self.state.as_str(),
            self.context,
            self.gesture_style.as_str(),
            self.recognized
        ));
        out
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

struct InFlight {
    ticket: ResponseTicket,
    due: Instant,
}

struct Replay {
    session: Session,
    worker: ResponseWorker,
    in_flight: VecDeque<InFlight>,
    latency: Duration,
    wait: Duration,
}

impl Replay {
    fn submit(&mut self, request: ResponseRequest, now: Instant) -> Result<()> {
        let ticket = request.ticket;
        self.worker.submit(request)?;
        self.in_flight.push_back(InFlight {
            ticket,
            due: now + self.latency,
        });
        Ok(())
    }

    /// Earliest pending event at or before `limit`; timers win ties.
    fn next_event(&self, limit: Option<Instant>) -> Option<(Instant, bool)> {
        let timer = self.session.next_deadline();
        let reply = self.in_flight.front().map(|f| f.due);
        let next = match (timer, reply) {
            (Some(t), Some(r)) if r < t => Some((r, false)),
            (Some(t), _) => Some((t, true)),
            (None, Some(r)) => Some((r, false)),
            (None, None) => None,
        };
        match (next, limit) {
            (Some((at, _)), Some(limit)) if at > limit => None,
            _ => next,
        }
    }

    /// Apply everything due up to `limit`, or everything at all if `None`.
    fn advance(&mut self, limit: Option<Instant>) -> Result<()> {
        while let Some((at, is_timer)) = self.next_event(limit) {
            if is_timer {
                if let Some(request) = self.session.tick(at) {
                    self.submit(request, at)?;
                }
                continue;
            }
            let Some(flight) = self.in_flight.pop_front() else {
                break;
            };
            let completion = self
                .worker
                .recv_timeout(self.wait)
                .ok_or(ServiceError::Disconnected)?;
            if completion.ticket != flight.ticket {
                return Err(ReplayError::invalid(format!(
                    "worker answered {} while {} was expected",
                    completion.ticket, flight.ticket
                )));
            }
            self.session.complete_response(completion, flight.due);
        }
        Ok(())
    }

    fn line(&mut self, line: &TraceLine, t0: Instant) -> Result<()> {
        let now = t0 + Duration::from_millis(line.t_ms());
        self.advance(Some(now))?;
        match line {
            TraceLine::Frame(frame) => {
                if let Some(request) = self.session.handle_frame(&frame.to_frame(t0)) {
                    self.submit(request, now)?;
                }
            }
            TraceLine::Action(TraceAction::Context { context, .. }) => {
                self.session.switch_context(*context);
            }
            TraceLine::Action(TraceAction::Clear { .. }) => {
                self.session.clear_conversation();
            }
        }
        Ok(())
    }
}

fn session_config(options: &ReplayOptions) -> Result<SessionConfig> {
    match &options.policy {
        Some(path) => Ok(TouchPolicy::load(path)?.to_session_config()),
        None => Ok(SessionConfig::default()),
    }
}

/// Run `lines` through a fresh session and return the final transcript.
pub fn replay(lines: &[TraceLine], options: &ReplayOptions) -> Result<Transcript> {
    let config = session_config(options)?;
    let haptics = RecordingHaptics::new();
    let store: Box<dyn PreferenceStore> = match &options.prefs {
        Some(path) => Box::new(FileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };
    let sink: Box<dyn HapticSink> = Box::new(haptics.clone());
    let mut session = Session::new(config, sink, store);
    if options.context != session.context() {
        session.switch_context(options.context);
    }

    let responder = if options.realtime {
        LocalResponder::with_delay(options.latency)
    } else {
        LocalResponder::new()
    };
    let mut replay = Replay {
        session,
        worker: ResponseWorker::spawn(responder),
        in_flight: VecDeque::new(),
        latency: options.latency,
        wait: options.latency + WORKER_GRACE,
    };

    let t0 = Instant::now();
    for line in lines {
        replay.line(line, t0)?;
    }
    replay.advance(None)?;

    tracing::debug!(
        target: "touchlang.session",
        lines = lines.len(),
        messages = replay.session.messages().len(),
        "replay finished"
    );

    let session = &replay.session;
    Ok(Transcript {
        messages: session.messages().to_vec(),
        state: session.state(),
        context: session.context(),
        gesture_style: session.preferences().gesture_style,
        recognized: session.intents().len(),
        haptics: haptics.patterns(),
    })
}
