#![forbid(unsafe_code)]

//! Interaction state machine.
//!
//! ```text
//!            touch start (from any state)
//!   ready ──────────────────────────────▶ listening
//!     ▲                                      │ recognized
//!     │ settled / failed / unrecognized      ▼
//!     │                                 interpreting
//!     │                                      │ dispatched
//!     │                                      ▼
//!   confirming ◀──────── resolved ──────  responding
//! ```
//!
//! # Invariants
//!
//! 1. Every state has a path back to `ready` that needs no user input
//!    beyond time passing or the response resolving.
//! 2. Events that do not apply in the current state leave it unchanged.
//! 3. Clearing the conversation while work is in flight returns to `ready`;
//!    clearing while idle or while a finger is down changes nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the session is in the gesture → response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionState {
    /// Idle, waiting for a touch.
    #[default]
    Ready,
    /// A finger is down.
    Listening,
    /// A gesture was recognized and is being resolved to an intent.
    Interpreting,
    /// Waiting on the response service.
    Responding,
    /// A reply arrived; waiting out the settle delay.
    Confirming,
}

impl InteractionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Listening => "listening",
            Self::Interpreting => "interpreting",
            Self::Responding => "responding",
            Self::Confirming => "confirming",
        }
    }

    /// Whether a gesture is being worked on past the touch itself.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Interpreting | Self::Responding | Self::Confirming)
    }

    /// The state after `event`.
    #[must_use]
    pub const fn on(self, event: StateEvent) -> Self {
        use StateEvent as E;
        match (self, event) {
            (_, E::TouchStarted) => Self::Listening,
            (_, E::Recognized) => Self::Interpreting,
            (_, E::Unrecognized) => Self::Ready,
            (Self::Interpreting, E::Dispatched) => Self::Responding,
            (Self::Responding, E::Resolved) => Self::Confirming,
            (Self::Responding, E::Failed) => Self::Ready,
            (Self::Confirming, E::Settled) => Self::Ready,
            (s, E::Cleared) if s.is_busy() => Self::Ready,
            (s, _) => s,
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    TouchStarted,
    Recognized,
    Unrecognized,
    Dispatched,
    Resolved,
    Failed,
    Settled,
    Cleared,
}

/// The current [`InteractionState`] plus transition bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: InteractionState,
    transitions: u64,
}

impl StateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Number of state changes so far.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Apply `event`. Returns `true` if the state changed.
    pub fn apply(&mut self, event: StateEvent) -> bool {
        let from = self.state;
        let to = from.on(event);
        if from == to {
            return false;
        }
        self.state = to;
        self.transitions += 1;
        tracing::debug!(
            target: "touchlang.state",
            from = from.as_str(),
            to = to.as_str(),
            event = ?event,
            "interaction state changed"
        );
        true
    }
}
