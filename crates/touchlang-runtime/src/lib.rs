#![forbid(unsafe_code)]

//! Runtime: the session controller and everything it drives.
//!
//! # Role in TouchLang
//! `touchlang-runtime` wires the classifier from `touchlang-core` to the
//! outside world. A [`Session`] consumes touch frames and timer ticks and
//! produces [`ResponseRequest`]s, transcript [`Message`]s, haptic cues, and
//! persisted usage history.
//!
//! # Key components
//! - **Session**: owns all mutable interaction state.
//! - **StateMachine**: ready → listening → interpreting → responding →
//!   confirming → ready.
//! - **TimerSet**: keyed deadlines for long press, settle, and combo clear.
//! - **Haptics**: named cues scaled by user intensity.
//! - **Preferences**: usage history, derived style, and stores.
//! - **ResponseWorker**: resolves requests on a background thread.
//! - **TouchPolicy**: every threshold as loadable data.

pub mod config;
pub mod error;
pub mod haptics;
pub mod preferences;
pub mod response;
pub mod session;
pub mod state;
pub mod timers;

pub use config::TouchPolicy;
pub use error::{ConfigError, ServiceError, StoreError};
pub use haptics::{HapticCue, HapticIntensity, HapticSink, NullHaptics, RecordingHaptics};
pub use preferences::{FileStore, MemoryStore, PreferenceStore, UserPreferences};
pub use response::{
    LocalResponder, ResponseCompletion, ResponseReply, ResponseRequest, ResponseService,
    ResponseTicket, ResponseWorker,
};
pub use session::{IntentRecord, Message, Session, SessionConfig};
pub use state::InteractionState;
pub use timers::{TimerKey, TimerSet};
