#![forbid(unsafe_code)]

//! Core: touch samples, path geometry, gesture classification, and intents.
//!
//! # Role in TouchLang
//! `touchlang-core` is the input layer. It turns raw touch frames into a
//! single [`gesture::GestureClassification`] per completed sequence and maps
//! that classification to a context-dependent intent and response.
//!
//! # Primary responsibilities
//! - **Event**: touch frames, contacts, samples, and pressure buckets.
//! - **PathRecorder**: the samples of the active sequence plus a short trail.
//! - **Geometry**: displacement, angle, velocity, and rotation.
//! - **GestureClassifier**: ordered discrimination rules and tap memory.
//! - **Intent tables**: labels, canned responses, and service prompts.
//!
//! # How it fits in the system
//! The runtime (`touchlang-runtime`) owns a classifier, feeds it frames, and
//! drives the interaction state machine, haptics, preferences, and response
//! resolution from its output. Nothing in this crate performs I/O.

pub mod context;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod intent;
pub mod path;

pub use context::Context;
pub use event::{Contact, Pressure, Sample, TouchFrame, TouchPhase, TouchStart};
pub use gesture::{
    GestureClassification, GestureClassifier, GestureConfig, GestureKind, SwipeDirection,
    SwipeSpeed,
};
pub use intent::{Emotion, ResponsePayload, intent_prompt, resolve_intent, resolve_response};
pub use path::PathRecorder;
