#![forbid(unsafe_code)]

//! Canonical touch input types.
//!
//! A touch surface delivers [`TouchFrame`]s: one per start/move/end event,
//! each carrying the set of contacts involved and a monotonic timestamp.
//! The recognizer reduces contacts to [`Sample`]s (position + time) and
//! buckets the optional force reading into a [`Pressure`] level.
//!
//! # Design Notes
//!
//! - Screen coordinates: origin at top-left, Y increases downward.
//! - For [`TouchPhase::End`], `contacts` holds the contacts that lifted,
//!   so `contacts.len()` is the finger count of the completed gesture.
//! - A `force` of `None` means the surface does not report pressure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// A single timestamped position on the active touch path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Horizontal position in surface units.
    pub x: f64,
    /// Vertical position in surface units (down is positive).
    pub y: f64,
    /// Monotonic capture time.
    pub t: Instant,
}

impl Sample {
    /// Create a new sample.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, t: Instant) -> Self {
        Self { x, y, t }
    }

    /// Euclidean distance to another sample.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Sample) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One contact point reported by the touch surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Surface-assigned identifier, stable for the lifetime of the contact.
    pub id: u32,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Normalized force in `[0, 1]`, if the surface reports one.
    #[serde(default)]
    pub force: Option<f64>,
}

impl Contact {
    /// Create a contact without a force reading.
    #[must_use]
    pub const fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            force: None,
        }
    }

    /// Attach a force reading.
    #[must_use]
    pub const fn with_force(mut self, force: f64) -> Self {
        self.force = Some(force);
        self
    }

    /// Sample this contact at `t`.
    #[inline]
    #[must_use]
    pub const fn sample(&self, t: Instant) -> Sample {
        Sample::new(self.x, self.y, t)
    }

    /// Pressure bucket for this contact's force reading.
    #[inline]
    #[must_use]
    pub fn pressure(&self) -> Pressure {
        Pressure::from_force(self.force)
    }
}

/// Phase of a touch frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// First contact of a new sequence.
    Start,
    /// One or more contacts moved.
    Move,
    /// Contacts lifted; the sequence is complete.
    End,
}

/// A touch event as delivered by the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchFrame {
    /// What happened.
    pub phase: TouchPhase,
    /// Active contacts (or lifted contacts for [`TouchPhase::End`]).
    pub contacts: Vec<Contact>,
    /// Monotonic event time.
    pub at: Instant,
}

impl TouchFrame {
    /// Create a frame.
    #[must_use]
    pub fn new(phase: TouchPhase, contacts: Vec<Contact>, at: Instant) -> Self {
        Self {
            phase,
            contacts,
            at,
        }
    }

    /// The contact that drives the path (the first reported one).
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    /// Number of contacts in this frame, never less than one.
    #[inline]
    #[must_use]
    pub fn finger_count(&self) -> u8 {
        u8::try_from(self.contacts.len()).unwrap_or(u8::MAX).max(1)
    }
}

/// Where and how a touch sequence began.
///
/// Captured once per sequence and discarded when it ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchStart {
    /// Start position and time.
    pub sample: Sample,
    /// Pressure of the initial contact.
    pub pressure: Pressure,
}

impl TouchStart {
    /// Capture the start of a sequence from its first contact.
    #[must_use]
    pub fn from_contact(contact: &Contact, t: Instant) -> Self {
        Self {
            sample: contact.sample(t),
            pressure: contact.pressure(),
        }
    }
}

/// Coarse pressure level derived from a normalized force reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pressure {
    /// Force below 0.3.
    Light,
    /// Force in `[0.3, 0.7)`, or no reading available.
    #[default]
    Medium,
    /// Force of 0.7 and above.
    Heavy,
}

impl Pressure {
    /// Upper bound (exclusive) of the light bucket.
    pub const LIGHT_MAX: f64 = 0.3;
    /// Upper bound (exclusive) of the medium bucket.
    pub const MEDIUM_MAX: f64 = 0.7;

    /// Bucket a force reading. Missing readings map to [`Pressure::Medium`].
    #[must_use]
    pub fn from_force(force: Option<f64>) -> Self {
        match force {
            Some(f) if f < Self::LIGHT_MAX => Self::Light,
            Some(f) if f < Self::MEDIUM_MAX => Self::Medium,
            Some(_) => Self::Heavy,
            None => Self::Medium,
        }
    }

    /// Lowercase tag used inside gesture kind strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pressure {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "heavy" => Ok(Self::Heavy),
            _ => Err(()),
        }
    }
}
