#![forbid(unsafe_code)]

//! Haptic cues and the actuator boundary.
//!
//! The actuator is a fire-and-forget [`HapticSink`] that accepts a vibration
//! pattern in milliseconds (alternating on/off, starting with on). A sink
//! that cannot vibrate simply ignores the call.
//!
//! [`Haptics`] sits between the session and its sink. It turns named
//! [`HapticCue`]s into patterns, scaling the three pulse cues by the user's
//! [`HapticIntensity`]:
//!
//! | cue    | light | medium | heavy |
//! |--------|-------|--------|-------|
//! | light  | 5     | 10     | 15    |
//! | medium | 15    | 25     | 35    |
//! | heavy  | 30    | 50     | 70    |
//!
//! The remaining cues are fixed patterns. [`HapticIntensity::Off`]
//! suppresses everything, raw patterns included.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use touchlang_core::Emotion;

/// Actuator that plays vibration patterns.
pub trait HapticSink: Send {
    /// Play `pattern`. Must not block and must never fail.
    fn vibrate(&mut self, pattern: &[u32]);
}

/// Sink for surfaces without a vibration motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHaptics;

impl HapticSink for NullHaptics {
    fn vibrate(&mut self, _pattern: &[u32]) {}
}

/// Sink that records every pattern it is asked to play.
///
/// Clones share the same log, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    log: Arc<Mutex<Vec<Vec<u32>>>>,
}

impl RecordingHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pattern played so far, oldest first.
    #[must_use]
    pub fn patterns(&self) -> Vec<Vec<u32>> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent pattern, if any.
    #[must_use]
    pub fn last(&self) -> Option<Vec<u32>> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn clear(&self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl HapticSink for RecordingHaptics {
    fn vibrate(&mut self, pattern: &[u32]) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pattern.to_vec());
    }
}

/// User-selected vibration strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticIntensity {
    Off,
    Light,
    #[default]
    Medium,
    Heavy,
}

impl HapticIntensity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }
}

impl fmt::Display for HapticIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named haptic cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticCue {
    Light,
    Medium,
    Heavy,
    Success,
    Error,
    Thinking,
    Joyful,
    Excited,
}

impl HapticCue {
    /// Pattern for this cue at `intensity`, or `None` when muted.
    #[must_use]
    pub const fn pattern(self, intensity: HapticIntensity) -> Option<&'static [u32]> {
        use HapticIntensity as I;
        let pattern: &'static [u32] = match (self, intensity) {
            (_, I::Off) => return None,
            (Self::Light, I::Light) => &[5],
            (Self::Light, I::Medium) => &[10],
            (Self::Light, I::Heavy) => &[15],
            (Self::Medium, I::Light) => &[15],
            (Self::Medium, I::Medium) => &[25],
            (Self::Medium, I::Heavy) => &[35],
            (Self::Heavy, I::Light) => &[30],
            (Self::Heavy, I::Medium) => &[50],
            (Self::Heavy, I::Heavy) => &[70],
            (Self::Success, _) => &[30, 50, 30],
            (Self::Error, _) => &[50, 30, 50, 30, 50],
            (Self::Thinking, _) => &[20, 20, 20],
            (Self::Joyful, _) => &[50, 30, 50, 30, 100],
            (Self::Excited, _) => &[30, 20, 30, 20, 30, 20, 60],
        };
        Some(pattern)
    }

    /// Cue played when a reply with `emotion` arrives.
    #[must_use]
    pub const fn for_reply(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Excited => Self::Excited,
            Emotion::Joyful => Self::Joyful,
            _ => Self::Success,
        }
    }
}

/// Plays cues on a sink at the current intensity.
pub struct Haptics {
    sink: Box<dyn HapticSink>,
    intensity: HapticIntensity,
}

impl fmt::Debug for Haptics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Haptics")
            .field("intensity", &self.intensity)
            .finish_non_exhaustive()
    }
}

impl Haptics {
    #[must_use]
    pub fn new(sink: Box<dyn HapticSink>, intensity: HapticIntensity) -> Self {
        Self { sink, intensity }
    }

    pub fn play(&mut self, cue: HapticCue) {
        if let Some(pattern) = cue.pattern(self.intensity) {
            self.sink.vibrate(pattern);
        }
    }

    /// Play a raw pattern. Suppressed when intensity is off.
    pub fn play_raw(&mut self, pattern: &[u32]) {
        if self.intensity != HapticIntensity::Off && !pattern.is_empty() {
            self.sink.vibrate(pattern);
        }
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> HapticIntensity {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: HapticIntensity) {
        self.intensity = intensity;
    }
}
