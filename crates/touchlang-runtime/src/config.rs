#![forbid(unsafe_code)]

//! Policy-as-data configuration for a TouchLang session.
//!
//! Every threshold the classifier and session use can be loaded from TOML or
//! JSON as a single [`TouchPolicy`].
//!
//! # Loading
//!
//! ```toml
//! # touchlang-policy.toml
//! [gesture]
//! swipe_distance = 60.0
//! long_press_ms = 650
//!
//! [session]
//! settle_ms = 300
//!
//! [haptics]
//! enabled = false
//! ```
//!
//! ```rust,ignore
//! let policy = TouchPolicy::from_toml_file("touchlang-policy.toml")?;
//! let session = Session::new(policy.to_session_config(), sink, store);
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the built-in constant, so
//! `TouchPolicy::default().to_session_config()` equals
//! `SessionConfig::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use touchlang_core::GestureConfig;
use touchlang_core::path::DEFAULT_TRAIL_CAPACITY;
use web_time::Duration;

use crate::error::ConfigError;
use crate::preferences::{HISTORY_CAPACITY, HistoryLimits, STYLE_WINDOW};
use crate::session::SessionConfig;

// ---------------------------------------------------------------------------
// Top-level TouchPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchPolicy {
    /// Gesture classification thresholds.
    pub gesture: GesturePolicyConfig,

    /// Session timers and trail.
    pub session: SessionPolicyConfig,

    /// Haptic output.
    pub haptics: HapticsPolicyConfig,

    /// Usage history bounds.
    pub preferences: PreferencesPolicyConfig,
}

impl TouchPolicy {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from `path`, picking the format by extension (`.json` or TOML),
    /// and reject policies that fail [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let policy = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        let errors = policy.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        tracing::debug!(target: "touchlang.config", path = %path.display(), "policy loaded");
        Ok(policy)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the policy
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let g = &self.gesture;

        if g.stationary_distance <= 0.0 {
            errors.push(format!(
                "gesture.stationary_distance must be > 0, got {}",
                g.stationary_distance
            ));
        }
        if g.swipe_distance < g.stationary_distance {
            errors.push(format!(
                "gesture.swipe_distance must be >= gesture.stationary_distance, got {} < {}",
                g.swipe_distance, g.stationary_distance
            ));
        }
        if g.tap_max_ms == 0 {
            errors.push("gesture.tap_max_ms must be > 0".into());
        }
        if g.double_tap_window_ms == 0 {
            errors.push("gesture.double_tap_window_ms must be > 0".into());
        }
        if g.long_press_ms <= g.tap_max_ms {
            errors.push(format!(
                "gesture.long_press_ms must be > gesture.tap_max_ms, got {} <= {}",
                g.long_press_ms, g.tap_max_ms
            ));
        }
        if g.medium_swipe_velocity < 0.0 {
            errors.push(format!(
                "gesture.medium_swipe_velocity must be >= 0, got {}",
                g.medium_swipe_velocity
            ));
        }
        if g.fast_swipe_velocity <= g.medium_swipe_velocity {
            errors.push(format!(
                "gesture.fast_swipe_velocity must be > gesture.medium_swipe_velocity, got {} <= {}",
                g.fast_swipe_velocity, g.medium_swipe_velocity
            ));
        }

        if self.session.settle_ms == 0 {
            errors.push("session.settle_ms must be > 0".into());
        }
        if self.session.combo_window_ms == 0 {
            errors.push("session.combo_window_ms must be > 0".into());
        }

        let p = &self.preferences;
        if p.style_window == 0 {
            errors.push("preferences.style_window must be > 0".into());
        }
        if p.history_capacity < p.style_window {
            errors.push(format!(
                "preferences.history_capacity must be >= preferences.style_window, got {} < {}",
                p.history_capacity, p.style_window
            ));
        }

        errors
    }

    /// Build a [`GestureConfig`] from this policy.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        let g = &self.gesture;
        GestureConfig {
            stationary_distance: g.stationary_distance,
            swipe_distance: g.swipe_distance,
            tap_max_duration: Duration::from_millis(g.tap_max_ms),
            double_tap_window: Duration::from_millis(g.double_tap_window_ms),
            long_press_threshold: Duration::from_millis(g.long_press_ms),
            medium_swipe_velocity: g.medium_swipe_velocity,
            fast_swipe_velocity: g.fast_swipe_velocity,
        }
    }

    /// Build [`HistoryLimits`] from this policy.
    #[must_use]
    pub fn to_history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            capacity: self.preferences.history_capacity,
            style_window: self.preferences.style_window,
        }
    }

    /// Build a [`SessionConfig`] from this policy.
    #[must_use]
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            gesture: self.to_gesture_config(),
            settle_delay: Duration::from_millis(self.session.settle_ms),
            combo_window: Duration::from_millis(self.session.combo_window_ms),
            trail_capacity: self.session.trail_capacity,
            history: self.to_history_limits(),
            haptics_enabled: self.haptics.enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicyConfig {
    /// Displacement below which a touch is stationary.
    pub stationary_distance: f64,
    /// Displacement above which a touch is a swipe.
    pub swipe_distance: f64,
    pub tap_max_ms: u64,
    pub double_tap_window_ms: u64,
    pub long_press_ms: u64,
    /// Units per millisecond.
    pub medium_swipe_velocity: f64,
    /// Units per millisecond.
    pub fast_swipe_velocity: f64,
}

impl Default for GesturePolicyConfig {
    fn default() -> Self {
        Self {
            stationary_distance: 20.0,
            swipe_distance: 50.0,
            tap_max_ms: 300,
            double_tap_window_ms: 400,
            long_press_ms: 800,
            medium_swipe_velocity: 1.0,
            fast_swipe_velocity: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicyConfig {
    /// Delay from `confirming` back to `ready`.
    pub settle_ms: u64,
    /// Inactivity after which the combo is cleared.
    pub combo_window_ms: u64,
    /// Points kept in the visual trail.
    pub trail_capacity: usize,
}

impl Default for SessionPolicyConfig {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            combo_window_ms: 2000,
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticsPolicyConfig {
    /// When false, nothing is sent to the haptic sink.
    pub enabled: bool,
}

impl Default for HapticsPolicyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesPolicyConfig {
    pub history_capacity: usize,
    pub style_window: usize,
}

impl Default for PreferencesPolicyConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            style_window: STYLE_WINDOW,
        }
    }
}
