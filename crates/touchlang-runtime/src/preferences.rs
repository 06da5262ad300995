#![forbid(unsafe_code)]

//! User preferences, usage history, and the stores that persist them.
//!
//! The stored shape is a single JSON object with camelCase keys:
//!
//! ```json
//! {
//!   "gestureSpeed": "medium",
//!   "hapticIntensity": "medium",
//!   "gestureStyle": "balanced",
//!   "favoriteGestures": [],
//!   "customMappings": {},
//!   "gestureHistory": [
//!     { "kind": "tap-medium", "context": "general", "timestamp": 1760400000000 }
//!   ]
//! }
//! ```
//!
//! # Invariants
//!
//! 1. `gesture_history` never holds more than [`HistoryLimits::capacity`]
//!    entries after [`HistoryLimits::record`]; the oldest are evicted first.
//! 2. `gesture_style` is recomputed from the most recent
//!    [`HistoryLimits::style_window`] entries on every record and is never
//!    tracked incrementally.
//!
//! # Failure Modes
//!
//! - A missing blob loads as `None`.
//! - A malformed blob is a [`StoreError::Json`]; [`load_or_default`] logs it
//!   and substitutes defaults.
//! - Save failures are returned by the store; the session logs and drops them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use touchlang_core::{Context, GestureKind};

use crate::error::StoreError;
use crate::haptics::HapticIntensity;

/// Default cap on stored history entries.
pub const HISTORY_CAPACITY: usize = 100;

/// Default number of recent entries the style is derived from.
pub const STYLE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

/// Usage style derived from recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureStyle {
    TapHeavy,
    SwipeHeavy,
    #[default]
    Balanced,
}

impl GestureStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TapHeavy => "tap-heavy",
            Self::SwipeHeavy => "swipe-heavy",
            Self::Balanced => "balanced",
        }
    }
}

/// One recorded classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: GestureKind,
    pub context: Context,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(kind: GestureKind, context: Context, timestamp: u64) -> Self {
        Self {
            kind,
            context,
            timestamp,
        }
    }

    fn is_tap(&self) -> bool {
        matches!(
            self.kind,
            GestureKind::Tap(_) | GestureKind::DoubleTap(_) | GestureKind::MultiFingerTap { .. }
        )
    }

    fn is_swipe(&self) -> bool {
        matches!(
            self.kind,
            GestureKind::Swipe { .. } | GestureKind::MultiFingerSwipe { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub gesture_speed: GestureSpeed,
    pub haptic_intensity: HapticIntensity,
    pub gesture_style: GestureStyle,
    pub favorite_gestures: Vec<String>,
    /// Stored for the user; not consulted during intent resolution.
    pub custom_mappings: BTreeMap<String, String>,
    pub gesture_history: Vec<HistoryEntry>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Bounds applied when recording history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Maximum retained entries (default: 100).
    pub capacity: usize,
    /// Recent entries the style is derived from (default: 20).
    pub style_window: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            style_window: STYLE_WINDOW,
        }
    }
}

impl HistoryLimits {
    /// Append `entry`, evict beyond capacity, and rederive the style.
    pub fn record(&self, prefs: &mut UserPreferences, entry: HistoryEntry) {
        prefs.gesture_history.push(entry);
        let excess = prefs.gesture_history.len().saturating_sub(self.capacity);
        if excess > 0 {
            prefs.gesture_history.drain(..excess);
        }
        prefs.gesture_style = self.derive_style(&prefs.gesture_history);
    }

    /// Style of the most recent `style_window` entries of `history`.
    #[must_use]
    pub fn derive_style(&self, history: &[HistoryEntry]) -> GestureStyle {
        let recent = &history[history.len().saturating_sub(self.style_window)..];
        let taps = recent.iter().filter(|e| e.is_tap()).count();
        let swipes = recent.iter().filter(|e| e.is_swipe()).count();
        if taps > swipes * 2 {
            GestureStyle::TapHeavy
        } else if swipes > taps * 2 {
            GestureStyle::SwipeHeavy
        } else {
            GestureStyle::Balanced
        }
    }
}

/// [`HistoryLimits::record`] with the default limits.
pub fn record_and_rederive_style(prefs: &mut UserPreferences, entry: HistoryEntry) {
    HistoryLimits::default().record(prefs, entry);
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Persistence boundary for [`UserPreferences`].
pub trait PreferenceStore: Send {
    /// Load stored preferences. `Ok(None)` means nothing is stored yet.
    fn load(&self) -> Result<Option<UserPreferences>, StoreError>;

    fn save(&mut self, prefs: &UserPreferences) -> Result<(), StoreError>;
}

/// Load from `store`, substituting defaults for missing or unreadable data.
pub fn load_or_default(store: &dyn PreferenceStore) -> UserPreferences {
    match store.load() {
        Ok(Some(prefs)) => prefs,
        Ok(None) => UserPreferences::default(),
        Err(err) => {
            tracing::warn!(
                target: "touchlang.prefs",
                error = %err,
                "stored preferences unreadable, using defaults"
            );
            UserPreferences::default()
        }
    }
}

/// In-memory JSON blob store.
///
/// Clones share the same blob.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a raw blob, valid or not.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    /// The raw stored blob.
    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Parsed stored preferences, if any parse.
    #[must_use]
    pub fn stored(&self) -> Option<UserPreferences> {
        self.load().ok().flatten()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<UserPreferences>, StoreError> {
        let guard = self.blob.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, prefs: &UserPreferences) -> Result<(), StoreError> {
        let raw = serde_json::to_string(prefs)?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }
}

/// JSON file store.
///
/// Writes go to a sibling temp file first and are renamed into place. The
/// parent directory must already exist.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Option<UserPreferences>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&mut self, prefs: &UserPreferences) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(prefs)?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json).map_err(|e| StoreError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}
