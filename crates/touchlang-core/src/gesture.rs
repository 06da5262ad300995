#![forbid(unsafe_code)]

//! Gesture classification: reduces a completed touch sequence to one label.
//!
//! [`GestureClassifier`] is a small stateful processor. It remembers the time
//! of the last single tap (for double-tap detection) and tracks whether the
//! active sequence is still eligible for, or has already produced, a long
//! press.
//!
//! # Discrimination order
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. Circular motion (pre-empts everything, regardless of displacement)
//! 2. Long press: stationary and held for at least the long-press threshold
//! 3. Double tap: quick, stationary, and a tap was seen recently
//! 4. Tap: quick and stationary
//! 5. Swipe: displacement beyond the swipe threshold
//! 6. Multi-finger tap: two or more fingers and nothing else matched
//! 7. Unknown
//!
//! # Invariants
//!
//! 1. A double tap consumes the tap memory, so a third quick tap is a fresh
//!    single tap rather than a second double tap.
//! 2. Once a long press fires for a sequence, [`GestureClassifier::finish`]
//!    returns `None` for that sequence.
//! 3. Swipe direction buckets partition `(-180°, 180°]`: exactly ±45° is
//!    `right`, exactly ±135° is `left`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use web_time::{Duration, Instant};

use crate::event::{Pressure, Sample, TouchStart};
use crate::geometry::{self, Rotation};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for gesture classification.
///
/// The defaults are fixed policy values; changing them changes which gesture
/// a given path produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Displacement below which a touch counts as stationary (default: 20).
    pub stationary_distance: f64,
    /// Displacement above which a touch counts as a swipe (default: 50).
    pub swipe_distance: f64,
    /// Longest duration that still counts as a tap (default: 300ms).
    pub tap_max_duration: Duration,
    /// Window between taps for a double tap (default: 400ms).
    pub double_tap_window: Duration,
    /// Hold time before a stationary touch is a long press (default: 800ms).
    pub long_press_threshold: Duration,
    /// Velocity above which a swipe is `medium` (default: 1.0 units/ms).
    pub medium_swipe_velocity: f64,
    /// Velocity above which a swipe is `fast` (default: 2.0 units/ms).
    pub fast_swipe_velocity: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            stationary_distance: 20.0,
            swipe_distance: 50.0,
            tap_max_duration: Duration::from_millis(300),
            double_tap_window: Duration::from_millis(400),
            long_press_threshold: Duration::from_millis(800),
            medium_swipe_velocity: 1.0,
            fast_swipe_velocity: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Gesture kinds
// ---------------------------------------------------------------------------

/// Cardinal swipe direction in screen space (Y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Toward +X.
    Right,
    /// Toward -X.
    Left,
    /// Toward +Y.
    Down,
    /// Toward -Y.
    Up,
}

impl SwipeDirection {
    /// Bucket an angle in degrees (as produced by [`geometry::angle_degrees`]).
    ///
    /// `|a| <= 45` is right, `|a| >= 135` is left, `45 < a < 135` is down,
    /// and `-135 < a < -45` is up.
    #[must_use]
    pub fn from_angle(degrees: f64) -> Self {
        let magnitude = degrees.abs();
        if magnitude <= 45.0 {
            Self::Right
        } else if magnitude >= 135.0 {
            Self::Left
        } else if degrees > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }

    /// Lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Down => "down",
            Self::Up => "up",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "right" => Some(Self::Right),
            "left" => Some(Self::Left),
            "down" => Some(Self::Down),
            "up" => Some(Self::Up),
            _ => None,
        }
    }
}

/// Speed bucket of a single-finger swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeSpeed {
    /// At or below the medium threshold.
    Slow,
    /// Above the medium threshold, at or below the fast one.
    Medium,
    /// Above the fast threshold.
    Fast,
}

impl SwipeSpeed {
    /// Bucket a velocity against the configured thresholds.
    #[must_use]
    pub fn from_velocity(velocity: f64, config: &GestureConfig) -> Self {
        if velocity > config.fast_swipe_velocity {
            Self::Fast
        } else if velocity > config.medium_swipe_velocity {
            Self::Medium
        } else {
            Self::Slow
        }
    }

    /// Lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "slow" => Some(Self::Slow),
            "medium" => Some(Self::Medium),
            "fast" => Some(Self::Fast),
            _ => None,
        }
    }
}

/// The discrete label of a classified touch sequence.
///
/// Every kind has a canonical string tag (see [`fmt::Display`]) which is
/// what intent tables and the usage history key on, e.g. `tap-medium`,
/// `swipe-right-fast`, `2f-swipe-up`, `3f-tap`, `circle-clockwise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Quick stationary touch.
    Tap(Pressure),
    /// Second quick tap within the double-tap window.
    DoubleTap(Pressure),
    /// Stationary touch held past the long-press threshold.
    LongPress(Pressure),
    /// Single-finger swipe.
    Swipe {
        /// Direction of travel.
        direction: SwipeDirection,
        /// Speed bucket.
        speed: SwipeSpeed,
    },
    /// Swipe with two or more fingers (no speed qualifier).
    MultiFingerSwipe {
        /// Number of fingers.
        fingers: u8,
        /// Direction of travel.
        direction: SwipeDirection,
    },
    /// Stationary touch with two or more fingers.
    MultiFingerTap {
        /// Number of fingers.
        fingers: u8,
    },
    /// Closed or spiral path.
    Circle(Rotation),
    /// Nothing matched.
    Unknown,
}

impl GestureKind {
    /// Whether this is the `unknown` classification.
    #[inline]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Short family name, independent of qualifiers.
    ///
    /// Multi-finger kinds collapse into `multi-touch`.
    #[must_use]
    pub fn family(&self) -> String {
        match self {
            Self::Tap(_) => "tap".into(),
            Self::DoubleTap(_) => "double-tap".into(),
            Self::LongPress(_) => "long-press".into(),
            Self::Swipe { direction, .. } => format!("swipe-{}", direction.as_str()),
            Self::MultiFingerSwipe { .. } | Self::MultiFingerTap { .. } => "multi-touch".into(),
            Self::Circle(rotation) => format!("circle-{rotation}"),
            Self::Unknown => "unknown".into(),
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tap(p) => write!(f, "tap-{p}"),
            Self::DoubleTap(p) => write!(f, "double-tap-{p}"),
            Self::LongPress(p) => write!(f, "long-press-{p}"),
            Self::Swipe { direction, speed } => {
                write!(f, "swipe-{}-{}", direction.as_str(), speed.as_str())
            }
            Self::MultiFingerSwipe { fingers, direction } => {
                write!(f, "{fingers}f-swipe-{}", direction.as_str())
            }
            Self::MultiFingerTap { fingers } => write!(f, "{fingers}f-tap"),
            Self::Circle(rotation) => write!(f, "circle-{rotation}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Error returned when a string is not a valid gesture tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGestureKindError {
    input: String,
}

impl fmt::Display for ParseGestureKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized gesture tag: {:?}", self.input)
    }
}

impl std::error::Error for ParseGestureKindError {}

impl FromStr for GestureKind {
    type Err = ParseGestureKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGestureKindError { input: s.into() };
        if s == "unknown" {
            return Ok(Self::Unknown);
        }
        if let Some(rest) = s.strip_prefix("circle-") {
            return match rest {
                "clockwise" => Ok(Self::Circle(Rotation::Clockwise)),
                "counter-clockwise" => Ok(Self::Circle(Rotation::CounterClockwise)),
                _ => Err(err()),
            };
        }
        if let Some(p) = s.strip_prefix("double-tap-") {
            return p.parse().map(Self::DoubleTap).map_err(|()| err());
        }
        if let Some(p) = s.strip_prefix("long-press-") {
            return p.parse().map(Self::LongPress).map_err(|()| err());
        }
        if let Some(p) = s.strip_prefix("tap-") {
            return p.parse().map(Self::Tap).map_err(|()| err());
        }
        if let Some(rest) = s.strip_prefix("swipe-") {
            let (dir, speed) = rest.split_once('-').ok_or_else(err)?;
            return Ok(Self::Swipe {
                direction: SwipeDirection::parse(dir).ok_or_else(err)?,
                speed: SwipeSpeed::parse(speed).ok_or_else(err)?,
            });
        }
        // `{N}f-tap` / `{N}f-swipe-{dir}`
        let (count, rest) = s.split_once("f-").ok_or_else(err)?;
        let fingers: u8 = count.parse().map_err(|_| err())?;
        if fingers < 2 {
            return Err(err());
        }
        if rest == "tap" {
            return Ok(Self::MultiFingerTap { fingers });
        }
        let dir = rest.strip_prefix("swipe-").ok_or_else(err)?;
        Ok(Self::MultiFingerSwipe {
            fingers,
            direction: SwipeDirection::parse(dir).ok_or_else(err)?,
        })
    }
}

impl Serialize for GestureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GestureKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The result of classifying one touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureClassification {
    /// The gesture label.
    pub kind: GestureKind,
    /// Pressure bucket of the classified contact.
    pub pressure: Pressure,
    /// Trailing path velocity in units per millisecond.
    pub velocity: f64,
    /// Number of fingers involved (at least one).
    pub fingers: u8,
}

impl GestureClassification {
    /// Whether this classification is `unknown`.
    #[inline]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.kind.is_unknown()
    }
}

/// Long-press bookkeeping for the active sequence.
#[derive(Debug, Clone, Copy)]
struct PendingLongPress {
    start: TouchStart,
    fingers: u8,
}

/// Stateful touch-sequence classifier.
///
/// Call [`begin`](Self::begin) on touch start, [`track`](Self::track) on
/// every move, and [`finish`](Self::finish) on touch end. Call
/// [`check_long_press`](Self::check_long_press) when the long-press deadline
/// passes while the touch is still down.
pub struct GestureClassifier {
    config: GestureConfig,
    last_tap: Option<Instant>,
    long_press: Option<PendingLongPress>,
    long_press_fired: bool,
}

impl fmt::Debug for GestureClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureClassifier")
            .field("tap_armed", &self.last_tap.is_some())
            .field("long_press_pending", &self.long_press.is_some())
            .field("long_press_fired", &self.long_press_fired)
            .finish()
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureClassifier {
    /// Create a classifier with the given thresholds.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            last_tap: None,
            long_press: None,
            long_press_fired: false,
        }
    }

    /// A new touch sequence started. Arms long-press detection.
    pub fn begin(&mut self, start: TouchStart, fingers: u8) {
        self.long_press = Some(PendingLongPress {
            start,
            fingers: fingers.max(1),
        });
        self.long_press_fired = false;
    }

    /// The active contact moved to `sample`.
    ///
    /// Returns `true` if the move carried the contact out of the stationary
    /// radius and cancelled a pending long press.
    pub fn track(&mut self, sample: &Sample, fingers: u8) -> bool {
        let Some(pending) = self.long_press.as_mut() else {
            return false;
        };
        if pending.start.sample.distance_to(sample) >= self.config.stationary_distance {
            self.long_press = None;
            tracing::trace!(target: "touchlang.gesture", "long press cancelled by movement");
            return true;
        }
        pending.fingers = pending.fingers.max(fingers);
        false
    }

    /// Fire the long press if the touch has been held long enough.
    ///
    /// Fires at most once per sequence; afterwards [`finish`](Self::finish)
    /// for the same sequence yields nothing.
    pub fn check_long_press(
        &mut self,
        now: Instant,
        path: &[Sample],
    ) -> Option<GestureClassification> {
        if self.long_press_fired {
            return None;
        }
        let pending = self.long_press?;
        let held = now.saturating_duration_since(pending.start.sample.t);
        if held < self.config.long_press_threshold {
            return None;
        }
        self.long_press = None;
        self.long_press_fired = true;
        let classification = GestureClassification {
            kind: GestureKind::LongPress(pending.start.pressure),
            pressure: pending.start.pressure,
            velocity: geometry::velocity(path),
            fingers: pending.fingers,
        };
        tracing::debug!(
            target: "touchlang.gesture",
            kind = %classification.kind,
            held_ms = held.as_millis() as u64,
            "long press fired before release"
        );
        Some(classification)
    }

    /// The touch sequence ended.
    ///
    /// `path` must include the lift point as its last sample. Returns `None`
    /// if a long press already fired for this sequence.
    pub fn finish(
        &mut self,
        path: &[Sample],
        pressure: Pressure,
        fingers: u8,
    ) -> Option<GestureClassification> {
        self.long_press = None;
        if std::mem::take(&mut self.long_press_fired) {
            return None;
        }
        Some(self.classify(path, pressure, fingers))
    }

    /// Apply the discrimination rules to a complete path.
    ///
    /// The first sample is the start, the last is the lift point. Updates tap
    /// memory as a side effect.
    pub fn classify(
        &mut self,
        path: &[Sample],
        pressure: Pressure,
        fingers: u8,
    ) -> GestureClassification {
        let fingers = fingers.max(1);
        let velocity = geometry::velocity(path);
        let kind = match (path.first(), path.last()) {
            (Some(start), Some(end)) => {
                self.discriminate(path, start, end, velocity, pressure, fingers)
            }
            _ => GestureKind::Unknown,
        };
        tracing::debug!(
            target: "touchlang.gesture",
            kind = %kind,
            velocity,
            fingers,
            samples = path.len(),
            "touch sequence classified"
        );
        GestureClassification {
            kind,
            pressure,
            velocity,
            fingers,
        }
    }

    /// Forget tap memory and long-press state.
    pub fn reset(&mut self) {
        self.last_tap = None;
        self.long_press = None;
        self.long_press_fired = false;
    }

    /// Whether a long press is still armed for the active sequence.
    #[inline]
    #[must_use]
    pub fn long_press_pending(&self) -> bool {
        self.long_press.is_some()
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    fn discriminate(
        &mut self,
        path: &[Sample],
        start: &Sample,
        end: &Sample,
        velocity: f64,
        pressure: Pressure,
        fingers: u8,
    ) -> GestureKind {
        let cfg = &self.config;

        if let Some(rotation) = geometry::circular_motion(path) {
            return GestureKind::Circle(rotation);
        }

        let delta = geometry::linear_delta(start, end);
        let stationary = delta.distance < cfg.stationary_distance;

        if stationary && delta.dt >= cfg.long_press_threshold {
            return GestureKind::LongPress(pressure);
        }

        if stationary && delta.dt < cfg.tap_max_duration {
            let now = end.t;
            let recent_tap = self
                .last_tap
                .is_some_and(|t| now.saturating_duration_since(t) < cfg.double_tap_window);
            if recent_tap {
                self.last_tap = None;
                return GestureKind::DoubleTap(pressure);
            }
            self.last_tap = Some(now);
            return GestureKind::Tap(pressure);
        }

        if delta.distance > cfg.swipe_distance {
            let direction = SwipeDirection::from_angle(delta.angle());
            return if fingers > 1 {
                GestureKind::MultiFingerSwipe { fingers, direction }
            } else {
                GestureKind::Swipe {
                    direction,
                    speed: SwipeSpeed::from_velocity(velocity, cfg),
                }
            };
        }

        if fingers >= 2 {
            return GestureKind::MultiFingerTap { fingers };
        }

        GestureKind::Unknown
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn line(t0: Instant, from: (f64, f64), to: (f64, f64), dur: u64) -> Vec<Sample> {
        vec![
            Sample::new(from.0, from.1, t0),
            Sample::new(to.0, to.1, t0 + ms(dur)),
        ]
    }

    fn start_at(x: f64, y: f64, t: Instant, pressure: Pressure) -> TouchStart {
        TouchStart {
            sample: Sample::new(x, y, t),
            pressure,
        }
    }

    // --- Tags ---

    #[test]
    fn tags_round_trip() {
        for tag in [
            "tap-light",
            "double-tap-medium",
            "long-press-heavy",
            "swipe-right-fast",
            "swipe-up-slow",
            "2f-swipe-left",
            "3f-tap",
            "circle-clockwise",
            "circle-counter-clockwise",
            "unknown",
        ] {
            let kind: GestureKind = tag.parse().unwrap();
            assert_eq!(kind.to_string(), tag);
        }
    }

    #[test]
    fn bad_tags_rejected() {
        for tag in ["", "tap", "tap-soft", "swipe-right", "1f-tap", "xf-tap", "circle-left"] {
            assert!(tag.parse::<GestureKind>().is_err(), "{tag} should not parse");
        }
    }

    #[test]
    fn kind_serializes_as_tag() {
        let json = serde_json::to_string(&GestureKind::MultiFingerTap { fingers: 2 }).unwrap();
        assert_eq!(json, "\"2f-tap\"");
        let back: GestureKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GestureKind::MultiFingerTap { fingers: 2 });
    }

    // --- Taps ---

    #[test]
    fn quick_stationary_touch_is_tap() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let c = gc.classify(&line(t, (100.0, 100.0), (100.0, 100.0), 150), Pressure::Medium, 1);
        assert_eq!(c.kind, GestureKind::Tap(Pressure::Medium));
        assert_eq!(c.kind.to_string(), "tap-medium");
    }

    #[test]
    fn second_tap_within_window_is_double_tap() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.classify(&line(t, (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        let c = gc.classify(
            &line(t + ms(150), (6.0, 5.0), (6.0, 5.0), 50),
            Pressure::Medium,
            1,
        );
        assert_eq!(c.kind, GestureKind::DoubleTap(Pressure::Medium));
    }

    #[test]
    fn third_tap_starts_fresh() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.classify(&line(t, (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        gc.classify(&line(t + ms(100), (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        let c = gc.classify(&line(t + ms(200), (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        assert_eq!(c.kind, GestureKind::Tap(Pressure::Medium));
    }

    #[test]
    fn tap_after_window_is_single() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.classify(&line(t, (5.0, 5.0), (5.0, 5.0), 50), Pressure::Light, 1);
        // Previous tap recorded at t+50; this one ends at t+500 (450ms later).
        let c = gc.classify(&line(t + ms(450), (5.0, 5.0), (5.0, 5.0), 50), Pressure::Light, 1);
        assert_eq!(c.kind, GestureKind::Tap(Pressure::Light));
    }

    // --- Long press ---

    #[test]
    fn held_stationary_touch_is_long_press() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let c = gc.classify(&line(t, (0.0, 0.0), (5.0, 5.0), 800), Pressure::Heavy, 1);
        assert_eq!(c.kind, GestureKind::LongPress(Pressure::Heavy));
    }

    #[test]
    fn long_press_timer_fires_once_and_suppresses_finish() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.begin(start_at(10.0, 10.0, t, Pressure::Light), 1);

        assert!(gc.check_long_press(t + ms(799), &[]).is_none());
        let fired = gc.check_long_press(t + ms(800), &[]).unwrap();
        assert_eq!(fired.kind, GestureKind::LongPress(Pressure::Light));
        assert!(gc.check_long_press(t + ms(900), &[]).is_none());

        let path = line(t, (10.0, 10.0), (10.0, 10.0), 1200);
        assert!(gc.finish(&path, Pressure::Light, 1).is_none());

        // The next sequence classifies normally again.
        gc.begin(start_at(10.0, 10.0, t + ms(2000), Pressure::Medium), 1);
        let path = line(t + ms(2000), (10.0, 10.0), (10.0, 10.0), 100);
        assert!(gc.finish(&path, Pressure::Medium, 1).is_some());
    }

    #[test]
    fn movement_cancels_long_press() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.begin(start_at(0.0, 0.0, t, Pressure::Medium), 1);
        assert!(!gc.track(&Sample::new(5.0, 0.0, t + ms(100)), 1));
        assert!(gc.long_press_pending());
        assert!(gc.track(&Sample::new(25.0, 0.0, t + ms(200)), 1));
        assert!(gc.check_long_press(t + ms(1000), &[]).is_none());
    }

    #[test]
    fn finish_cancels_pending_long_press() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.begin(start_at(0.0, 0.0, t, Pressure::Medium), 1);
        gc.finish(&line(t, (0.0, 0.0), (0.0, 0.0), 100), Pressure::Medium, 1);
        assert!(gc.check_long_press(t + ms(1000), &[]).is_none());
    }

    // --- Swipes ---

    #[test]
    fn swipe_speed_buckets() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let fast = gc.classify(&line(t, (100.0, 100.0), (200.0, 100.0), 40), Pressure::Medium, 1);
        assert_eq!(fast.kind.to_string(), "swipe-right-fast");
        let medium = gc.classify(&line(t, (100.0, 100.0), (200.0, 100.0), 70), Pressure::Medium, 1);
        assert_eq!(medium.kind.to_string(), "swipe-right-medium");
        // Exactly 1.0 units/ms is not above the medium threshold.
        let slow = gc.classify(&line(t, (100.0, 100.0), (200.0, 100.0), 100), Pressure::Medium, 1);
        assert_eq!(slow.kind.to_string(), "swipe-right-slow");
        assert!((slow.velocity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn swipe_directions_follow_screen_axes() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let cases = [
            ((0.0, 0.0), (-100.0, 0.0), "swipe-left-fast"),
            ((0.0, 0.0), (0.0, 100.0), "swipe-down-fast"),
            ((0.0, 0.0), (0.0, -100.0), "swipe-up-fast"),
        ];
        for (from, to, tag) in cases {
            let c = gc.classify(&line(t, from, to, 20), Pressure::Medium, 1);
            assert_eq!(c.kind.to_string(), tag);
        }
    }

    #[test]
    fn direction_boundaries_are_deterministic() {
        assert_eq!(SwipeDirection::from_angle(45.0), SwipeDirection::Right);
        assert_eq!(SwipeDirection::from_angle(-45.0), SwipeDirection::Right);
        assert_eq!(SwipeDirection::from_angle(135.0), SwipeDirection::Left);
        assert_eq!(SwipeDirection::from_angle(-135.0), SwipeDirection::Left);
        assert_eq!(SwipeDirection::from_angle(180.0), SwipeDirection::Left);
        assert_eq!(SwipeDirection::from_angle(90.0), SwipeDirection::Down);
        assert_eq!(SwipeDirection::from_angle(-90.0), SwipeDirection::Up);
    }

    #[test]
    fn multi_finger_swipe_drops_speed() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let c = gc.classify(&line(t, (0.0, 100.0), (0.0, 0.0), 500), Pressure::Medium, 2);
        assert_eq!(c.kind.to_string(), "2f-swipe-up");
    }

    // --- Multi-finger tap / unknown ---

    #[test]
    fn multi_finger_mid_range_is_multi_tap() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        // 30 units in 400ms: not stationary, not a swipe, not quick.
        let c = gc.classify(&line(t, (0.0, 0.0), (30.0, 0.0), 400), Pressure::Medium, 3);
        assert_eq!(c.kind.to_string(), "3f-tap");
    }

    #[test]
    fn single_finger_mid_range_is_unknown() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        let c = gc.classify(&line(t, (0.0, 0.0), (30.0, 0.0), 400), Pressure::Medium, 1);
        assert!(c.is_unknown());
        let c = gc.classify(&line(t, (0.0, 0.0), (0.0, 0.0), 500), Pressure::Medium, 1);
        assert!(c.is_unknown(), "stationary 500ms hold is neither tap nor long press");
    }

    #[test]
    fn empty_path_is_unknown() {
        let mut gc = GestureClassifier::default();
        assert!(gc.classify(&[], Pressure::Medium, 1).is_unknown());
    }

    // --- Circles ---

    #[test]
    fn circle_preempts_swipe_and_long_press() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        // Closed loop held for over a second: stationary net displacement.
        let path: Vec<Sample> = (0..=16u32)
            .map(|i| {
                let theta = 2.0 * PI * f64::from(i) / 16.0;
                Sample::new(
                    100.0 + 40.0 * theta.cos(),
                    100.0 + 40.0 * theta.sin(),
                    t + ms(u64::from(i) * 80),
                )
            })
            .collect();
        let c = gc.classify(&path, Pressure::Medium, 1);
        assert_eq!(c.kind, GestureKind::Circle(Rotation::Clockwise));
    }

    #[test]
    fn reset_clears_tap_memory() {
        let mut gc = GestureClassifier::default();
        let t = Instant::now();
        gc.classify(&line(t, (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        gc.reset();
        let c = gc.classify(&line(t + ms(100), (5.0, 5.0), (5.0, 5.0), 50), Pressure::Medium, 1);
        assert_eq!(c.kind, GestureKind::Tap(Pressure::Medium));
    }

    #[test]
    fn debug_format() {
        let gc = GestureClassifier::default();
        assert!(format!("{gc:?}").contains("GestureClassifier"));
    }
}
