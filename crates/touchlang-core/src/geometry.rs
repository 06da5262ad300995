#![forbid(unsafe_code)]

//! Path geometry: displacement, angle, velocity, and rotation.
//!
//! Every function here is pure and borrows its input; nothing mutates a
//! [`Sample`] or a path.
//!
//! Time is measured in milliseconds and distance in surface units, so
//! velocities come out in units per millisecond.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::event::Sample;

/// Number of trailing samples considered by [`velocity`].
pub const VELOCITY_WINDOW: usize = 5;

/// Minimum number of samples before [`circular_motion`] considers a path.
pub const CIRCLE_MIN_SAMPLES: usize = 10;

/// Accumulated rotation (radians) a path must exceed to count as a circle.
pub const CIRCLE_MIN_ROTATION: f64 = PI * 1.5;

/// Straight-line displacement between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDelta {
    /// Horizontal displacement.
    pub dx: f64,
    /// Vertical displacement (down is positive).
    pub dy: f64,
    /// Elapsed time.
    pub dt: Duration,
    /// Euclidean length of `(dx, dy)`.
    pub distance: f64,
}

impl LinearDelta {
    /// Elapsed time in fractional milliseconds.
    #[inline]
    #[must_use]
    pub fn dt_ms(&self) -> f64 {
        self.dt.as_secs_f64() * 1000.0
    }

    /// Direction of travel in degrees, see [`angle_degrees`].
    #[inline]
    #[must_use]
    pub fn angle(&self) -> f64 {
        angle_degrees(self.dx, self.dy)
    }
}

/// Direction of a circular gesture as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    /// Positive accumulated angle (Y down), i.e. clockwise on screen.
    Clockwise,
    /// Negative accumulated angle.
    CounterClockwise,
}

impl Rotation {
    /// Tag fragment used in gesture kind strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clockwise => "clockwise",
            Self::CounterClockwise => "counter-clockwise",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Displacement from `start` to `end`.
#[must_use]
pub fn linear_delta(start: &Sample, end: &Sample) -> LinearDelta {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    LinearDelta {
        dx,
        dy,
        dt: end.t.saturating_duration_since(start.t),
        distance: dx.hypot(dy),
    }
}

/// `atan2(dy, dx)` in degrees, normalized into `(-180, 180]`.
#[must_use]
pub fn angle_degrees(dx: f64, dy: f64) -> f64 {
    let deg = dy.atan2(dx).to_degrees();
    if deg <= -180.0 { deg + 360.0 } else { deg }
}

/// Average speed over the trailing [`VELOCITY_WINDOW`] samples.
///
/// Returns 0 when there are fewer than two samples or no time elapsed.
#[must_use]
pub fn velocity(path: &[Sample]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    let recent = &path[path.len().saturating_sub(VELOCITY_WINDOW)..];
    let (distance, time_ms) = recent.windows(2).fold((0.0, 0.0), |(d, t), pair| {
        let seg = linear_delta(&pair[0], &pair[1]);
        (d + seg.distance, t + seg.dt_ms())
    });
    if time_ms > 0.0 {
        distance / time_ms
    } else {
        0.0
    }
}

/// Arithmetic mean of the path's positions.
#[must_use]
pub fn centroid(path: &[Sample]) -> Option<(f64, f64)> {
    if path.is_empty() {
        return None;
    }
    let n = path.len() as f64;
    let (sx, sy) = path
        .iter()
        .fold((0.0, 0.0), |(sx, sy), s| (sx + s.x, sy + s.y));
    Some((sx / n, sy / n))
}

/// Signed rotation (radians) swept around the path centroid.
///
/// Each consecutive angular step is wrapped into `(-π, π]` before summing.
#[must_use]
pub fn accumulated_rotation(path: &[Sample]) -> f64 {
    let Some((cx, cy)) = centroid(path) else {
        return 0.0;
    };
    path.windows(2)
        .map(|pair| {
            let a1 = (pair[0].y - cy).atan2(pair[0].x - cx);
            let a2 = (pair[1].y - cy).atan2(pair[1].x - cx);
            let mut diff = a2 - a1;
            if diff > PI {
                diff -= 2.0 * PI;
            }
            if diff < -PI {
                diff += 2.0 * PI;
            }
            diff
        })
        .sum()
}

/// Detect a circular gesture by total rotation about the centroid.
///
/// This is a total-rotation heuristic rather than a curve fit, so irregular
/// spirals still qualify once they sweep more than [`CIRCLE_MIN_ROTATION`].
#[must_use]
pub fn circular_motion(path: &[Sample]) -> Option<Rotation> {
    if path.len() < CIRCLE_MIN_SAMPLES {
        return None;
    }
    let sum = accumulated_rotation(path);
    if sum.abs() > CIRCLE_MIN_ROTATION {
        Some(if sum > 0.0 {
            Rotation::Clockwise
        } else {
            Rotation::CounterClockwise
        })
    } else {
        None
    }
}
