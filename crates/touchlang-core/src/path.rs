#![forbid(unsafe_code)]

//! Path recording for the active touch sequence.
//!
//! [`PathRecorder`] owns the samples of exactly one touch sequence at a time.
//! Starting a new sequence discards whatever was recorded before; ending it
//! hands the full path to the caller and leaves the recorder idle.
//!
//! Alongside the path the recorder keeps a short visual trail, a FIFO of the
//! most recent positions with a fixed capacity, used only for presentation.

use std::collections::VecDeque;

use crate::event::Sample;

/// Default number of points kept in the visual trail.
pub const DEFAULT_TRAIL_CAPACITY: usize = 20;

/// A completed (or in-progress) path: samples in insertion order.
pub type Path = Vec<Sample>;

/// Records the samples of the current touch sequence.
#[derive(Debug, Clone)]
pub struct PathRecorder {
    path: Option<Path>,
    trail: VecDeque<(f64, f64)>,
    trail_capacity: usize,
}

impl Default for PathRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY)
    }
}

impl PathRecorder {
    /// Create an idle recorder with the given trail capacity.
    #[must_use]
    pub fn new(trail_capacity: usize) -> Self {
        Self {
            path: None,
            trail: VecDeque::with_capacity(trail_capacity),
            trail_capacity,
        }
    }

    /// Start a new path at `sample`, replacing any uncommitted one.
    pub fn begin(&mut self, sample: Sample) {
        let mut path = Vec::with_capacity(32);
        path.push(sample);
        self.path = Some(path);
        self.trail.clear();
        self.push_trail(sample);
    }

    /// Append to the active path. No-op when no path is active.
    pub fn append(&mut self, sample: Sample) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        path.push(sample);
        self.push_trail(sample);
    }

    /// The last `n` samples of the active path (fewer if the path is shorter).
    #[must_use]
    pub fn trailing_window(&self, n: usize) -> &[Sample] {
        match &self.path {
            Some(path) => &path[path.len().saturating_sub(n)..],
            None => &[],
        }
    }

    /// Finish the sequence, returning the full path and clearing all state.
    pub fn end(&mut self) -> Path {
        self.trail.clear();
        self.path.take().unwrap_or_default()
    }

    /// Whether a sequence is being recorded.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    /// First sample of the active path.
    #[must_use]
    pub fn start(&self) -> Option<&Sample> {
        self.path.as_ref().and_then(|p| p.first())
    }

    /// Samples recorded so far.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        self.path.as_deref().unwrap_or(&[])
    }

    /// The visual trail, oldest point first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.trail.iter().copied()
    }

    fn push_trail(&mut self, sample: Sample) {
        if self.trail_capacity == 0 {
            return;
        }
        while self.trail.len() >= self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back((sample.x, sample.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_time::{Duration, Instant};

    fn s(x: f64, t0: Instant, ms: u64) -> Sample {
        Sample::new(x, 0.0, t0 + Duration::from_millis(ms))
    }

    #[test]
    fn append_without_begin_is_noop() {
        let mut rec = PathRecorder::default();
        rec.append(s(1.0, Instant::now(), 0));
        assert!(!rec.is_active());
        assert!(rec.end().is_empty());
    }

    #[test]
    fn begin_replaces_prior_path() {
        let t0 = Instant::now();
        let mut rec = PathRecorder::default();
        rec.begin(s(1.0, t0, 0));
        rec.append(s(2.0, t0, 10));
        rec.begin(s(9.0, t0, 20));
        let path = rec.end();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].x, 9.0);
    }

    #[test]
    fn trailing_window_does_not_mutate() {
        let t0 = Instant::now();
        let mut rec = PathRecorder::default();
        rec.begin(s(0.0, t0, 0));
        for i in 1..8u32 {
            rec.append(s(f64::from(i), t0, u64::from(i) * 10));
        }
        let last3: Vec<f64> = rec.trailing_window(3).iter().map(|p| p.x).collect();
        assert_eq!(last3, vec![5.0, 6.0, 7.0]);
        assert_eq!(rec.trailing_window(100).len(), 8);
        assert_eq!(rec.samples().len(), 8);
    }

    #[test]
    fn end_clears_state() {
        let t0 = Instant::now();
        let mut rec = PathRecorder::default();
        rec.begin(s(0.0, t0, 0));
        rec.append(s(1.0, t0, 5));
        assert_eq!(rec.end().len(), 2);
        assert!(!rec.is_active());
        assert_eq!(rec.trail().len(), 0);
        assert!(rec.trailing_window(5).is_empty());
    }

    #[test]
    fn trail_evicts_oldest_first() {
        let t0 = Instant::now();
        let mut rec = PathRecorder::new(3);
        rec.begin(s(0.0, t0, 0));
        for i in 1..6u32 {
            rec.append(s(f64::from(i), t0, u64::from(i)));
        }
        let xs: Vec<f64> = rec.trail().map(|(x, _)| x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
        // The path itself is not bounded by the trail.
        assert_eq!(rec.samples().len(), 6);
    }
}
