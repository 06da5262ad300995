#![forbid(unsafe_code)]

//! Keyed, cancellable deadlines.
//!
//! The session never sleeps. It arms deadlines here and the caller drives
//! them by passing the current time to [`TimerSet::take_due`]. Each key holds
//! at most one deadline; arming a key again replaces the old one, so there is
//! never a queue of stale callbacks.

use web_time::Instant;

/// The session's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Fires a long press while the finger is still down.
    LongPress,
    /// Returns `confirming` to `ready`.
    Settle,
    /// Clears the gesture combo after inactivity.
    ComboClear,
}

impl TimerKey {
    pub const ALL: [TimerKey; 3] = [TimerKey::LongPress, TimerKey::Settle, TimerKey::ComboClear];

    const fn index(self) -> usize {
        match self {
            Self::LongPress => 0,
            Self::Settle => 1,
            Self::ComboClear => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimerSet {
    deadlines: [Option<Instant>; 3],
}

impl TimerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire at `deadline`, replacing any earlier arming.
    pub fn arm(&mut self, key: TimerKey, deadline: Instant) {
        self.deadlines[key.index()] = Some(deadline);
    }

    /// Disarm `key`. Returns `true` if it was armed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines[key.index()].take().is_some()
    }

    #[must_use]
    pub fn deadline(&self, key: TimerKey) -> Option<Instant> {
        self.deadlines[key.index()]
    }

    #[must_use]
    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadline(key).is_some()
    }

    /// Earliest armed deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarm and return every key due at `now`, earliest deadline first.
    ///
    /// Keys with equal deadlines come out in [`TimerKey`] order.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut due: Vec<(Instant, TimerKey)> = TimerKey::ALL
            .into_iter()
            .filter_map(|key| match self.deadlines[key.index()] {
                Some(at) if at <= now => Some((at, key)),
                _ => None,
            })
            .collect();
        due.sort();
        for (_, key) in &due {
            self.deadlines[key.index()] = None;
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_time::Duration;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn arm_replaces_previous_deadline() {
        let t = Instant::now();
        let mut timers = TimerSet::new();
        timers.arm(TimerKey::Settle, t + MS_100);
        timers.arm(TimerKey::Settle, t + MS_100 * 5);
        assert!(timers.take_due(t + MS_100 * 2).is_empty());
        assert_eq!(timers.take_due(t + MS_100 * 5), vec![TimerKey::Settle]);
        assert!(!timers.is_armed(TimerKey::Settle));
    }

    #[test]
    fn due_in_deadline_order() {
        let t = Instant::now();
        let mut timers = TimerSet::new();
        timers.arm(TimerKey::ComboClear, t + MS_100);
        timers.arm(TimerKey::LongPress, t + MS_100 * 3);
        timers.arm(TimerKey::Settle, t + MS_100 * 2);
        assert_eq!(timers.next_deadline(), Some(t + MS_100));
        assert_eq!(
            timers.take_due(t + MS_100 * 10),
            vec![TimerKey::ComboClear, TimerKey::Settle, TimerKey::LongPress]
        );
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn ties_break_by_key() {
        let t = Instant::now();
        let mut timers = TimerSet::new();
        timers.arm(TimerKey::ComboClear, t);
        timers.arm(TimerKey::LongPress, t);
        assert_eq!(timers.take_due(t), vec![TimerKey::LongPress, TimerKey::ComboClear]);
    }

    #[test]
    fn cancel_disarms() {
        let t = Instant::now();
        let mut timers = TimerSet::new();
        timers.arm(TimerKey::LongPress, t);
        assert!(timers.cancel(TimerKey::LongPress));
        assert!(!timers.cancel(TimerKey::LongPress));
        assert!(timers.take_due(t + MS_100).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
