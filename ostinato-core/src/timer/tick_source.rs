//! Periodic tick sources
//!
//! A `PatternTimer` never sleeps or spawns anything itself. It asks a
//! `TickSource` for a repeating schedule and the host delivers each tick back
//! with `PatternTimer::tick`, always from the same execution context.

use crate::types::time::Time;
use num_traits::Zero;

/// Identifies one repeating schedule of a tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(raw: u64) -> Self {
        TickHandle(raw)
    }

    /// Raw id, for logging and channel transport
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Host capability for repeating ticks
pub trait TickSource {
    /// Start a repeating schedule firing every `interval`
    fn schedule(&mut self, interval: Time) -> TickHandle;

    /// Cancel a schedule. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn schedule(&mut self, interval: Time) -> TickHandle {
        (**self).schedule(interval)
    }

    fn cancel(&mut self, handle: TickHandle) {
        (**self).cancel(handle)
    }
}

#[derive(Debug, Clone)]
struct ManualSchedule {
    handle: TickHandle,
    interval: Time,
    next_due: Time,
}

/// Manually advanced clock in exact time
///
/// Nothing fires on its own: callers pull due ticks with [`next_due`](Self::next_due)
/// (or let `PatternTimer::advance` do it) after moving time forward.
#[derive(Debug, Clone)]
pub struct ManualTickSource {
    now: Time,
    next_id: u64,
    schedules: Vec<ManualSchedule>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self {
            now: Time::zero(),
            next_id: 0,
            schedules: Vec::new(),
        }
    }

    /// Current clock position
    pub fn now(&self) -> Time {
        self.now
    }

    /// Move the clock forward without delivering anything. Never moves backwards.
    pub fn set_now(&mut self, now: Time) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Pop the earliest tick due at or before `until`, moving the clock to its instant
    ///
    /// Ties are resolved in handle order.
    pub fn next_due(&mut self, until: Time) -> Option<TickHandle> {
        let schedule = self
            .schedules
            .iter_mut()
            .filter(|s| s.next_due <= until)
            .min_by(|a, b| a.next_due.cmp(&b.next_due).then(a.handle.cmp(&b.handle)))?;

        let handle = schedule.handle;
        let due = schedule.next_due;
        schedule.next_due = due + schedule.interval;
        self.set_now(due);
        Some(handle)
    }

    /// Collect every tick due up to `until`, in firing order, and settle the clock there
    pub fn advance_to(&mut self, until: Time) -> Vec<TickHandle> {
        let mut fired = Vec::new();
        while let Some(handle) = self.next_due(until) {
            fired.push(handle);
        }
        self.set_now(until);
        fired
    }

    /// Whether `handle` is still scheduled
    pub fn is_active(&self, handle: TickHandle) -> bool {
        self.schedules.iter().any(|s| s.handle == handle)
    }

    /// Number of live schedules
    pub fn active_count(&self) -> usize {
        self.schedules.len()
    }
}

impl Default for ManualTickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualTickSource {
    fn schedule(&mut self, interval: Time) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        // A zero interval would make next_due spin forever
        if !interval.is_zero() {
            self.schedules.push(ManualSchedule {
                handle,
                interval,
                next_due: self.now + interval,
            });
        }
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.schedules.retain(|s| s.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::{seconds, time};

    #[test]
    fn test_schedule_fires_on_interval() {
        let mut source = ManualTickSource::new();
        let h = source.schedule(seconds(1));

        assert_eq!(source.advance_to(time(1, 2)), vec![]);
        assert_eq!(source.advance_to(seconds(3)), vec![h, h, h]);
        assert_eq!(source.now(), seconds(3));
    }

    #[test]
    fn test_interleaves_schedules_in_time_order() {
        let mut source = ManualTickSource::new();
        let slow = source.schedule(seconds(2));
        let fast = source.schedule(seconds(1));

        // t=1 fast, t=2 slow+fast (slow has the lower handle), t=3 fast, t=4 slow+fast
        assert_eq!(
            source.advance_to(seconds(4)),
            vec![fast, slow, fast, fast, slow, fast]
        );
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let mut source = ManualTickSource::new();
        let h = source.schedule(seconds(1));
        assert!(source.is_active(h));

        source.cancel(h);
        source.cancel(h);
        assert!(!source.is_active(h));
        assert_eq!(source.advance_to(seconds(5)), vec![]);
    }

    #[test]
    fn test_schedule_starts_from_now() {
        let mut source = ManualTickSource::new();
        source.set_now(time(5, 2));
        let h = source.schedule(seconds(1));

        assert_eq!(source.next_due(seconds(3)), None);
        assert_eq!(source.next_due(seconds(4)), Some(h));
        assert_eq!(source.now(), time(7, 2));
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut source = ManualTickSource::new();
        source.set_now(seconds(3));
        source.set_now(seconds(1));
        assert_eq!(source.now(), seconds(3));
    }
}
