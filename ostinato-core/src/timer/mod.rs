//! Pattern timer
//!
//! Fires a handler once per pattern step. The pattern is reduced to a single
//! polling interval (the GCD of its values divided by the time scale); every
//! poll adds that interval to an accumulator, and once the accumulator covers
//! the current step's duration the step completes, the handler runs, and the
//! remainder carries into the next step.
//!
//! At most one step completes per tick. A tick that covers several steps
//! (a host that stalled, or a coarse tick source) only completes the current
//! one; the next step is evaluated on the following tick.
//!
//! ```ignore
//! use ostinato_core::{ManualTickSource, PatternRule, PatternTimer, TimerConfig};
//! use ostinato_core::types::time::seconds;
//!
//! let config = TimerConfig::new(vec![1, 2, 3]).with_rule(PatternRule::Once);
//! let mut timer = PatternTimer::new(config, ManualTickSource::new(), |step| {
//!     println!("step {} at {}s", step.index, step.elapsed);
//! })?;
//! timer.start();
//! timer.advance(seconds(6)); // steps at 1s, 3s, 6s
//! ```

mod step;
mod tick_source;

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::types::config::TimerConfig;
use crate::types::rule::PatternRule;
use crate::types::time::{time, to_f64, Time};
use num_traits::Zero;
use std::fmt;
use tracing::{debug, trace};

pub use step::Step;
use step::StepControl;
pub use tick_source::{ManualTickSource, TickHandle, TickSource};

/// Interval timer driven by a numeric pattern and a [`PatternRule`]
///
/// All operations, including tick delivery, must come from one execution
/// context. The timer holds no locks; hosts on multi-threaded runtimes give
/// it a single owner (see the driver in the `ostinato` crate).
pub struct PatternTimer<S, H> {
    config: TimerConfig,
    poll_interval: Option<Time>,
    source: S,
    active: Option<TickHandle>,
    handler: H,

    // Progress
    index: usize,
    reversed: bool,
    elapsed: Time,
    accumulated: Time,
}

impl<S, H> PatternTimer<S, H>
where
    S: TickSource,
    H: FnMut(&mut Step),
{
    /// Create a stopped timer
    pub fn new(config: TimerConfig, source: S, handler: H) -> Result<Self> {
        config.validate()?;
        let mut timer = Self {
            config: TimerConfig::default(),
            poll_interval: None,
            source,
            active: None,
            handler,
            index: 0,
            reversed: false,
            elapsed: Time::zero(),
            accumulated: Time::zero(),
        };
        timer.setup(config)?;
        Ok(timer)
    }

    /// Reconfigure the timer. An active timer is stopped.
    ///
    /// A zero time scale is rejected and leaves the timer untouched.
    pub fn setup(&mut self, config: TimerConfig) -> Result<()> {
        config.validate()?;

        self.poll_interval = config.poll_interval();
        debug!(
            pattern = ?config.pattern,
            time_scale = config.time_scale,
            rule = %config.rule,
            poll_interval = ?self.poll_interval.map(to_f64),
            "timer configured"
        );
        self.config = config;
        self.reversed = false;
        self.stop();
        Ok(())
    }

    /// Start ticking at the poll interval
    ///
    /// Does nothing for an inert pattern. Restarting a running timer replaces
    /// its schedule but keeps the current progress.
    pub fn start(&mut self) {
        let Some(interval) = self.poll_interval else {
            debug!("pattern has no poll interval, start ignored");
            return;
        };

        let handle = self.source.schedule(interval);
        if let Some(previous) = self.active.replace(handle) {
            self.source.cancel(previous);
        }
        debug!(handle = handle.raw(), interval = to_f64(interval), "timer started");
    }

    /// Cancel ticking and rewind. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            self.source.cancel(handle);
            debug!(handle = handle.raw(), "timer stopped");
        }
        self.rewind();
    }

    /// Reset progress to the first step without touching the schedule
    pub fn rewind(&mut self) {
        self.index = 0;
        self.elapsed = Time::zero();
        self.accumulated = Time::zero();
    }

    /// Deliver one tick from the tick source
    ///
    /// Ticks from a schedule that is no longer active are ignored.
    pub fn tick(&mut self, handle: TickHandle) {
        if self.active != Some(handle) {
            trace!(handle = handle.raw(), "ignoring stale tick");
            return;
        }
        let Some(interval) = self.poll_interval else {
            return;
        };

        self.accumulated += interval;
        self.elapsed += interval;

        let index = self.pattern_index();
        let Some(&value) = self.config.pattern.get(index) else {
            return;
        };
        let duration = time(value, self.config.time_scale);
        if self.accumulated < duration {
            return;
        }

        let mut step = Step::new(self.elapsed, index, value, duration);
        trace!(index, value, elapsed = step.elapsed, "step completed");
        (self.handler)(&mut step);

        match step.control {
            StepControl::Stop => {
                self.stop();
                return;
            }
            StepControl::Rewind => {
                self.rewind();
                return;
            }
            StepControl::Continue => {}
        }

        self.accumulated -= duration;
        self.index += 1;
        self.update_index();
    }

    /// Apply the rule once the index runs past the end of the pattern
    fn update_index(&mut self) {
        let len = self.config.pattern.len();
        if self.index < len {
            return;
        }

        match self.config.rule.restart_index(len) {
            None => {
                debug!(rule = %self.config.rule, "pattern finished");
                self.stop();
            }
            Some(restart) => {
                if self.config.rule == PatternRule::PingPong {
                    self.reversed = !self.reversed;
                }
                self.index = restart;
            }
        }
    }

    /// Index of the current step in the configured pattern
    pub fn pattern_index(&self) -> usize {
        if self.reversed {
            self.config.pattern.len().saturating_sub(1 + self.index)
        } else {
            self.index
        }
    }

    /// Configured pattern, in base units
    pub fn pattern(&self) -> &[u64] {
        &self.config.pattern
    }

    /// Pattern in the order the current pass plays it
    ///
    /// Under `PingPong` this is reversed on every other pass.
    pub fn playback_pattern(&self) -> Vec<u64> {
        if self.reversed {
            self.config.pattern.iter().rev().copied().collect()
        } else {
            self.config.pattern.clone()
        }
    }

    pub fn time_scale(&self) -> u64 {
        self.config.time_scale
    }

    pub fn rule(&self) -> PatternRule {
        self.config.rule
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Elapsed time since the last rewind, in seconds
    pub fn time(&self) -> f64 {
        to_f64(self.elapsed)
    }

    /// Exact elapsed time since the last rewind
    pub fn elapsed(&self) -> Time {
        self.elapsed
    }

    /// GCD-derived tick length, `None` for inert patterns
    pub fn poll_interval(&self) -> Option<Time> {
        self.poll_interval
    }

    /// Whether a tick schedule is active
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the current pass plays backwards (`PingPong` only)
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Handle of the active schedule
    pub fn active_handle(&self) -> Option<TickHandle> {
        self.active
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<H> PatternTimer<ManualTickSource, H>
where
    H: FnMut(&mut Step),
{
    /// Move the manual clock forward by `by`, delivering every due tick in order
    ///
    /// Returns the number of ticks delivered.
    pub fn advance(&mut self, by: Time) -> usize {
        let until = self.source.now() + by;
        let mut delivered = 0;
        while let Some(handle) = self.source.next_due(until) {
            self.tick(handle);
            delivered += 1;
        }
        self.source.set_now(until);
        delivered
    }
}

impl<S: fmt::Debug, H> fmt::Debug for PatternTimer<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternTimer")
            .field("config", &self.config)
            .field("poll_interval", &self.poll_interval)
            .field("source", &self.source)
            .field("active", &self.active)
            .field("index", &self.index)
            .field("reversed", &self.reversed)
            .field("elapsed", &self.elapsed)
            .field("accumulated", &self.accumulated)
            .finish_non_exhaustive()
    }
}
