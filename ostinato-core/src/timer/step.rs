//! Step events handed to the timer's handler

use crate::types::time::{to_f64, Time};

/// What the handler asked the timer to do once it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StepControl {
    #[default]
    Continue,
    Stop,
    Rewind,
}

/// A completed pattern step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Total elapsed time since the last rewind, in seconds
    pub elapsed: f64,
    /// Index of the completed step in the configured pattern
    pub index: usize,
    /// Base value of the completed step
    pub value: u64,
    /// Duration of the completed step, in seconds
    pub duration: f64,
    elapsed_exact: Time,
    pub(crate) control: StepControl,
}

impl Step {
    pub(crate) fn new(elapsed: Time, index: usize, value: u64, duration: Time) -> Self {
        Self {
            elapsed: to_f64(elapsed),
            index,
            value,
            duration: to_f64(duration),
            elapsed_exact: elapsed,
            control: StepControl::Continue,
        }
    }

    /// Exact elapsed time
    pub fn elapsed_time(&self) -> Time {
        self.elapsed_exact
    }

    /// Stop (and rewind) the timer once the handler returns
    pub fn stop(&mut self) {
        self.control = StepControl::Stop;
    }

    /// Rewind the timer once the handler returns, keeping it running
    pub fn rewind(&mut self) {
        if self.control != StepControl::Stop {
            self.control = StepControl::Rewind;
        }
    }
}
