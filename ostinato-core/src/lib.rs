//! # Ostinato Core
//!
//! Host-independent core of the Ostinato pattern timer. Provides the timer,
//! its configuration types and the tick-source abstraction, with no threads,
//! audio or I/O.
//!
//! ## Features
//!
//! - **serde**: Enable (de)serialization of `TimerConfig` and `PatternRule`
//!
//! ## Example
//!
//! ```ignore
//! use ostinato_core::{ManualTickSource, PatternRule, PatternTimer, TimerConfig};
//! use ostinato_core::types::time::seconds;
//!
//! let config = TimerConfig::new(vec![2, 4]).with_time_scale(2).with_rule(PatternRule::RepeatAll);
//! let mut timer = PatternTimer::new(config, ManualTickSource::new(), |step| {
//!     println!("{:.1}s", step.elapsed);
//! })?;
//! timer.start();
//! timer.advance(seconds(9)); // 1, 3, 4, 6, 7, 9
//! ```

pub mod error;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use error::TimerError;
pub use timer::{ManualTickSource, PatternTimer, Step, TickHandle, TickSource};
pub use types::{PatternRule, Time, TimerConfig};
