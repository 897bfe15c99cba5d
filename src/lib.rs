//! # Ostinato
//!
//! Ostinato runs a pattern timer in real time: a list of step lengths is
//! reduced to a single polling interval, and a handler fires each time a
//! step completes. The pattern rule decides what happens at the end of a
//! pass (stop, repeat everything, loop the tail, or ping-pong).
//!
//! The timer itself lives in `ostinato-core`. This crate hosts it.
//!
//! ## Modules
//!
//! - `clock`: Threaded `TickSource` that turns tick schedules into real ticks.
//! - `driver`: The thread that owns the timer and serialises every call to it.
//! - `audio`: Audible click on step completion.
//! - `config`: TOML/JSON timer configuration files.
//! - `simulate`: Instant offline runs against the manual tick source.
//! - `commands` / `repl`: The interactive command line, with hot reload.

pub mod audio;
pub mod clock;
pub mod commands;
pub mod config;
pub mod driver;
pub mod repl;
pub mod simulate;

// Re-export commonly used types for convenience
pub use crate::driver::{DriverEvent, DriverHandle, TimerDriver, TimerStatus};
pub use ostinato_core::{PatternRule, PatternTimer, Step, TimerConfig, TimerError};
