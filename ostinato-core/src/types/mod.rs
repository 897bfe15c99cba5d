// ostinato-core/src/types/mod.rs

pub mod config;
pub mod rule;
pub mod time;

pub use config::{parse_pattern, TimerConfig};
pub use rule::PatternRule;
pub use time::Time;
