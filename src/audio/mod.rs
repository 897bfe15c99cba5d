//! Audible output for completed steps

pub mod click;

pub use click::{ClickPlayer, ClickVoice};
