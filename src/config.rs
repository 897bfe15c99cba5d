//! Timer configuration files
//!
//! A config file holds one `TimerConfig`, as TOML or JSON:
//!
//! ```toml
//! pattern = [1, 1, 2]
//! time_scale = 4
//! rule = "repeat_all"      # or "once", "ping_pong", { repeat_last = 2 }
//! ```

use anyhow::{bail, Context, Result};
use ostinato_core::{PatternRule, TimerConfig};
use std::fs;
use std::path::Path;

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => bail!(
                "Unsupported config file {}: expected a .toml or .json extension",
                path.display()
            ),
        }
    }
}

/// Parse and validate a config from text
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<TimerConfig> {
    let config: TimerConfig = match format {
        ConfigFormat::Toml => toml::from_str(contents).context("Invalid TOML timer config")?,
        ConfigFormat::Json => serde_json::from_str(contents).context("Invalid JSON timer config")?,
    };
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a config file
pub fn load_config(path: &Path) -> Result<TimerConfig> {
    let format = ConfigFormat::from_path(path)?;
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&contents, format).with_context(|| format!("Failed to load {}", path.display()))
}

/// Configuration used when nothing else is given: a repeating short-short-long figure
pub fn default_config() -> TimerConfig {
    TimerConfig::new(vec![1, 1, 2])
        .with_time_scale(4)
        .with_rule(PatternRule::RepeatAll)
}
