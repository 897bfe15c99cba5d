//! Timer configuration
//!
//! Pure data describing a pattern timer: the pattern in base units, the time
//! scale that converts units into seconds, and the rule applied at the end of
//! each pass. Hosts load this from files or build it from user input; the
//! timer itself only ever sees a validated value.

use crate::error::{Result, TimerError};
use crate::types::rule::PatternRule;
use crate::types::time::{gcd_all, is_zero, time, Time};

fn default_time_scale() -> u64 {
    1
}

/// Pattern, time scale and rule for a `PatternTimer`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerConfig {
    /// Step lengths in base units
    pub pattern: Vec<u64>,
    /// Base units per second
    #[cfg_attr(feature = "serde", serde(default = "default_time_scale"))]
    pub time_scale: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rule: PatternRule,
}

impl TimerConfig {
    /// Create a config with the default time scale (1) and rule (`Once`)
    pub fn new(pattern: Vec<u64>) -> Self {
        Self {
            pattern,
            time_scale: default_time_scale(),
            rule: PatternRule::default(),
        }
    }

    /// Builder-style time scale
    pub fn with_time_scale(mut self, time_scale: u64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Builder-style rule
    pub fn with_rule(mut self, rule: PatternRule) -> Self {
        self.rule = rule;
        self
    }

    /// Reject configurations the timer cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.time_scale == 0 {
            return Err(TimerError::ZeroTimeScale);
        }
        Ok(())
    }

    /// GCD-derived polling interval: `gcd(pattern) / time_scale`
    ///
    /// `None` when the pattern is empty or all zeros, since no tick length
    /// can be derived from it.
    pub fn poll_interval(&self) -> Option<Time> {
        if self.time_scale == 0 {
            return None;
        }
        let divisor = gcd_all(&self.pattern)?;
        let interval = time(divisor, self.time_scale);
        (!is_zero(interval)).then_some(interval)
    }

    /// Whether a timer with this configuration can never fire
    pub fn is_inert(&self) -> bool {
        self.poll_interval().is_none()
    }

    /// Total duration of one full pass
    ///
    /// `None` for a zero time scale, or when the pattern sum overflows `u64`.
    pub fn cycle_duration(&self) -> Option<Time> {
        if self.time_scale == 0 {
            return None;
        }
        let total = self
            .pattern
            .iter()
            .try_fold(0u64, |acc, &value| acc.checked_add(value))?;
        Some(time(total, self.time_scale))
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Parse a pattern written as whitespace- or comma-separated integers: `"1 2 3"`, `"[2, 4]"`
pub fn parse_pattern(text: &str) -> Result<Vec<u64>> {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| TimerError::InvalidPattern(format!("'{}' is not a non-negative integer", part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::seconds;

    #[test]
    fn test_poll_interval_is_gcd_over_scale() {
        assert_eq!(TimerConfig::new(vec![1, 2, 3]).poll_interval(), Some(seconds(1)));
        assert_eq!(
            TimerConfig::new(vec![2, 4]).with_time_scale(2).poll_interval(),
            Some(seconds(1))
        );
        assert_eq!(
            TimerConfig::new(vec![3, 9]).with_time_scale(4).poll_interval(),
            Some(time(3, 4))
        );
    }

    #[test]
    fn test_single_element_pattern_uses_itself() {
        assert_eq!(TimerConfig::new(vec![5]).poll_interval(), Some(seconds(5)));
    }

    #[test]
    fn test_inert_patterns() {
        assert!(TimerConfig::new(vec![]).is_inert());
        assert!(TimerConfig::new(vec![0, 0]).is_inert());
        assert!(!TimerConfig::new(vec![0, 2]).is_inert());
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let config = TimerConfig::new(vec![1]).with_time_scale(0);
        assert_eq!(config.validate(), Err(TimerError::ZeroTimeScale));
        assert_eq!(config.poll_interval(), None);
        assert!(TimerConfig::new(vec![1]).validate().is_ok());
    }

    #[test]
    fn test_cycle_duration() {
        let config = TimerConfig::new(vec![1, 2, 3]).with_time_scale(2);
        assert_eq!(config.cycle_duration(), Some(seconds(3)));
        assert_eq!(TimerConfig::new(vec![]).cycle_duration(), Some(seconds(0)));
        assert_eq!(TimerConfig::new(vec![1]).with_time_scale(0).cycle_duration(), None);
    }

    #[test]
    fn test_cycle_duration_overflow_is_none() {
        assert_eq!(TimerConfig::new(vec![u64::MAX, 1]).cycle_duration(), None);
        assert_eq!(
            TimerConfig::new(vec![u64::MAX, 0]).cycle_duration(),
            Some(seconds(u64::MAX))
        );
    }

    #[test]
    fn test_parse_pattern() {
        assert_eq!(parse_pattern("1 2 3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_pattern("[2, 4]"), Ok(vec![2, 4]));
        assert_eq!(parse_pattern("  "), Ok(vec![]));
        assert!(parse_pattern("1 -2").is_err());
        assert!(parse_pattern("one").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_config() {
        let config: TimerConfig = toml::from_str(
            r#"
            pattern = [2, 4]
            time_scale = 2
            rule = { repeat_last = 1 }
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            TimerConfig::new(vec![2, 4])
                .with_time_scale(2)
                .with_rule(PatternRule::RepeatLast(1))
        );

        let defaults: TimerConfig = toml::from_str("pattern = [1]").unwrap();
        assert_eq!(defaults.time_scale, 1);
        assert_eq!(defaults.rule, PatternRule::Once);

        let ping: TimerConfig = toml::from_str("pattern = [1, 2]\nrule = \"ping_pong\"").unwrap();
        assert_eq!(ping.rule, PatternRule::PingPong);
    }
}
