//! Pattern rules: what happens when the timer reaches the end of its pattern

use crate::error::TimerError;
use std::fmt;
use std::str::FromStr;

/// Timer pattern behaviour rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PatternRule {
    /// Complete one full pass and stop the timer
    #[default]
    Once,
    /// Repeat the full pattern indefinitely
    RepeatAll,
    /// After the first pass, repeat the last *n* steps indefinitely
    RepeatLast(usize),
    /// Reverse direction after reaching the end, indefinitely
    PingPong,
}

impl PatternRule {
    /// Index the next pass starts from, or `None` if the timer should stop
    pub fn restart_index(&self, len: usize) -> Option<usize> {
        match *self {
            PatternRule::Once => None,
            PatternRule::RepeatAll | PatternRule::PingPong => Some(0),
            // Nothing left to repeat
            PatternRule::RepeatLast(0) => None,
            PatternRule::RepeatLast(n) => Some(len.saturating_sub(n)),
        }
    }
}

impl fmt::Display for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternRule::Once => write!(f, "once"),
            PatternRule::RepeatAll => write!(f, "all"),
            PatternRule::RepeatLast(n) => write!(f, "last {}", n),
            PatternRule::PingPong => write!(f, "pingpong"),
        }
    }
}

impl FromStr for PatternRule {
    type Err = TimerError;

    /// Parse a rule (case-insensitive): `once`, `all`, `last 2`, `last:2`, `pingpong`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let mut parts = lower
            .split(|c: char| c.is_whitespace() || c == ':')
            .filter(|p| !p.is_empty());

        let rule = match parts.next() {
            Some("once") => PatternRule::Once,
            Some("all" | "repeat" | "repeat_all" | "repeatall") => PatternRule::RepeatAll,
            Some("pingpong" | "ping-pong" | "ping_pong") => PatternRule::PingPong,
            Some("last" | "repeat_last" | "repeatlast") => {
                let count = parts
                    .next()
                    .ok_or_else(|| TimerError::InvalidRule(format!("'{}' needs a step count", s.trim())))?;
                let count = count
                    .parse::<usize>()
                    .map_err(|_| TimerError::InvalidRule(format!("bad step count '{}'", count)))?;
                PatternRule::RepeatLast(count)
            }
            _ => return Err(TimerError::InvalidRule(s.trim().to_string())),
        };

        if parts.next().is_some() {
            return Err(TimerError::InvalidRule(s.trim().to_string()));
        }
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_parsing() {
        assert_eq!("once".parse::<PatternRule>(), Ok(PatternRule::Once));
        assert_eq!("ALL".parse::<PatternRule>(), Ok(PatternRule::RepeatAll));
        assert_eq!("repeat".parse::<PatternRule>(), Ok(PatternRule::RepeatAll));
        assert_eq!("last 2".parse::<PatternRule>(), Ok(PatternRule::RepeatLast(2)));
        assert_eq!("last:3".parse::<PatternRule>(), Ok(PatternRule::RepeatLast(3)));
        assert_eq!("Ping-Pong".parse::<PatternRule>(), Ok(PatternRule::PingPong));
    }

    #[test]
    fn test_rule_parsing_errors() {
        assert!("sometimes".parse::<PatternRule>().is_err());
        assert!("last".parse::<PatternRule>().is_err());
        assert!("last x".parse::<PatternRule>().is_err());
        assert!("once more".parse::<PatternRule>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for rule in [
            PatternRule::Once,
            PatternRule::RepeatAll,
            PatternRule::RepeatLast(4),
            PatternRule::PingPong,
        ] {
            assert_eq!(rule.to_string().parse::<PatternRule>(), Ok(rule));
        }
    }

    #[test]
    fn test_restart_index() {
        assert_eq!(PatternRule::Once.restart_index(3), None);
        assert_eq!(PatternRule::RepeatAll.restart_index(3), Some(0));
        assert_eq!(PatternRule::PingPong.restart_index(3), Some(0));
        assert_eq!(PatternRule::RepeatLast(2).restart_index(3), Some(1));
        assert_eq!(PatternRule::RepeatLast(5).restart_index(3), Some(0));
        assert_eq!(PatternRule::RepeatLast(0).restart_index(3), None);
    }

    #[test]
    fn test_default_rule_is_once() {
        assert_eq!(PatternRule::default(), PatternRule::Once);
    }
}
