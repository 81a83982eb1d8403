//! # Calendar schedules for cron runners.
//!
//! [`Schedule`] wraps a parsed [`croner::Cron`]. It accepts standard 5-field
//! expressions, 6-field expressions with a leading seconds field, and the presets
//! below. All times are UTC.
//!
//! | Preset                  | Expands to  |
//! |-------------------------|-------------|
//! | `@yearly`, `@annually`  | `0 0 1 1 *` |
//! | `@monthly`              | `0 0 1 * *` |
//! | `@weekly`               | `0 0 * * 0` |
//! | `@daily`, `@midnight`   | `0 0 * * *` |
//! | `@hourly`               | `0 * * * *` |
//!
//! ## Missed occurrences
//! Occurrences missed while an execution was running are **coalesced**: see
//! [`Schedule::next_fire`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use croner::Cron;

use crate::error::ConfigError;

/// Parsed, validated cron schedule.
#[derive(Clone)]
pub struct Schedule {
    expression: String,
    cron: Cron,
}

impl Schedule {
    /// Parses `expression`, expanding presets first.
    ///
    /// # Example
    /// ```
    /// use procvisor::Schedule;
    ///
    /// assert!(Schedule::parse("@midnight").is_ok());
    /// assert!(Schedule::parse("*/5 * * * * *").is_ok());
    /// assert!(Schedule::parse("not a schedule").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let trimmed = expression.trim();
        let invalid = |reason: String| ConfigError::InvalidSchedule {
            expression: expression.to_string(),
            reason,
        };

        let pattern = match trimmed.to_ascii_lowercase().as_str() {
            "@yearly" | "@annually" => "0 0 1 1 *".to_string(),
            "@monthly" => "0 0 1 * *".to_string(),
            "@weekly" => "0 0 * * 0".to_string(),
            "@daily" | "@midnight" => "0 0 * * *".to_string(),
            "@hourly" => "0 * * * *".to_string(),
            other if other.starts_with('@') => {
                return Err(invalid(format!("unknown preset {trimmed}")));
            }
            _ => trimmed.to_string(),
        };

        let fields = pattern.split_whitespace().count();
        if !(5..=6).contains(&fields) {
            return Err(invalid(format!("expected 5 or 6 fields, found {fields}")));
        }

        let cron = Cron::new(&pattern)
            .with_seconds_optional()
            .parse()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            expression: trimmed.to_string(),
            cron,
        })
    }

    /// The expression as given (presets are not expanded).
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `t`, or `None` if the schedule never fires again.
    pub fn next_after(&self, t: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.find_next_occurrence(t, false).ok()
    }

    /// Next fire time after an execution that fired at `fired_at` and returned at `now`.
    ///
    /// The candidate is the first occurrence after `fired_at`, so drift does not
    /// accumulate. If the candidate is already due (the execution overran it), all
    /// missed occurrences are skipped and the first occurrence after `now` is used.
    pub fn next_fire(
        &self,
        fired_at: &DateTime<Utc>,
        now: &DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let candidate = self.next_after(fired_at)?;
        if candidate > *now {
            Some(candidate)
        } else {
            self.next_after(now)
        }
    }
}

impl FromStr for Schedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schedule::parse(s)
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Schedule").field(&self.expression).finish()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, h, m, s).unwrap()
    }

    #[test]
    fn midnight_preset_fires_at_next_midnight() {
        let schedule = Schedule::parse("@midnight").unwrap();
        let next = schedule.next_after(&at(12, 0, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap());
        assert_eq!(schedule.expression(), "@midnight");
    }

    #[test]
    fn seconds_field_is_supported() {
        let schedule = Schedule::parse("*/10 * * * * *").unwrap();
        assert_eq!(schedule.next_after(&at(12, 0, 3)), Some(at(12, 0, 10)));
        assert_eq!(schedule.next_after(&at(12, 0, 10)), Some(at(12, 0, 20)));
    }

    #[test]
    fn next_fire_is_anchored_on_fire_time() {
        let schedule = Schedule::parse("*/10 * * * * *").unwrap();
        // execution took 4s, still before the next occurrence
        let next = schedule.next_fire(&at(12, 0, 10), &at(12, 0, 14));
        assert_eq!(next, Some(at(12, 0, 20)));
    }

    #[test]
    fn next_fire_coalesces_missed_occurrences() {
        let schedule = Schedule::parse("*/10 * * * * *").unwrap();
        // execution overran 12:00:20 and 12:00:30
        let next = schedule.next_fire(&at(12, 0, 10), &at(12, 0, 35));
        assert_eq!(next, Some(at(12, 0, 40)));
    }

    #[test]
    fn invalid_expressions_are_configuration_errors() {
        for expr in ["", "* * *", "@fortnightly", "61 * * * *", "* * * * * * * *"] {
            let err = Schedule::parse(expr).unwrap_err();
            assert_eq!(err.as_label(), "config_invalid_schedule", "expr={expr:?}");
        }
    }
}
