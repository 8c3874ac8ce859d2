//! Age expressions used by the `olderThan` policy field.
//!
//! An age expression has the form `"<integer> <unit>"`, for example `"30 d"`
//! or `"12 h"`. Units are fixed multiples of a second; there is no calendar
//! arithmetic:
//!
//! | unit  | length      |
//! |-------|-------------|
//! | `y`   | 365 days    |
//! | `m`   | 30 days     |
//! | `w`   | 7 days      |
//! | `d`   | 24 hours    |
//! | `h`   | 60 minutes  |
//! | `min` | 60 seconds  |
//! | `s`   | 1 second    |
//!
//! The empty string is valid and means "now": the cutoff equals the
//! evaluation time, so no existing image is young enough to be protected.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::validation::ValidationError;

const FIELD: &str = "olderThan";

/// Unit of an age expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// 365 days.
    Year,
    /// 30 days.
    Month,
    /// 7 days.
    Week,
    /// 24 hours.
    Day,
    /// 60 minutes.
    Hour,
    /// 60 seconds.
    Minute,
    /// One second.
    Second,
}

impl TimeUnit {
    /// Parses a unit sign. Signs are case-sensitive: `m` is a month, `min` a minute.
    #[must_use]
    pub fn from_sign(sign: &str) -> Option<Self> {
        match sign {
            "y" => Some(Self::Year),
            "m" => Some(Self::Month),
            "w" => Some(Self::Week),
            "d" => Some(Self::Day),
            "h" => Some(Self::Hour),
            "min" => Some(Self::Minute),
            "s" => Some(Self::Second),
            _ => None,
        }
    }

    /// Returns the sign used in configuration files.
    #[must_use]
    pub const fn sign(self) -> &'static str {
        match self {
            Self::Year => "y",
            Self::Month => "m",
            Self::Week => "w",
            Self::Day => "d",
            Self::Hour => "h",
            Self::Minute => "min",
            Self::Second => "s",
        }
    }

    /// Returns the length of one unit in seconds.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;

        match self {
            Self::Year => 365 * DAY,
            Self::Month => 30 * DAY,
            Self::Week => 7 * DAY,
            Self::Day => DAY,
            Self::Hour => HOUR,
            Self::Minute => MINUTE,
            Self::Second => 1,
        }
    }
}

/// Parsed `olderThan` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OlderThan {
    /// No age given; the cutoff is the evaluation time itself.
    #[default]
    Now,
    /// Only images older than `amount` units are eligible.
    Age {
        /// Number of units.
        amount: u64,
        /// The unit.
        unit: TimeUnit,
    },
}

impl OlderThan {
    /// Parses an age expression.
    ///
    /// # Errors
    ///
    /// Returns a format error carrying the offending string when the input
    /// is not exactly `<integer> <unit>` separated by a single space, the
    /// amount is not a non-negative integer, the unit is unknown, or the
    /// resulting duration does not fit in a timestamp.
    ///
    /// Negative amounts such as `"-5 d"` are rejected. They would move the
    /// cutoff into the future and silently disable age protection.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_core::age::{OlderThan, TimeUnit};
    ///
    /// assert_eq!(OlderThan::parse("").unwrap(), OlderThan::Now);
    /// assert_eq!(
    ///     OlderThan::parse("2 w").unwrap(),
    ///     OlderThan::Age { amount: 2, unit: TimeUnit::Week },
    /// );
    /// assert!(OlderThan::parse("2weeks").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Ok(Self::Now);
        }

        let parts: Vec<&str> = input.split(' ').collect();
        let [amount, sign] = parts.as_slice() else {
            return Err(invalid(input, "expected '<integer> <unit>'"));
        };

        let amount = amount
            .parse::<u64>()
            .map_err(|_| invalid(input, "amount must be a non-negative integer"))?;
        let unit = TimeUnit::from_sign(sign)
            .ok_or_else(|| invalid(input, "unit must be one of y, m, w, d, h, min, s"))?;

        let fits = amount
            .checked_mul(unit.seconds())
            .is_some_and(|secs| i64::try_from(secs).is_ok());
        if !fits {
            return Err(invalid(input, "duration is too large"));
        }

        Ok(Self::Age { amount, unit })
    }

    /// Returns the configured age in seconds (zero for [`OlderThan::Now`]).
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            Self::Now => 0,
            // Bounded by `parse`.
            #[allow(clippy::cast_possible_wrap)]
            Self::Age { amount, unit } => (*amount * unit.seconds()) as i64,
        }
    }

    /// Returns the absolute cutoff for an evaluation at `now` (seconds since epoch).
    ///
    /// Images created strictly after the cutoff are protected by age.
    ///
    /// ```
    /// use harrow_core::age::OlderThan;
    ///
    /// assert_eq!(OlderThan::parse("50 s").unwrap().cutoff(1000), 950);
    /// assert_eq!(OlderThan::Now.cutoff(1000), 1000);
    /// ```
    #[must_use]
    pub const fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.seconds())
    }
}

impl fmt::Display for OlderThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => Ok(()),
            Self::Age { amount, unit } => write!(f, "{amount} {}", unit.sign()),
        }
    }
}

impl Serialize for OlderThan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn invalid(input: &str, reason: &str) -> ValidationError {
    ValidationError::format(FIELD, format!("invalid age expression '{input}': {reason}"))
}
