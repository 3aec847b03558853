//! Quiet-hours policy.
//!
//! A quiet-hours window is a time-of-day interval during which polling is
//! deliberately skipped. Boundaries are configured as free text, so parsing
//! is lenient (`HH:MM:SS` or `HH:MM`) and any parse failure means "not
//! quiet": a broken configuration must never stop polling.

use chrono::NaiveTime;

/// Error returned when a time-of-day string matches neither accepted format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day {input:?}: expected HH:MM:SS or HH:MM")]
pub struct TimeOfDayError {
    input: String,
}

/// Parse a time of day as `HH:MM:SS`, falling back to `HH:MM`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use kakaobus_server::domain::parse_time_of_day;
///
/// assert_eq!(
///     parse_time_of_day("05:30:15").unwrap(),
///     NaiveTime::from_hms_opt(5, 30, 15).unwrap()
/// );
/// assert_eq!(
///     parse_time_of_day("23:45").unwrap(),
///     NaiveTime::from_hms_opt(23, 45, 0).unwrap()
/// );
/// assert!(parse_time_of_day("25:00").is_err());
/// assert!(parse_time_of_day("noon").is_err());
/// ```
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, TimeOfDayError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| TimeOfDayError {
            input: s.to_string(),
        })
}

/// A parsed quiet-hours window.
///
/// Both ends are inclusive. When `start >= end` the window wraps past
/// midnight, so `22:00`-`06:00` covers late evening and early morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl QuietWindow {
    /// Create a window from already-parsed boundaries.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse both boundaries. Each one is parsed independently.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeOfDayError> {
        Ok(Self {
            start: parse_time_of_day(start)?,
            end: parse_time_of_day(end)?,
        })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the window wraps past midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `now` falls inside the window.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.crosses_midnight() {
            now >= self.start || now <= self.end
        } else {
            self.start <= now && now <= self.end
        }
    }
}

/// Decide whether polling should be suppressed at `now`.
///
/// Returns `false` if either boundary fails to parse.
pub fn quiet_hours_active(now: NaiveTime, start: &str, end: &str) -> bool {
    QuietWindow::parse(start, end).is_ok_and(|window| window.contains(now))
}
