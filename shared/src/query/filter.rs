//! Log filters.
//!
//! A `LogFilters` value is an ordered conjunction of predicates over the log
//! table. It can be assembled with builder methods or parsed from
//! `key=value` option strings, which is how the command line supplies them.

use super::params::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Filter key that selects a timestamp range instead of a column match.
pub const DURATION_KEY: &str = "duration";

/// Log columns that accept exact-match filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogField {
    /// Severity code.
    Severity,
    /// Emitting component.
    Component,
    /// Execution context.
    Context,
    /// Operation kind.
    Op,
    /// Namespace.
    Ns,
}

impl LogField {
    /// Returns the column name in the log table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Severity => "severity",
            Self::Component => "component",
            Self::Context => "context",
            Self::Op => "op",
            Self::Ns => "ns",
        }
    }
}

impl std::fmt::Display for LogField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for LogField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "severity" => Ok(Self::Severity),
            "component" => Ok(Self::Component),
            "context" => Ok(Self::Context),
            "op" => Ok(Self::Op),
            "ns" => Ok(Self::Ns),
            _ => Err(ValidationError::UnknownFilterKey(s.to_string())),
        }
    }
}

/// An inclusive timestamp range over the `date` column.
///
/// Both bounds are validated as timestamps but kept in the text form they
/// were given, since the store compares dates as text. For the same reason
/// both bounds must carry the same UTC offset suffix and are ordered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    start: String,
    end: String,
}

impl TimeRange {
    /// Creates a validated range.
    ///
    /// Accepted formats are `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` and
    /// RFC 3339 timestamps with a `Z` or numeric offset.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a timestamp, the bounds use
    /// different offsets, or the range starts after it ends.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ValidationError> {
        let start = start.into().trim().to_string();
        let end = end.into().trim().to_string();

        if timestamp_offset(&start)? != timestamp_offset(&end)? {
            return Err(ValidationError::MixedOffsets { start, end });
        }
        if start > end {
            return Err(ValidationError::InvertedDuration { start, end });
        }

        Ok(Self { start, end })
    }

    /// Returns the range start as supplied.
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Returns the range end as supplied.
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    /// Parses a `start,end` pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(',') {
            Some((start, end)) if !end.contains(',') => Self::new(start, end),
            _ => Err(ValidationError::MalformedDuration(s.to_string())),
        }
    }
}

/// Validates `s` as a timestamp and returns its offset suffix (`Z`,
/// `+HH:MM`, `-HH:MM`), or an empty string for local timestamps.
fn timestamp_offset(s: &str) -> Result<&str, ValidationError> {
    if DateTime::parse_from_rfc3339(s).is_ok() {
        let suffix_len = if s.ends_with(['Z', 'z']) { 1 } else { 6 };
        return Ok(&s[s.len() - suffix_len..]);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(s, format).is_ok());
    if naive || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        Ok("")
    } else {
        Err(ValidationError::InvalidTimestamp(s.to_string()))
    }
}

/// A single log predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFilter {
    /// Exact match on a log column.
    Equals {
        /// Column to match.
        field: LogField,
        /// Value the column must equal.
        value: String,
    },
    /// Inclusive range on the log timestamp.
    Duration(TimeRange),
}

impl LogFilter {
    /// Parses one `key=value` option.
    ///
    /// The option is split on the first `=`. Options without a value, or with
    /// an empty value, yield `Ok(None)` and are meant to be ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not recognized or a `duration` value is
    /// not a valid range.
    pub fn parse_option(option: &str) -> Result<Option<Self>, ValidationError> {
        let Some((key, value)) = option.split_once('=') else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }

        let key = key.trim();
        if key == DURATION_KEY {
            return value.parse().map(|range| Some(Self::Duration(range)));
        }

        Ok(Some(Self::Equals {
            field: key.parse()?,
            value: value.to_string(),
        }))
    }
}

/// Ordered conjunction of log filters.
///
/// # Example
///
/// ```
/// use shared::query::{LogField, LogFilters};
///
/// let filters = LogFilters::from_options(["component=NETWORK", "severity=W", "context="]).unwrap();
/// assert_eq!(filters.len(), 2);
///
/// let built = LogFilters::new()
///     .with_equals(LogField::Component, "NETWORK")
///     .with_equals(LogField::Severity, "W");
/// assert_eq!(filters, built);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilters {
    filters: Vec<LogFilter>,
}

impl LogFilters {
    /// Creates an empty filter set (matches every log line).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a sequence of `key=value` options, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn from_options<I, S>(options: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Vec::new();
        for option in options {
            if let Some(filter) = LogFilter::parse_option(option.as_ref())? {
                filters.push(filter);
            }
        }
        Ok(Self { filters })
    }

    /// Adds an exact-match filter. Empty values are ignored.
    #[must_use]
    pub fn with_equals(mut self, field: LogField, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.push(LogFilter::Equals { field, value });
        }
        self
    }

    /// Adds a timestamp range filter.
    #[must_use]
    pub fn with_duration(mut self, range: TimeRange) -> Self {
        self.filters.push(LogFilter::Duration(range));
        self
    }

    /// Returns true if no filters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Iterates over the filters in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, LogFilter> {
        self.filters.iter()
    }
}

impl<'a> IntoIterator for &'a LogFilters {
    type Item = &'a LogFilter;
    type IntoIter = std::slice::Iter<'a, LogFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
