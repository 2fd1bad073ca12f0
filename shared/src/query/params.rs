//! Validated report parameters.
//!
//! Identifiers cannot be bound as SQL parameters, so every identifier that
//! ends up in query text goes through one of these types first.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Maximum length accepted for a table name.
pub const MAX_TABLE_NAME_LEN: usize = 128;

/// Upper bound for the number of slowest log lines a report may request.
pub const MAX_TOP_N: usize = 10_000;

/// Errors raised when report input is rejected before any query runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The table name is not a plain SQL identifier.
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    /// The sort column is not one of the report columns.
    #[error("Unknown sort column: '{0}'")]
    UnknownSortColumn(String),

    /// The sort direction is neither ascending nor descending.
    #[error("Invalid sort direction: '{0}' (expected 'asc' or 'desc')")]
    InvalidSortDirection(String),

    /// The requested row count is outside the accepted range.
    #[error("Top N must be between 1 and {max}, got {0}", max = MAX_TOP_N)]
    TopNOutOfRange(usize),

    /// The filter key is not a recognized log field.
    #[error("Unknown filter key: '{0}'")]
    UnknownFilterKey(String),

    /// The duration filter is not a `start,end` pair.
    #[error("Invalid duration '{0}': expected 'start,end'")]
    MalformedDuration(String),

    /// A duration bound could not be parsed as a timestamp.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// The duration bounds use different UTC offsets.
    #[error("Duration bounds '{start}' and '{end}' use different offsets")]
    MixedOffsets {
        /// Range start as supplied.
        start: String,
        /// Range end as supplied.
        end: String,
    },

    /// The duration range starts after it ends.
    #[error("Duration start '{start}' is after end '{end}'")]
    InvertedDuration {
        /// Range start as supplied.
        start: String,
        /// Range end as supplied.
        end: String,
    },
}

/// A validated table name.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*` up to [`MAX_TABLE_NAME_LEN`] characters.
///
/// # Example
///
/// ```
/// use shared::query::TableName;
///
/// let table: TableName = "hatchet_logs".parse().unwrap();
/// assert_eq!(table.quoted(), "\"hatchet_logs\"");
///
/// assert!("logs; DROP TABLE logs".parse::<TableName>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Returns the bare table name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the table name quoted for use in SQL text.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl FromStr for TableName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid_start && valid_rest && s.len() <= MAX_TABLE_NAME_LEN {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidTableName(s.to_string()))
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Columns of the slow-operation report that results can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Operation kind.
    Op,
    /// Occurrence count.
    #[default]
    Count,
    /// Average duration.
    AvgMs,
    /// Maximum duration.
    MaxMs,
    /// Summed duration.
    TotalMs,
    /// Namespace.
    Ns,
    /// Index used.
    Index,
    /// Summed response length.
    Reslen,
    /// Query shape fingerprint.
    QueryPattern,
}

impl SortColumn {
    /// All sortable columns, in report order.
    pub const ALL: [Self; 9] = [
        Self::Op,
        Self::Count,
        Self::AvgMs,
        Self::MaxMs,
        Self::TotalMs,
        Self::Ns,
        Self::Index,
        Self::Reslen,
        Self::QueryPattern,
    ];

    /// Returns the result column name as it appears in the report query.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Op => "op",
            Self::Count => "\"count\"",
            Self::AvgMs => "avg_ms",
            Self::MaxMs => "max_ms",
            Self::TotalMs => "total_ms",
            Self::Ns => "ns",
            Self::Index => "\"index\"",
            Self::Reslen => "reslen",
            Self::QueryPattern => "query_pattern",
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Op => write!(f, "op"),
            Self::Count => write!(f, "count"),
            Self::AvgMs => write!(f, "avg_ms"),
            Self::MaxMs => write!(f, "max_ms"),
            Self::TotalMs => write!(f, "total_ms"),
            Self::Ns => write!(f, "ns"),
            Self::Index => write!(f, "index"),
            Self::Reslen => write!(f, "reslen"),
            Self::QueryPattern => write!(f, "query_pattern"),
        }
    }
}

impl FromStr for SortColumn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "op" => Ok(Self::Op),
            "count" => Ok(Self::Count),
            "avg_ms" => Ok(Self::AvgMs),
            "max_ms" => Ok(Self::MaxMs),
            "total_ms" => Ok(Self::TotalMs),
            "ns" | "namespace" => Ok(Self::Ns),
            "index" | "_index" => Ok(Self::Index),
            "reslen" => Ok(Self::Reslen),
            "query_pattern" | "query pattern" | "filter" => Ok(Self::QueryPattern),
            _ => Err(ValidationError::UnknownSortColumn(s.to_string())),
        }
    }
}

/// Sort direction for report ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ValidationError::InvalidSortDirection(s.to_string())),
        }
    }
}

/// Number of slowest log lines to return, bounded by [`MAX_TOP_N`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopN(usize);

impl TopN {
    /// Creates a validated row count.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TopNOutOfRange` if `n` is zero or greater
    /// than [`MAX_TOP_N`].
    pub fn new(n: usize) -> Result<Self, ValidationError> {
        if (1..=MAX_TOP_N).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ValidationError::TopNOutOfRange(n))
        }
    }

    /// Returns the row count.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for TopN {
    type Error = ValidationError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}
