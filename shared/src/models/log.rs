//! Log record data model.
//!
//! Defines the `LogRecord` structure returned by log reports and the
//! fixed-width display line used when listing the slowest log lines.

use serde::{Deserialize, Serialize};

/// Minimum display width of the severity field.
pub const SEVERITY_WIDTH: usize = 2;

/// Minimum display width of the component field.
pub const COMPONENT_WIDTH: usize = 8;

/// A single parsed server log line.
///
/// # Example
///
/// ```
/// use shared::models::LogRecord;
///
/// let record = LogRecord::new(
///     "2023-01-01T10:00:00.000Z",
///     "I",
///     "NETWORK",
///     "conn12",
///     "Connection accepted",
/// );
///
/// assert_eq!(
///     record.to_display_line(),
///     "2023-01-01T10:00:00.000Z I  NETWORK  [conn12] Connection accepted"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp of the log line, in the text form it was stored with.
    pub timestamp: String,

    /// Severity code (e.g. `I`, `W`, `E`, `F`, `D1`).
    pub severity: String,

    /// Component that emitted the line (e.g. `NETWORK`, `COMMAND`).
    pub component: String,

    /// Execution context, usually a connection or thread name.
    pub context: String,

    /// Free-text message.
    pub message: String,
}

impl LogRecord {
    /// Creates a new log record.
    #[must_use]
    pub fn new(
        timestamp: impl Into<String>,
        severity: impl Into<String>,
        component: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            severity: severity.into(),
            component: component.into(),
            context: context.into(),
            message: message.into(),
        }
    }

    /// Renders the record as a single columnar display line.
    ///
    /// Severity and component are padded to their minimum widths but never
    /// truncated; the context is wrapped in brackets.
    #[must_use]
    pub fn to_display_line(&self) -> String {
        format!(
            "{} {:<sw$} {:<cw$} [{}] {}",
            self.timestamp,
            self.severity,
            self.component,
            self.context,
            self.message,
            sw = SEVERITY_WIDTH,
            cw = COMPONENT_WIDTH,
        )
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogRecord {
        LogRecord::new(
            "2023-01-01T10:00:00.000Z",
            "W",
            "COMMAND",
            "conn7",
            "Slow query",
        )
    }

    #[test]
    fn test_display_line_pads_short_fields() {
        let line = sample().to_display_line();
        assert_eq!(line, "2023-01-01T10:00:00.000Z W  COMMAND  [conn7] Slow query");
    }

    #[test]
    fn test_display_line_keeps_long_fields_intact() {
        let record = LogRecord::new("t", "D1", "TENANT_MIGRATION", "ctx", "msg");
        assert_eq!(record.to_display_line(), "t D1 TENANT_MIGRATION [ctx] msg");
    }

    #[test]
    fn test_display_matches_display_line() {
        let record = sample();
        assert_eq!(record.to_string(), record.to_display_line());
    }

    #[test]
    fn test_field_order_in_display_line() {
        let line = sample().to_display_line();
        let severity = line.find(" W ").unwrap();
        let component = line.find("COMMAND").unwrap();
        let context = line.find("[conn7]").unwrap();
        assert!(severity < component && component < context);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["severity"], "W");
        assert_eq!(json["component"], "COMMAND");

        let back: LogRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
