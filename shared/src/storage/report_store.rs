//! Report store trait and its `SQLite` implementation.
//!
//! Provides the `ReportStore` trait for running the loglens reports and a
//! `SqliteReportStore` that executes them against a store file populated by
//! the log ingestion pipeline.

use crate::models::{LogRecord, OperationStat};
use crate::query::{
    logs_query, slow_operations_query, top_slow_logs_query, LogFilters, SortColumn,
    SortDirection, SqlQuery, TableName, TopN, ValidationError,
};
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur while running a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The store could not be opened.
    #[error("Failed to open report store")]
    Connection(#[source] rusqlite::Error),

    /// The query could not be prepared or executed.
    #[error("Query execution failed")]
    QueryExecution(#[source] rusqlite::Error),

    /// A result row did not match the expected record layout.
    #[error("Failed to read result row")]
    RowScan(#[source] rusqlite::Error),

    /// The report input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed to acquire lock on the shared connection.
    #[error("Failed to acquire lock on report store")]
    LockError,
}

/// Trait for report store implementations.
///
/// Every call returns freshly built records; nothing is cached between calls
/// and an empty result is `Ok` with an empty vector.
pub trait ReportStore: Send + Sync {
    /// Aggregates operations by kind, namespace and query shape.
    ///
    /// Log lines without an operation kind are excluded. With
    /// `collscan_only`, only operations served by a full collection scan are
    /// included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the query fails, or a
    /// row cannot be read.
    fn fetch_slow_operations(
        &self,
        table: &TableName,
        order_by: SortColumn,
        direction: SortDirection,
        collscan_only: bool,
    ) -> Result<Vec<OperationStat>, ReportError>;

    /// Lists log lines matching every filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the query fails, or a
    /// row cannot be read.
    fn fetch_logs(
        &self,
        table: &TableName,
        filters: &LogFilters,
    ) -> Result<Vec<LogRecord>, ReportError>;

    /// Returns the `top_n` slowest operation log lines as display lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the query fails, or a
    /// row cannot be read.
    fn fetch_top_slow_log_lines(
        &self,
        table: &TableName,
        top_n: TopN,
    ) -> Result<Vec<String>, ReportError>;

    /// Validates raw report arguments and runs [`Self::fetch_slow_operations`].
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Validation` if the table, column or direction is
    /// rejected, otherwise any error from the report itself.
    fn slow_operations_report(
        &self,
        table: &str,
        order_by: &str,
        direction: &str,
        collscan_only: bool,
    ) -> Result<Vec<OperationStat>, ReportError> {
        self.fetch_slow_operations(
            &table.parse()?,
            order_by.parse()?,
            direction.parse()?,
            collscan_only,
        )
    }

    /// Parses `key=value` filter options and runs [`Self::fetch_logs`].
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Validation` if the table or a filter is
    /// rejected, otherwise any error from the report itself.
    fn logs_report(&self, table: &str, options: &[String]) -> Result<Vec<LogRecord>, ReportError> {
        self.fetch_logs(&table.parse()?, &LogFilters::from_options(options)?)
    }

    /// Validates raw report arguments and runs [`Self::fetch_top_slow_log_lines`].
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Validation` if the table or row count is
    /// rejected, otherwise any error from the report itself.
    fn top_slow_logs_report(&self, table: &str, top_n: usize) -> Result<Vec<String>, ReportError> {
        self.fetch_top_slow_log_lines(&table.parse()?, TopN::new(top_n)?)
    }
}

enum ConnectionSource {
    /// Open the file read-only for each call.
    Path(PathBuf),
    /// Reuse an injected connection.
    Shared(Mutex<Connection>),
}

/// `SQLite`-backed report store.
///
/// Opened from a path, the store acquires a read-only connection per call
/// and releases it before returning, including on error. Built from an
/// existing connection, all calls share it behind a mutex.
///
/// # Example
///
/// ```
/// use rusqlite::Connection;
/// use shared::storage::{ReportStore, SqliteReportStore};
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch(
///     "CREATE TABLE logs (date TEXT, severity TEXT, component TEXT, context TEXT,
///      message TEXT, op TEXT, ns TEXT, milli INTEGER, _index TEXT, reslen INTEGER,
///      filter TEXT);",
/// )
/// .unwrap();
///
/// let store = SqliteReportStore::with_connection(conn);
/// let logs = store.logs_report("logs", &[]).unwrap();
/// assert!(logs.is_empty());
/// ```
pub struct SqliteReportStore {
    source: ConnectionSource,
}

impl std::fmt::Debug for SqliteReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            ConnectionSource::Path(path) => f
                .debug_struct("SqliteReportStore")
                .field("path", path)
                .finish(),
            ConnectionSource::Shared(_) => f
                .debug_struct("SqliteReportStore")
                .field("connection", &"shared")
                .finish(),
        }
    }
}

impl SqliteReportStore {
    /// Creates a store that opens `path` for every report call.
    ///
    /// The file is not touched until the first call.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            source: ConnectionSource::Path(path.as_ref().to_path_buf()),
        }
    }

    /// Creates a store that runs every report on the given connection.
    #[must_use]
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            source: ConnectionSource::Shared(Mutex::new(conn)),
        }
    }

    /// Creates a new store for `path` wrapped in an Arc.
    #[must_use]
    pub fn new_shared(path: impl AsRef<Path>) -> Arc<Self> {
        Arc::new(Self::open(path))
    }

    /// Checks that the store can be opened and queried.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or queried.
    pub fn ping(&self) -> Result<(), ReportError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(ReportError::QueryExecution)?;
            Ok(())
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        match &self.source {
            ConnectionSource::Path(path) => {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(ReportError::Connection)?;
                f(&conn)
            }
            ConnectionSource::Shared(conn) => {
                let conn = conn.lock().map_err(|_| ReportError::LockError)?;
                f(&conn)
            }
        }
    }

    fn run<T>(
        &self,
        query: &SqlQuery,
        map_row: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, ReportError> {
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Executing report query");

        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&query.sql)
                .map_err(ReportError::QueryExecution)?;
            let mut rows = stmt
                .query(params_from_iter(query.params.iter()))
                .map_err(ReportError::QueryExecution)?;

            let mut records = Vec::new();
            while let Some(row) = rows.next().map_err(ReportError::QueryExecution)? {
                records.push(map_row(row).map_err(ReportError::RowScan)?);
            }

            tracing::debug!(rows = records.len(), "Report query complete");
            Ok(records)
        })
    }
}

fn operation_stat_from_row(row: &Row<'_>) -> rusqlite::Result<OperationStat> {
    let count: i64 = row.get(1)?;

    // SUM/MAX/AVG are NULL when every value in the group is NULL
    Ok(OperationStat {
        op: row.get(0)?,
        count: u64::try_from(count).unwrap_or(0),
        avg_ms: row.get::<_, Option<f64>>(2)?.unwrap_or_default(),
        max_ms: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        total_ms: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        namespace: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        index: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        reslen: row.get::<_, Option<i64>>(7)?.unwrap_or_default(),
        query_pattern: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
    })
}

fn log_record_from_row(row: &Row<'_>) -> rusqlite::Result<LogRecord> {
    Ok(LogRecord {
        timestamp: row.get(0)?,
        severity: row.get(1)?,
        component: row.get(2)?,
        context: row.get(3)?,
        message: row.get(4)?,
    })
}

impl ReportStore for SqliteReportStore {
    fn fetch_slow_operations(
        &self,
        table: &TableName,
        order_by: SortColumn,
        direction: SortDirection,
        collscan_only: bool,
    ) -> Result<Vec<OperationStat>, ReportError> {
        let query = slow_operations_query(table, order_by, direction, collscan_only);
        self.run(&query, operation_stat_from_row)
    }

    fn fetch_logs(
        &self,
        table: &TableName,
        filters: &LogFilters,
    ) -> Result<Vec<LogRecord>, ReportError> {
        let query = logs_query(table, filters);
        self.run(&query, log_record_from_row)
    }

    fn fetch_top_slow_log_lines(
        &self,
        table: &TableName,
        top_n: TopN,
    ) -> Result<Vec<String>, ReportError> {
        let query = top_slow_logs_query(table, top_n);
        let records = self.run(&query, log_record_from_row)?;
        Ok(records.iter().map(LogRecord::to_display_line).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LogField;

    const SCHEMA: &str = "CREATE TABLE logs (
        date TEXT, severity TEXT, component TEXT, context TEXT, message TEXT,
        op TEXT, ns TEXT, milli INTEGER, _index TEXT, reslen INTEGER, filter TEXT
    );";

    #[allow(clippy::too_many_arguments)]
    fn insert(
        conn: &Connection,
        date: &str,
        severity: &str,
        component: &str,
        op: &str,
        ns: &str,
        milli: i64,
        index: &str,
        filter: &str,
    ) {
        conn.execute(
            "INSERT INTO logs VALUES (?1, ?2, ?3, 'conn1', 'msg', ?4, ?5, ?6, ?7, 100, ?8)",
            rusqlite::params![date, severity, component, op, ns, milli, index, filter],
        )
        .unwrap();
    }

    fn create_test_store() -> SqliteReportStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        insert(&conn, "2023-01-01T01:00:00", "I", "COMMAND", "find", "db.a", 100, "COLLSCAN", "{x: 1}");
        insert(&conn, "2023-01-01T02:00:00", "I", "COMMAND", "find", "db.a", 300, "COLLSCAN", "{x: 1}");
        insert(&conn, "2023-01-01T03:00:00", "W", "WRITE", "update", "db.b", 50, "x_1", "{x: 1}");
        insert(&conn, "2023-01-01T04:00:00", "I", "NETWORK", "", "", 0, "", "");

        SqliteReportStore::with_connection(conn)
    }

    fn table() -> TableName {
        "logs".parse().unwrap()
    }

    #[test]
    fn test_slow_operations_groups_and_aggregates() {
        let store = create_test_store();

        let stats = store
            .fetch_slow_operations(&table(), SortColumn::Count, SortDirection::Desc, false)
            .unwrap();

        assert_eq!(stats.len(), 2);
        let find = &stats[0];
        assert_eq!(find.op, "find");
        assert_eq!(find.count, 2);
        assert!((find.avg_ms - 200.0).abs() < f64::EPSILON);
        assert_eq!(find.max_ms, 300);
        assert_eq!(find.total_ms, 400);
        assert_eq!(find.reslen, 200);
        assert_eq!(find.namespace, "db.a");
        assert_eq!(find.query_pattern, "{x: 1}");
    }

    #[test]
    fn test_slow_operations_collscan_only() {
        let store = create_test_store();

        let stats = store
            .fetch_slow_operations(&table(), SortColumn::Op, SortDirection::Asc, true)
            .unwrap();

        assert_eq!(stats.len(), 1);
        assert!(stats.iter().all(OperationStat::is_collscan));
    }

    #[test]
    fn test_logs_with_filters() {
        let store = create_test_store();
        let filters = LogFilters::new().with_equals(LogField::Severity, "W");

        let logs = store.fetch_logs(&table(), &filters).unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].component, "WRITE");
    }

    #[test]
    fn test_top_slow_log_lines() {
        let store = create_test_store();

        let lines = store
            .fetch_top_slow_log_lines(&table(), TopN::new(2).unwrap())
            .unwrap();

        assert_eq!(
            lines,
            vec![
                "2023-01-01T02:00:00 I  COMMAND  [conn1] msg".to_string(),
                "2023-01-01T01:00:00 I  COMMAND  [conn1] msg".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let store = create_test_store();
        let missing: TableName = "no_such_table".parse().unwrap();

        let result = store.fetch_logs(&missing, &LogFilters::new());

        assert!(matches!(result, Err(ReportError::QueryExecution(_))));
    }

    #[test]
    fn test_string_entry_points_validate() {
        let store = create_test_store();

        let result = store.slow_operations_report("logs", "count; DROP TABLE logs", "desc", false);
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::UnknownSortColumn(_)))
        ));

        let result = store.top_slow_logs_report("logs", 0);
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::TopNOutOfRange(0)))
        ));

        let result = store.logs_report("logs", &["level=W".to_string()]);
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::UnknownFilterKey(_)))
        ));
    }

    #[test]
    fn test_ping_shared_connection() {
        let store = create_test_store();
        assert!(store.ping().is_ok());
    }

    #[test]
    fn test_open_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteReportStore::open(dir.path().join("missing.db"));

        assert!(matches!(store.ping(), Err(ReportError::Connection(_))));
        assert!(matches!(
            store.fetch_logs(&table(), &LogFilters::new()),
            Err(ReportError::Connection(_))
        ));
    }

    #[test]
    fn test_error_message_leaves_cause_to_source() {
        use std::error::Error as _;

        let store = create_test_store();
        let missing: TableName = "no_such_table".parse().unwrap();

        let err = store.fetch_logs(&missing, &LogFilters::new()).unwrap_err();

        assert_eq!(err.to_string(), "Query execution failed");
        assert!(err.source().unwrap().to_string().contains("no_such_table"));
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteReportStore>();
    }
}
