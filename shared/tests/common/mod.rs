//! Common test utilities and fixtures for report integration tests.
//!
//! Builds a store holding a small set of parsed server log lines, either in
//! memory or as a file on disk.

use shared::rusqlite::{params, Connection};
use shared::storage::SqliteReportStore;
use std::path::Path;

/// Table holding the fixture log lines.
pub const TABLE: &str = "hatchet_logs";

/// Table with the fixture schema but no rows.
pub const EMPTY_TABLE: &str = "empty_logs";

/// Table holding a row with a NULL `date`.
pub const MALFORMED_TABLE: &str = "malformed_logs";

const COLUMNS: &str = "date TEXT, severity TEXT, component TEXT, context TEXT, message TEXT, \
     op TEXT, ns TEXT, milli INTEGER, _index TEXT, reslen INTEGER, filter TEXT";

/// One fixture row: date, severity, component, context, message, op, ns,
/// milli, index, reslen, filter.
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i64,
    &'static str,
    i64,
    &'static str,
);

const ROWS: [Row; 7] = [
    ("2023-01-01T08:00:00", "I", "NETWORK", "conn1", "Connection accepted", "", "", 0, "", 0, ""),
    ("2023-01-01T09:00:00", "I", "COMMAND", "conn2", "Slow query", "find", "shop.orders", 1200, "COLLSCAN", 5000, "{ status: 1 }"),
    ("2023-01-01T10:00:00", "I", "COMMAND", "conn3", "Slow query", "find", "shop.orders", 800, "COLLSCAN", 3000, "{ status: 1 }"),
    ("2023-01-01T11:00:00", "W", "COMMAND", "conn4", "Slow query", "update", "shop.users", 450, "email_1", 200, "{ email: 1 }"),
    ("2023-01-02T12:00:00", "W", "NETWORK", "conn5", "Slow query", "aggregate", "shop.orders", 3000, "COLLSCAN", 9000, "{ $match: { total: 1 } }"),
    ("2023-01-02T13:00:00", "E", "STORAGE", "WTCheckpointThread", "Checkpoint failed", "", "", 0, "", 0, ""),
    ("2023-01-01T23:59:59", "W", "NETWORK", "conn6", "Client disconnected", "", "", 0, "", 0, ""),
];

/// Number of fixture rows in [`TABLE`].
pub const ROW_COUNT: usize = ROWS.len();

/// Creates the fixture tables on the given connection.
pub fn seed(conn: &Connection) {
    conn.execute_batch(&format!(
        "CREATE TABLE {TABLE} ({COLUMNS});
         CREATE TABLE {EMPTY_TABLE} ({COLUMNS});
         CREATE TABLE {MALFORMED_TABLE} ({COLUMNS});
         INSERT INTO {MALFORMED_TABLE} VALUES (NULL, 'I', 'COMMAND', 'conn1', 'x', 'find', 'db.c', 10, 'COLLSCAN', 1, '{{}}');"
    ))
    .unwrap();

    let mut stmt = conn
        .prepare(&format!(
            "INSERT INTO {TABLE} VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ))
        .unwrap();
    for row in ROWS {
        stmt.execute(params![
            row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8, row.9, row.10
        ])
        .unwrap();
    }
}

/// Creates a store backed by a seeded in-memory connection.
pub fn memory_store() -> SqliteReportStore {
    let conn = Connection::open_in_memory().unwrap();
    seed(&conn);
    SqliteReportStore::with_connection(conn)
}

/// Writes a seeded store file at `path` and returns a connection-per-call
/// store reading it.
pub fn file_store(path: &Path) -> SqliteReportStore {
    let conn = Connection::open(path).unwrap();
    seed(&conn);
    drop(conn);
    SqliteReportStore::open(path)
}
