//! Report query building.
//!
//! This module turns validated report parameters into parameterized SQL for
//! the three reports: slow-operation aggregation, filtered log listing, and
//! the slowest log lines.
//!
//! # Example
//!
//! ```
//! use shared::query::{slow_operations_query, SortColumn, SortDirection, TableName};
//!
//! let table: TableName = "hatchet_logs".parse().unwrap();
//! let query = slow_operations_query(&table, SortColumn::AvgMs, SortDirection::Desc, true);
//!
//! assert!(query.sql.contains("_index = ?"));
//! assert_eq!(query.params.len(), 1);
//! ```

mod builder;
mod filter;
mod params;

pub use builder::{logs_query, slow_operations_query, top_slow_logs_query, SqlQuery, LOG_COLUMNS};
pub use filter::{LogField, LogFilter, LogFilters, TimeRange, DURATION_KEY};
pub use params::{
    SortColumn, SortDirection, TableName, TopN, ValidationError, MAX_TABLE_NAME_LEN, MAX_TOP_N,
};
