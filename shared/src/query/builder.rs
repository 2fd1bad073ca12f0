//! SQL text builders for the report queries.
//!
//! Every value is bound as a positional parameter. Only validated
//! identifiers ([`TableName`], [`SortColumn`], [`SortDirection`]) are spliced
//! into the query text.

use super::filter::{LogFilter, LogFilters};
use super::params::{SortColumn, SortDirection, TableName, TopN};
use crate::models::COLLSCAN;
use rusqlite::types::Value as SqlValue;

/// Columns selected for every log line report, in `LogRecord` field order.
pub const LOG_COLUMNS: &str = "date, severity, component, context, message";

/// A query string together with the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Values bound to the placeholders, in order.
    pub params: Vec<SqlValue>,
}

impl SqlQuery {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

/// Builds the slow-operation aggregation.
///
/// Rows with an empty operation kind are excluded. When `collscan_only` is
/// set, only groups whose index equals [`COLLSCAN`] are kept. Ties on the
/// sort column fall back to `op, ns, query_pattern` so the order is stable.
#[must_use]
pub fn slow_operations_query(
    table: &TableName,
    order_by: SortColumn,
    direction: SortDirection,
    collscan_only: bool,
) -> SqlQuery {
    let mut conditions = vec!["op != ''"];
    if collscan_only {
        conditions.push("_index = ?");
    }

    let sql = format!(
        "SELECT op, COUNT(*) AS \"count\", ROUND(AVG(milli), 1) AS avg_ms, \
         MAX(milli) AS max_ms, SUM(milli) AS total_ms, ns, _index AS \"index\", \
         SUM(reslen) AS reslen, filter AS query_pattern \
         FROM {table} WHERE {conditions} GROUP BY op, ns, filter \
         ORDER BY {column} {direction}, op, ns, query_pattern",
        table = table.quoted(),
        conditions = conditions.join(" AND "),
        column = order_by.as_sql(),
        direction = direction.as_sql(),
    );

    let mut query = SqlQuery::new(sql);
    if collscan_only {
        query.params.push(SqlValue::Text(COLLSCAN.to_string()));
    }
    query
}

/// Builds the filtered log listing.
///
/// Filters are conjoined with `AND` in order. With no filters the whole
/// table is selected.
#[must_use]
pub fn logs_query(table: &TableName, filters: &LogFilters) -> SqlQuery {
    let mut query = SqlQuery::new(format!("SELECT {LOG_COLUMNS} FROM {}", table.quoted()));

    let mut conditions = Vec::with_capacity(filters.len());
    for filter in filters {
        match filter {
            LogFilter::Equals { field, value } => {
                conditions.push(format!("{} = ?", field.column()));
                query.params.push(SqlValue::Text(value.clone()));
            }
            LogFilter::Duration(range) => {
                conditions.push("date BETWEEN ? AND ?".to_string());
                query.params.push(SqlValue::Text(range.start().to_string()));
                query.params.push(SqlValue::Text(range.end().to_string()));
            }
        }
    }

    if !conditions.is_empty() {
        query.sql.push_str(" WHERE ");
        query.sql.push_str(&conditions.join(" AND "));
    }
    query
}

/// Builds the slowest-operations log listing, longest duration first.
#[must_use]
pub fn top_slow_logs_query(table: &TableName, top_n: TopN) -> SqlQuery {
    let sql = format!(
        "SELECT {LOG_COLUMNS} FROM {} WHERE op != '' ORDER BY milli DESC, date ASC LIMIT ?",
        table.quoted()
    );

    let mut query = SqlQuery::new(sql);
    query
        .params
        .push(SqlValue::Integer(i64::try_from(top_n.get()).unwrap_or(i64::MAX)));
    query
}
