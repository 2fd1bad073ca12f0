//! Loglens Shared Library
//!
//! This crate contains the report models, query builders and store access
//! used to analyze slow operations in parsed database server logs.
//!
//! # Modules
//!
//! - [`models`] - Records returned by the reports
//! - [`query`] - Validated parameters and parameterized SQL builders
//! - [`storage`] - The `ReportStore` trait and its `SQLite` implementation
//! - [`config`] - Store location settings
//!
//! # Example
//!
//! ```
//! use shared::query::{LogFilters, TableName};
//!
//! let table: TableName = "hatchet_logs".parse().unwrap();
//! let filters = LogFilters::from_options(["component=NETWORK", "severity=W"]).unwrap();
//!
//! assert_eq!(table.as_str(), "hatchet_logs");
//! assert_eq!(filters.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod query;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use rusqlite;
pub use serde;
pub use serde_json;
pub use validator;
