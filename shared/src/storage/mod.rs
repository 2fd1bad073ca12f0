//! Storage access for reports.
//!
//! This module provides the `ReportStore` trait for running reports against
//! the analytical store, and the `SqliteReportStore` implementation that
//! reads the `SQLite` file written by the ingestion pipeline.

pub mod report_store;

pub use report_store::{ReportError, ReportStore, SqliteReportStore};
