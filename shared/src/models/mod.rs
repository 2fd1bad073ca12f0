//! Data models for loglens reports.
//!
//! This module contains the records produced by the reporting queries.

pub mod log;
pub mod op_stat;

pub use log::LogRecord;
pub use op_stat::{OperationStat, COLLSCAN};
