//! Operation statistics data model.
//!
//! An `OperationStat` is one row of the slow-operation report: metrics
//! aggregated over every logged operation sharing the same kind, namespace
//! and query shape.

use serde::{Deserialize, Serialize};

/// Index sentinel written by the ingestion pipeline for full collection scans.
pub const COLLSCAN: &str = "COLLSCAN";

/// Aggregated metrics for one (operation, namespace, query shape) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStat {
    /// Operation kind (e.g. `find`, `update`, `aggregate`).
    pub op: String,

    /// Number of log lines in the group.
    pub count: u64,

    /// Average duration in milliseconds, rounded to one decimal place.
    pub avg_ms: f64,

    /// Maximum duration in milliseconds.
    pub max_ms: i64,

    /// Summed duration in milliseconds.
    pub total_ms: i64,

    /// Target namespace (`database.collection`).
    pub namespace: String,

    /// Index used to serve the operation, or [`COLLSCAN`].
    pub index: String,

    /// Summed response length in bytes.
    pub reslen: i64,

    /// Normalized query shape fingerprint.
    pub query_pattern: String,
}

impl OperationStat {
    /// Returns true if the group was served by a full collection scan.
    #[must_use]
    pub fn is_collscan(&self) -> bool {
        self.index == COLLSCAN
    }
}
