//! Configuration module for loglens.
//!
//! This module contains the store location settings shared by the library
//! and the CLI.

pub mod store;

pub use store::{ConfigError, StoreConfig, DB_PATH_ENV, DEFAULT_DB_PATH};
