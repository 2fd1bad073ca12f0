//! Loglens CLI
//!
//! Command-line interface for slow-operation and log reports over a store
//! populated from parsed database server logs.
//!
//! # Usage
//!
//! ```bash
//! loglens --help
//! loglens slow-ops hatchet_logs --order-by avg_ms --direction desc --collscan
//! loglens logs hatchet_logs component=NETWORK severity=W
//! loglens top hatchet_logs --limit 10
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::config::{StoreConfig, DB_PATH_ENV, DEFAULT_DB_PATH};
use shared::models::{LogRecord, OperationStat};
use shared::storage::{ReportStore, SqliteReportStore};
use std::io::Write;

/// Loglens CLI - slow operation and log reports
#[derive(Parser)]
#[command(name = "loglens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(short, long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate slow operations by kind, namespace and query shape
    SlowOps {
        /// Table holding the parsed log lines
        table: String,

        /// Column to sort by
        #[arg(short, long, default_value = "avg_ms")]
        order_by: String,

        /// Sort direction (asc or desc)
        #[arg(short, long, default_value = "desc")]
        direction: String,

        /// Only include operations served by a full collection scan
        #[arg(long)]
        collscan: bool,
    },
    /// List log lines matching key=value filters
    Logs {
        /// Table holding the parsed log lines
        table: String,

        /// Filters such as component=NETWORK or duration=START,END
        filters: Vec<String>,
    },
    /// Show the slowest operation log lines
    Top {
        /// Table holding the parsed log lines
        table: String,

        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Check that the store can be opened
    Ping,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::new(&cli.db_path).context("Invalid store path")?;
    let store = SqliteReportStore::open(config.path());

    let mut out = std::io::stdout().lock();
    run(&cli, &store, &mut out)
}

fn run(cli: &Cli, store: &SqliteReportStore, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Some(Commands::SlowOps {
            table,
            order_by,
            direction,
            collscan,
        }) => {
            let stats = store
                .slow_operations_report(table, order_by, direction, *collscan)
                .with_context(|| format!("Failed to fetch slow operations from '{table}'"))?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                write_op_stats(out, &stats)?;
            }
        }
        Some(Commands::Logs { table, filters }) => {
            let logs = store
                .logs_report(table, filters)
                .with_context(|| format!("Failed to fetch logs from '{table}'"))?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&logs)?)?;
            } else {
                write_logs(out, &logs)?;
            }
        }
        Some(Commands::Top { table, limit }) => {
            let lines = store
                .top_slow_logs_report(table, *limit)
                .with_context(|| format!("Failed to fetch slowest logs from '{table}'"))?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&lines)?)?;
            } else {
                for line in &lines {
                    writeln!(out, "{line}")?;
                }
            }
        }
        Some(Commands::Ping) => {
            tracing::info!(path = %cli.db_path, "Checking store");
            store.ping().context("Store is not reachable")?;
            writeln!(out, "OK")?;
        }
        None => {
            writeln!(out, "Loglens CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Use --help for usage information")?;
        }
    }

    Ok(())
}

fn write_op_stats(out: &mut impl Write, stats: &[OperationStat]) -> Result<()> {
    writeln!(
        out,
        "{:<10} {:>7} {:>10} {:>10} {:>12} {:<24} {:<16} {:>10} QUERY PATTERN",
        "OP", "COUNT", "AVG MS", "MAX MS", "TOTAL MS", "NAMESPACE", "INDEX", "RESLEN"
    )?;
    for stat in stats {
        writeln!(
            out,
            "{:<10} {:>7} {:>10.1} {:>10} {:>12} {:<24} {:<16} {:>10} {}",
            stat.op,
            stat.count,
            stat.avg_ms,
            stat.max_ms,
            stat.total_ms,
            stat.namespace,
            stat.index,
            stat.reslen,
            stat.query_pattern
        )?;
    }
    Ok(())
}

fn write_logs(out: &mut impl Write, logs: &[LogRecord]) -> Result<()> {
    for log in logs {
        writeln!(out, "{log}")?;
    }
    Ok(())
}
