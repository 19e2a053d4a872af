// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadence - request pacing and event analytics.
//!
//! This is the binary entry point: it renders analytics reports from the
//! event store and runs retention sweeps.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod report;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use cadence_analytics::{AnalyticsAggregator, DayClock, RetentionTask};
use cadence_config::model::CadenceConfig;
use cadence_core::{CadenceError, EventStore};
use cadence_storage::SqliteEventStore;

use crate::report::{ReportCommand, run_report, write_json};

/// Cadence - request pacing and event analytics.
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render an analytics report.
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
    /// Delete events older than the retention horizon.
    Sweep {
        /// Keep running, sweeping every `analytics.sweep_interval_secs`.
        #[arg(long)]
        watch: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => cadence_config::load_and_validate_path(path),
        None => cadence_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cadence_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, config).await {
        error!(error = %e, "command failed");
        eprintln!("cadence: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: CadenceConfig) -> Result<(), CadenceError> {
    let mut stdout = std::io::stdout().lock();
    match command {
        Some(Commands::Report { report }) => {
            let (store, aggregator) = open_aggregator(&config).await?;
            let result = run_report(&aggregator, report, &mut stdout).await;
            drop(aggregator);
            close_store(store).await;
            result
        }
        Some(Commands::Sweep { watch: false }) => {
            let (store, aggregator) = open_aggregator(&config).await?;
            let result = aggregator
                .retention_sweep(config.analytics.retention())
                .await;
            drop(aggregator);
            close_store(store).await;
            write_json(&mut stdout, &result?)
        }
        Some(Commands::Sweep { watch: true }) => {
            let (store, aggregator) = open_aggregator(&config).await?;
            let cancel = shutdown::install_signal_handler();
            let task = RetentionTask::from_config(Arc::new(aggregator), &config.analytics);
            info!("sweeping until interrupted");
            task.spawn(cancel)
                .await
                .map_err(|e| CadenceError::Internal(format!("retention task panicked: {e}")))?;
            close_store(store).await;
            Ok(())
        }
        Some(Commands::Config) => write_json(&mut stdout, &config),
        None => {
            println!("cadence: use --help for available commands");
            Ok(())
        }
    }
}

/// Open the configured store and wrap it in an aggregator.
async fn open_aggregator(
    config: &CadenceConfig,
) -> Result<(Arc<SqliteEventStore>, AnalyticsAggregator), CadenceError> {
    let store = Arc::new(SqliteEventStore::open(&config.storage).await?);
    store.health_check().await?;
    let shared: Arc<dyn EventStore> = store.clone();
    let aggregator = AnalyticsAggregator::new(shared, &config.analytics)
        .with_clock(DayClock::from_config(&config.analytics));
    Ok((store, aggregator))
}

/// Checkpoint and close the store once every other handle is gone.
async fn close_store(store: Arc<SqliteEventStore>) {
    match Arc::try_unwrap(store) {
        Ok(store) => {
            if let Err(e) = store.close().await {
                error!(error = %e, "failed to close event store");
            }
        }
        Err(_) => info!("event store still shared, skipping explicit close"),
    }
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cadence={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn default_config_validates() {
        let config = cadence_config::load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.analytics.retention_days, 90);
    }

    #[test]
    fn report_subcommand_parses() {
        let cli = Cli::try_parse_from(["cadence", "report", "top", "--days", "3", "--limit", "5"])
            .unwrap();
        match cli.command {
            Some(Commands::Report { report }) => {
                assert_eq!(report, ReportCommand::Top { days: 3, limit: 5 })
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn summary_date_and_days_conflict() {
        let parsed = Cli::try_parse_from([
            "cadence", "report", "summary", "--date", "2026-03-01", "--days", "2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn days_outside_one_to_366_are_rejected() {
        for days in ["0", "367", "4000000000"] {
            let parsed = Cli::try_parse_from(["cadence", "report", "summary", "--days", days]);
            assert!(parsed.is_err(), "--days {days} should be rejected");
        }
        let parsed = Cli::try_parse_from(["cadence", "report", "views", "--days", "366"]).unwrap();
        match parsed.command {
            Some(Commands::Report { report }) => {
                assert_eq!(report, ReportCommand::Views { days: 366 })
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sweep_against_temp_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CadenceConfig::default();
        config.storage.database_path = dir.path().join("events.db").display().to_string();

        let (store, aggregator) = open_aggregator(&config).await.unwrap();
        let report = aggregator
            .retention_sweep(config.analytics.retention())
            .await
            .unwrap();
        assert_eq!(report.total(), 0);
        drop(aggregator);
        close_store(store).await;
    }
}
