// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence report` command implementation.
//!
//! Every report is printed as pretty JSON, except `export` which emits CSV
//! to stdout or to the file given with `--output`.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

use cadence_analytics::{AnalyticsAggregator, write_csv};
use cadence_core::CadenceError;

/// Available reports.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    /// Totals for one local day, or for each of the last N days.
    Summary {
        /// Local date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Report the last N days instead of a single date.
        #[arg(long, conflicts_with = "date", value_parser = clap::value_parser!(u32).range(1..=366))]
        days: Option<u32>,
    },
    /// Views over the trailing window with a recent sample.
    Views {
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
    },
    /// Most viewed profiles.
    Top {
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Views of one local day bucketed by hour.
    Hourly {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Views over the trailing window as CSV.
    Export {
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// View count and latest views of one profile.
    History {
        profile_id: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Recently active conversations, latest first.
    Conversations {
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// Run one report against `aggregator`, writing the rendered result to `out`.
pub async fn run_report<W: Write>(
    aggregator: &AnalyticsAggregator,
    command: ReportCommand,
    out: &mut W,
) -> Result<(), CadenceError> {
    match command {
        ReportCommand::Summary { days: Some(days), .. } => {
            write_json(out, &aggregator.daily_summaries(days).await?)
        }
        ReportCommand::Summary { date, days: None } => {
            let date = date.unwrap_or_else(|| aggregator.clock().today());
            write_json(out, &aggregator.summary(date).await?)
        }
        ReportCommand::Views { days } => {
            write_json(out, &aggregator.views_since(days_before_now(days)?).await?)
        }
        ReportCommand::Top { days, limit } => {
            write_json(out, &aggregator.top_profiles(days, limit).await?)
        }
        ReportCommand::Hourly { date } => {
            let date = date.unwrap_or_else(|| aggregator.clock().today());
            write_json(out, &aggregator.hourly_histogram(date).await?)
        }
        ReportCommand::Export { days, output } => {
            let rows = aggregator.export_range(days).await?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path).map_err(|e| {
                        CadenceError::Internal(format!("failed to create {}: {e}", path.display()))
                    })?;
                    let written = write_csv(&rows, file)?;
                    info!(rows = written, path = %path.display(), "export written");
                    Ok(())
                }
                None => write_csv(&rows, &mut *out).map(|_| ()),
            }
        }
        ReportCommand::History { profile_id, limit } => {
            write_json(out, &aggregator.profile_history(&profile_id, limit).await?)
        }
        ReportCommand::Conversations { days, limit } => {
            write_json(out, &aggregator.recent_conversations(days, limit).await?)
        }
    }
}

fn days_before_now(days: u32) -> Result<DateTime<Utc>, CadenceError> {
    Utc::now()
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| CadenceError::Invalid(format!("{days} days reaches before the epoch range")))
}

/// Pretty-print `value` as JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
) -> Result<(), CadenceError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| CadenceError::Internal(format!("failed to encode report: {e}")))?;
    writeln!(out).map_err(|e| CadenceError::Internal(format!("failed to write report: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cadence_analytics::DayClock;
    use cadence_config::model::AnalyticsConfig;
    use cadence_core::EventStore;
    use cadence_test_utils::MemoryEventStore;
    use cadence_test_utils::events::{received, sent, view};

    use super::*;

    async fn seeded() -> (AnalyticsAggregator, NaiveDate) {
        let store = Arc::new(MemoryEventStore::new());
        let now = Utc::now();
        for id in ["A", "A", "B", "A"] {
            store.insert(&view(id, now)).await.unwrap();
        }
        store.insert(&sent("c1", now, 12)).await.unwrap();
        store.insert(&received("c1", now, 4)).await.unwrap();

        let clock = DayClock::utc();
        let aggregator = AnalyticsAggregator::new(store, &AnalyticsConfig::default())
            .with_clock(clock);
        (aggregator, clock.date_of(now))
    }

    async fn render(aggregator: &AnalyticsAggregator, command: ReportCommand) -> String {
        let mut out = Vec::new();
        run_report(aggregator, command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn summary_for_date_renders_totals() {
        let (aggregator, today) = seeded().await;
        let text = render(
            &aggregator,
            ReportCommand::Summary {
                date: Some(today),
                days: None,
            },
        )
        .await;
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["total_views"], 4);
        assert_eq!(json["unique_profiles"], 2);
        assert_eq!(json["messages_sent"], 1);
        assert_eq!(json["messages_received"], 1);
    }

    #[tokio::test]
    async fn multi_day_summary_renders_one_entry_per_day() {
        let (aggregator, _) = seeded().await;
        let text = render(
            &aggregator,
            ReportCommand::Summary {
                date: None,
                days: Some(3),
            },
        )
        .await;
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn top_profiles_are_ranked() {
        let (aggregator, _) = seeded().await;
        let text = render(&aggregator, ReportCommand::Top { days: 7, limit: 10 }).await;
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["profile_id"], "A");
        assert_eq!(json[0]["views"], 3);
        assert_eq!(json[1]["profile_id"], "B");
        assert_eq!(json[1]["views"], 1);
    }

    #[tokio::test]
    async fn export_to_stdout_is_csv() {
        let (aggregator, _) = seeded().await;
        let text = render(
            &aggregator,
            ReportCommand::Export {
                days: 30,
                output: None,
            },
        )
        .await;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("profile_id,occurred_at,source"));
        assert_eq!(lines.count(), 4);
    }

    #[tokio::test]
    async fn export_to_file_leaves_stdout_empty() {
        let (aggregator, _) = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.csv");
        let text = render(
            &aggregator,
            ReportCommand::Export {
                days: 30,
                output: Some(path.clone()),
            },
        )
        .await;
        assert!(text.is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 5);
    }

    #[tokio::test]
    async fn history_lists_only_the_profile() {
        let (aggregator, _) = seeded().await;
        let text = render(
            &aggregator,
            ReportCommand::History {
                profile_id: "B".to_string(),
                limit: 5,
            },
        )
        .await;
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["views"], 1);
        assert_eq!(json["recent"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn conversations_report_counts_messages() {
        let (aggregator, _) = seeded().await;
        let text = render(&aggregator, ReportCommand::Conversations { days: 7, limit: 5 }).await;
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json[0]["conversation_id"], "c1");
        assert_eq!(json[0]["message_count"], 2);
    }
}
