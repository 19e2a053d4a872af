// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side reports over the event log.
//!
//! Every report reads a snapshot of the relevant streams through the
//! [`EventStore`] and computes the result in memory. Reads are bounded by the
//! configured query timeout; store failures are returned, never swallowed.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use cadence_config::model::AnalyticsConfig;
use cadence_core::{
    CadenceError, EntityKind, EventFilter, EventStore, MessageEvent, StoredEvent, TimeRange,
    ViewEvent,
};

use crate::clock::DayClock;
use crate::compute;
use crate::report::{
    ConversationActivity, DailySummary, ExportRow, HourlyHistogram, ProfileCount, ProfileHistory,
    SweepReport, ViewsReport,
};

/// Computes reports from an [`EventStore`].
pub struct AnalyticsAggregator {
    store: Arc<dyn EventStore>,
    clock: DayClock,
    query_timeout: Duration,
    sample_size: usize,
    retention: Duration,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn EventStore>, config: &AnalyticsConfig) -> Self {
        Self {
            store,
            clock: DayClock::from_config(config),
            query_timeout: config.query_timeout(),
            sample_size: config.recent_sample_size,
            retention: config.retention(),
        }
    }

    /// Override the day clock (tests pin UTC).
    pub fn with_clock(mut self, clock: DayClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> DayClock {
        self.clock
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Totals for one local day. Zero-valued when nothing happened.
    pub async fn summary(&self, date: NaiveDate) -> Result<DailySummary, CadenceError> {
        let range = self.clock.day_range(date);
        let (views, messages) = self
            .bounded(async {
                let views = self.store.query_range(EntityKind::View, range).await?;
                let messages = self.store.query_range(EntityKind::Message, range).await?;
                Ok::<_, CadenceError>((views, messages))
            })
            .await?;
        Ok(compute::summarize_day(
            date,
            view_events(&views),
            message_events(&messages),
        ))
    }

    /// Summaries for the last `days` local days, newest first.
    pub async fn daily_summaries(&self, days: u32) -> Result<Vec<DailySummary>, CadenceError> {
        let today = self.clock.today();
        let mut summaries = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let Some(date) = today.checked_sub_days(chrono::Days::new(u64::from(offset))) else {
                break;
            };
            summaries.push(self.summary(date).await?);
        }
        Ok(summaries)
    }

    /// Views at or after `cutoff`, with a sample of the most recent ones.
    pub async fn views_since(&self, cutoff: DateTime<Utc>) -> Result<ViewsReport, CadenceError> {
        let views = self
            .bounded(self.store.query_range(EntityKind::View, TimeRange::since(cutoff)))
            .await?;
        let events: Vec<&ViewEvent> = view_events(&views).collect();
        let unique: HashSet<&str> = events.iter().map(|v| v.profile_id.as_str()).collect();

        Ok(ViewsReport {
            total_views: events.len() as u64,
            unique_profiles: unique.len() as u64,
            sample_recent: events
                .iter()
                .rev()
                .take(self.sample_size)
                .map(|v| (*v).clone())
                .collect(),
        })
    }

    /// Most viewed profiles over the trailing `window_days`.
    pub async fn top_profiles(
        &self,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<ProfileCount>, CadenceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let views = self
            .bounded(
                self.store
                    .query_range(EntityKind::View, TimeRange::since(days_ago(window_days))),
            )
            .await?;
        Ok(compute::rank_profiles(view_events(&views), limit))
    }

    /// Views of one local day bucketed by local hour.
    pub async fn hourly_histogram(&self, date: NaiveDate) -> Result<HourlyHistogram, CadenceError> {
        let views = self
            .bounded(
                self.store
                    .query_range(EntityKind::View, self.clock.day_range(date)),
            )
            .await?;
        Ok(compute::hourly_histogram(view_events(&views), &self.clock))
    }

    /// Views over the trailing `window_days`, oldest first.
    pub async fn export_range(&self, window_days: u32) -> Result<Vec<ExportRow>, CadenceError> {
        let views = self
            .bounded(
                self.store
                    .query_range(EntityKind::View, TimeRange::since(days_ago(window_days))),
            )
            .await?;
        let rows: Vec<ExportRow> = view_events(&views).cloned().map(ExportRow::from).collect();
        debug!(rows = rows.len(), window_days, "export prepared");
        Ok(rows)
    }

    /// View count within the retention horizon plus the latest `limit` views.
    pub async fn profile_history(
        &self,
        profile_id: &str,
        limit: usize,
    ) -> Result<ProfileHistory, CadenceError> {
        let range = TimeRange::since(cutoff_for(self.retention)?);
        let filter = EventFilter::new(EntityKind::View)
            .within(range)
            .profile(profile_id);
        let (views, rows) = self
            .bounded(async {
                let count = self.store.count_where(&filter).await?;
                let rows = self.store.latest_where(&filter, limit).await?;
                Ok::<_, CadenceError>((count, rows))
            })
            .await?;

        let recent: Vec<ViewEvent> = view_events(&rows).cloned().collect();

        Ok(ProfileHistory {
            profile_id: profile_id.to_string(),
            views,
            recent,
        })
    }

    /// Conversations active over the trailing `window_days`, latest first.
    pub async fn recent_conversations(
        &self,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<ConversationActivity>, CadenceError> {
        let messages = self
            .bounded(
                self.store
                    .query_range(EntityKind::Message, TimeRange::since(days_ago(window_days))),
            )
            .await?;
        let mut activity = compute::conversation_activity(message_events(&messages));
        activity.truncate(limit);
        Ok(activity)
    }

    /// Delete events of both kinds older than `now - horizon`.
    ///
    /// Idempotent: a second sweep over the same horizon removes nothing.
    pub async fn retention_sweep(&self, horizon: Duration) -> Result<SweepReport, CadenceError> {
        let cutoff = cutoff_for(horizon)?;
        let views_deleted = self.store.delete_before(EntityKind::View, cutoff).await?;
        let messages_deleted = self.store.delete_before(EntityKind::Message, cutoff).await?;
        let report = SweepReport {
            views_deleted,
            messages_deleted,
            cutoff,
        };
        info!(
            views_deleted,
            messages_deleted,
            cutoff = %cutoff.to_rfc3339(),
            "retention sweep complete"
        );
        Ok(report)
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, CadenceError>>,
    ) -> Result<T, CadenceError> {
        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| CadenceError::Timeout {
                duration: self.query_timeout,
            })?
    }
}

fn view_events(rows: &[StoredEvent]) -> impl DoubleEndedIterator<Item = &ViewEvent> {
    rows.iter().filter_map(|row| row.event.as_view())
}

fn message_events(rows: &[StoredEvent]) -> impl Iterator<Item = &MessageEvent> {
    rows.iter().filter_map(|row| row.event.as_message())
}

fn days_ago(days: u32) -> DateTime<Utc> {
    let now = Utc::now();
    now.checked_sub_days(chrono::Days::new(u64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn cutoff_for(horizon: Duration) -> Result<DateTime<Utc>, CadenceError> {
    let horizon = chrono::Duration::from_std(horizon)
        .map_err(|e| CadenceError::Invalid(format!("retention horizon out of range: {e}")))?;
    Ok(Utc::now()
        .checked_sub_signed(horizon)
        .unwrap_or(DateTime::<Utc>::MIN_UTC))
}
