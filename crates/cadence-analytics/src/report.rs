// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report types returned by the aggregator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use cadence_core::{ViewEvent, ViewSource};

/// Totals for one local day. Always recomputed from raw events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_views: u64,
    pub unique_profiles: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub total_characters_sent: u64,
    /// Mean received→sent latency in milliseconds, 0 when no pair closed.
    pub average_response_time_ms: u64,
}

impl DailySummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_views: 0,
            unique_profiles: 0,
            messages_sent: 0,
            messages_received: 0,
            total_characters_sent: 0,
            average_response_time_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewsReport {
    pub total_views: u64,
    pub unique_profiles: u64,
    /// Most recent first.
    pub sample_recent: Vec<ViewEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCount {
    pub profile_id: String,
    pub views: u64,
}

/// View counts per local hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HourlyHistogram {
    pub buckets: [u64; 24],
}

impl HourlyHistogram {
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// The busiest hour, earliest on ties. `None` when empty.
    pub fn peak_hour(&self) -> Option<u32> {
        let (hour, count) = self
            .buckets
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        (*count > 0).then_some(hour as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub profile_id: String,
    pub occurred_at: DateTime<Utc>,
    pub source: ViewSource,
}

impl From<ViewEvent> for ExportRow {
    fn from(view: ViewEvent) -> Self {
        Self {
            profile_id: view.profile_id,
            occurred_at: view.occurred_at,
            source: view.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationActivity {
    pub conversation_id: String,
    pub message_count: u64,
    pub first_message_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub total_characters: u64,
}

/// How often one profile was seen inside the retention horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileHistory {
    pub profile_id: String,
    pub views: u64,
    /// Most recent first.
    pub recent: Vec<ViewEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub views_deleted: u64,
    pub messages_deleted: u64,
    pub cutoff: DateTime<Utc>,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.views_deleted + self.messages_deleted
    }
}
