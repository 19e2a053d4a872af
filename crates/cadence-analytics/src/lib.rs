// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction analytics for Cadence.
//!
//! - [`EventRecorder`] appends profile views and chat messages to an
//!   [`EventStore`](cadence_core::EventStore) off the caller's path.
//! - [`AnalyticsAggregator`] answers reporting queries (daily summaries,
//!   top profiles, hourly histograms, exports) and performs retention sweeps.
//! - [`RetentionTask`] schedules sweeps in the background.

pub mod aggregator;
pub mod clock;
pub mod compute;
pub mod export;
pub mod recorder;
pub mod report;
pub mod retention;

pub use aggregator::AnalyticsAggregator;
pub use clock::DayClock;
pub use export::write_csv;
pub use recorder::EventRecorder;
pub use report::{
    ConversationActivity, DailySummary, ExportRow, HourlyHistogram, ProfileCount, ProfileHistory,
    SweepReport, ViewsReport,
};
pub use retention::RetentionTask;
