// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic retention sweeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use cadence_config::model::AnalyticsConfig;

use crate::aggregator::AnalyticsAggregator;

/// Runs [`AnalyticsAggregator::retention_sweep`] on a fixed interval.
pub struct RetentionTask {
    aggregator: Arc<AnalyticsAggregator>,
    horizon: Duration,
    interval: Duration,
}

impl RetentionTask {
    pub fn new(aggregator: Arc<AnalyticsAggregator>, horizon: Duration, interval: Duration) -> Self {
        Self {
            aggregator,
            horizon,
            interval,
        }
    }

    pub fn from_config(aggregator: Arc<AnalyticsAggregator>, config: &AnalyticsConfig) -> Self {
        Self::new(aggregator, config.retention(), config.sweep_interval())
    }

    /// Sweep immediately, then once per interval, until `cancel` fires.
    /// A failed sweep is logged and retried on the next tick.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.interval.as_secs(),
            horizon_days = self.horizon.as_secs() / 86_400,
            "retention task started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.aggregator.retention_sweep(self.horizon).await {
                        Ok(report) => debug!(deleted = report.total(), "scheduled sweep finished"),
                        Err(e) => warn!(error = %e, "retention sweep failed, retrying next interval"),
                    }
                }
            }
        }
        info!("retention task stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel).instrument(tracing::info_span!("retention")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::EventStore;
    use cadence_test_utils::FaultyEventStore;
    use cadence_test_utils::events::view;
    use chrono::Utc;
    use tracing_test::traced_test;

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn failed_sweeps_are_retried() {
        let store = Arc::new(FaultyEventStore::failing());
        store.set_failing(false);
        store
            .insert(&view("old", Utc::now() - chrono::Duration::days(365)))
            .await
            .unwrap();
        store.set_failing(true);

        let aggregator = Arc::new(AnalyticsAggregator::new(
            store.clone(),
            &AnalyticsConfig::default(),
        ));
        let cancel = CancellationToken::new();
        let task = RetentionTask::new(
            aggregator,
            Duration::from_secs(90 * 86_400),
            Duration::from_secs(3600),
        )
        .spawn(cancel.clone());

        // First tick fires immediately and fails.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.failures() >= 1);
        assert_eq!(store.inner().len().await, 1);

        store.set_failing(false);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(store.inner().is_empty().await);

        cancel.cancel();
        task.await.unwrap();
        assert!(logs_contain("retention sweep failed"));
    }
}
