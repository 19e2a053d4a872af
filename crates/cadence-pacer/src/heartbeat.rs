// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Jittered keep-alive intervals.

use std::sync::Arc;
use std::time::Duration;

use cadence_config::model::HeartbeatConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::jitter::JitterSource;

/// Draws keep-alive intervals uniformly from `[min, max]`.
pub struct HeartbeatScheduler {
    min: Duration,
    max: Duration,
    jitter: Arc<dyn JitterSource>,
}

impl HeartbeatScheduler {
    pub fn new(config: &HeartbeatConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            min: Duration::from_secs(config.min_interval_secs),
            max: Duration::from_secs(config.max_interval_secs),
            jitter,
        }
    }

    /// Interval to wait before the next keep-alive. Both bounds are reachable.
    pub fn next_interval(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(self.jitter.pick_u64(min..max.saturating_add(1)))
    }

    /// Invoke `beat` after every drawn interval until `cancel` fires.
    pub async fn run<F>(&self, cancel: CancellationToken, mut beat: F)
    where
        F: FnMut() + Send,
    {
        info!("heartbeat started");
        loop {
            let interval = self.next_interval();
            debug!(interval_ms = interval.as_millis() as u64, "next heartbeat");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => beat(),
            }
        }
        info!("heartbeat stopped");
    }
}

impl std::fmt::Debug for HeartbeatScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatScheduler")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{FixedJitter, ThreadRngJitter};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn intervals_stay_in_bounds() {
        let scheduler = HeartbeatScheduler::new(&HeartbeatConfig::default(), Arc::new(ThreadRngJitter));
        for _ in 0..1000 {
            let interval = scheduler.next_interval();
            assert!(interval >= Duration::from_secs(45));
            assert!(interval <= Duration::from_secs(90));
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let config = HeartbeatConfig::default();
        let low = HeartbeatScheduler::new(&config, Arc::new(FixedJitter::lowest()));
        let high = HeartbeatScheduler::new(&config, Arc::new(FixedJitter::highest()));
        assert_eq!(low.next_interval(), Duration::from_secs(45));
        assert_eq!(high.next_interval(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn run_beats_until_cancelled() {
        let scheduler = Arc::new(HeartbeatScheduler::new(
            &HeartbeatConfig::default(),
            Arc::new(FixedJitter::lowest()),
        ));
        let beats = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let handle = {
            let scheduler = Arc::clone(&scheduler);
            let beats = Arc::clone(&beats);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                scheduler
                    .run(cancel, move || {
                        beats.fetch_add(1, Ordering::SeqCst);
                    })
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_secs(45 * 3 + 10)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(beats.load(Ordering::SeqCst), 3);
    }
}
