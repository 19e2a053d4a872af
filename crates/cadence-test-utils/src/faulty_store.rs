// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting event store.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cadence_core::{
    CadenceError, EntityKind, Event, EventFilter, EventId, EventStore, StoredEvent, TimeRange,
};

use crate::memory_store::MemoryEventStore;

/// Wraps a [`MemoryEventStore`], failing every call while `failing` is set and
/// sleeping `latency` before each read.
#[derive(Debug, Default)]
pub struct FaultyEventStore {
    inner: MemoryEventStore,
    failing: AtomicBool,
    latency: Option<Duration>,
    failures: AtomicU32,
}

impl FaultyEventStore {
    /// A store that rejects every call until [`set_failing(false)`](Self::set_failing).
    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// A healthy store whose reads take at least `latency`.
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Calls rejected so far.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryEventStore {
        &self.inner
    }

    fn check(&self) -> Result<(), CadenceError> {
        if self.failing.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(CadenceError::storage(std::io::Error::other(
                "injected store failure",
            )));
        }
        Ok(())
    }

    async fn lag(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl EventStore for FaultyEventStore {
    fn name(&self) -> &str {
        "faulty"
    }

    async fn insert(&self, event: &Event) -> Result<EventId, CadenceError> {
        self.check()?;
        self.inner.insert(event).await
    }

    async fn query_range(
        &self,
        kind: EntityKind,
        range: TimeRange,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        self.lag().await;
        self.check()?;
        self.inner.query_range(kind, range).await
    }

    async fn delete_before(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CadenceError> {
        self.check()?;
        self.inner.delete_before(kind, cutoff).await
    }

    async fn count_where(&self, filter: &EventFilter) -> Result<u64, CadenceError> {
        self.lag().await;
        self.check()?;
        self.inner.count_where(filter).await
    }

    async fn latest_where(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        self.lag().await;
        self.check()?;
        self.inner.latest_where(filter, limit).await
    }

    async fn health_check(&self) -> Result<(), CadenceError> {
        self.check()
    }
}
