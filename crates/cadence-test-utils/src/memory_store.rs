// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory event store for deterministic testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use cadence_core::{
    CadenceError, EntityKind, Event, EventFilter, EventId, EventStore, StoredEvent, TimeRange,
};

/// A Vec-backed [`EventStore`].
///
/// Ids are assigned from a single counter shared by both streams. Reads are
/// ordered by `occurred_at`, then id, matching the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: Vec<StoredEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events across both streams.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every stored event in insertion order.
    pub async fn all(&self) -> Vec<StoredEvent> {
        self.inner.lock().await.rows.clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, event: &Event) -> Result<EventId, CadenceError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = EventId(inner.next_id);
        inner.rows.push(StoredEvent {
            id,
            event: event.clone(),
        });
        Ok(id)
    }

    async fn query_range(
        &self,
        kind: EntityKind,
        range: TimeRange,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<StoredEvent> = inner
            .rows
            .iter()
            .filter(|row| row.event.kind() == kind && range.contains(row.event.occurred_at()))
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.event.occurred_at(), row.id));
        Ok(rows)
    }

    async fn delete_before(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CadenceError> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner
            .rows
            .retain(|row| row.event.kind() != kind || row.event.occurred_at() >= cutoff);
        Ok((before - inner.rows.len()) as u64)
    }

    async fn count_where(&self, filter: &EventFilter) -> Result<u64, CadenceError> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.iter().filter(|row| filter.matches(&row.event)).count() as u64)
    }

    async fn latest_where(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<StoredEvent> = inner
            .rows
            .iter()
            .filter(|row| filter.matches(&row.event))
            .cloned()
            .collect();
        rows.sort_by_key(|row| std::cmp::Reverse((row.event.occurred_at(), row.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), CadenceError> {
        Ok(())
    }
}
