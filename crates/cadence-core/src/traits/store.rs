// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only event storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CadenceError;
use crate::types::{EntityKind, Event, EventFilter, EventId, StoredEvent, TimeRange};

/// Durable, append-only storage for interaction events.
///
/// Implementations must preserve append order and support range scans by
/// timestamp. Events are never updated in place; the only removal path is
/// [`delete_before`](EventStore::delete_before).
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Append an event, returning its sequence key.
    async fn insert(&self, event: &Event) -> Result<EventId, CadenceError>;

    /// Events of `kind` with `occurred_at` in `range`, ordered by timestamp
    /// and then by sequence key.
    async fn query_range(
        &self,
        kind: EntityKind,
        range: TimeRange,
    ) -> Result<Vec<StoredEvent>, CadenceError>;

    /// Delete events of `kind` strictly older than `cutoff`. Returns the
    /// number of rows removed.
    async fn delete_before(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CadenceError>;

    /// The newest `limit` events matching `filter`, latest first (timestamp,
    /// then sequence key, both descending).
    async fn latest_where(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<StoredEvent>, CadenceError>;

    /// Count events matching `filter`.
    async fn count_where(&self, filter: &EventFilter) -> Result<u64, CadenceError>;

    /// Cheap liveness check.
    async fn health_check(&self) -> Result<(), CadenceError>;
}
