// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the EventStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use cadence_config::model::StorageConfig;
use cadence_core::{
    CadenceError, EntityKind, Event, EventFilter, EventId, EventStore, StoredEvent, TimeRange,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed event store.
///
/// Wraps a [`Database`] handle and delegates to the per-stream query modules.
#[derive(Debug)]
pub struct SqliteEventStore {
    db: Database,
}

impl SqliteEventStore {
    /// Open the database named by `config` and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, CadenceError> {
        let db = Database::open_with_config(config).await?;
        debug!(path = %config.database_path, "SQLite event store opened");
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying database.
    pub async fn close(self) -> Result<(), CadenceError> {
        self.db.close().await
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, event: &Event) -> Result<EventId, CadenceError> {
        match event {
            Event::View(view) => queries::views::insert_view(&self.db, view).await,
            Event::Message(msg) => queries::messages::insert_message(&self.db, msg).await,
        }
    }

    async fn query_range(
        &self,
        kind: EntityKind,
        range: TimeRange,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        match kind {
            EntityKind::View => queries::views::views_in_range(&self.db, range).await,
            EntityKind::Message => queries::messages::messages_in_range(&self.db, range).await,
        }
    }

    async fn delete_before(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CadenceError> {
        match kind {
            EntityKind::View => queries::views::delete_views_before(&self.db, cutoff).await,
            EntityKind::Message => {
                queries::messages::delete_messages_before(&self.db, cutoff).await
            }
        }
    }

    async fn count_where(&self, filter: &EventFilter) -> Result<u64, CadenceError> {
        match filter.kind {
            EntityKind::View => queries::views::count_views(&self.db, filter).await,
            EntityKind::Message => queries::messages::count_messages(&self.db, filter).await,
        }
    }

    async fn latest_where(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<StoredEvent>, CadenceError> {
        match filter.kind {
            EntityKind::View => queries::views::latest_views(&self.db, filter, limit).await,
            EntityKind::Message => {
                queries::messages::latest_messages(&self.db, filter, limit).await
            }
        }
    }

    async fn health_check(&self) -> Result<(), CadenceError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
