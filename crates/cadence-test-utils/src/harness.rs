// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary SQLite store for end-to-end tests.

use std::sync::Arc;

use cadence_config::model::StorageConfig;
use cadence_core::CadenceError;
use cadence_storage::SqliteEventStore;
use tempfile::TempDir;

/// A [`SqliteEventStore`] living in a temp directory that is removed on drop.
pub struct TempSqlite {
    pub store: Arc<SqliteEventStore>,
    pub config: StorageConfig,
    _dir: TempDir,
}

impl TempSqlite {
    pub async fn new() -> Result<Self, CadenceError> {
        let dir = tempfile::tempdir().map_err(CadenceError::storage)?;
        let config = StorageConfig {
            database_path: dir.path().join("cadence-test.db").display().to_string(),
            wal_mode: true,
        };
        let store = Arc::new(SqliteEventStore::open(&config).await?);
        Ok(Self {
            store,
            config,
            _dir: dir,
        })
    }
}
