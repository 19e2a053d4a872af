// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile view operations.

use cadence_core::{
    CadenceError, Event, EventFilter, EventId, StoredEvent, TimeRange, ViewEvent, ViewSource,
};
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::{from_millis, parse_text, to_millis};

/// Append a view and return its sequence key.
pub async fn insert_view(db: &Database, view: &ViewEvent) -> Result<EventId, CadenceError> {
    let view = view.clone();
    db.connection()
        .call(move |conn| {
            let source: &'static str = view.source.into();
            conn.execute(
                "INSERT INTO view_events (profile_id, occurred_at, source) VALUES (?1, ?2, ?3)",
                params![view.profile_id, to_millis(view.occurred_at), source],
            )?;
            Ok(EventId(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// Views with `occurred_at` in `range`, oldest first.
pub async fn views_in_range(
    db: &Database,
    range: TimeRange,
) -> Result<Vec<StoredEvent>, CadenceError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, profile_id, occurred_at, source FROM view_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                 ORDER BY occurred_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(
                params![to_millis(range.from), to_millis(range.to)],
                view_row,
            )?;
            let mut views = Vec::new();
            for row in rows {
                views.push(row?);
            }
            Ok(views)
        })
        .await
        .map_err(map_tr_err)
}

/// The newest `limit` views matching `filter`, latest first.
pub async fn latest_views(
    db: &Database,
    filter: &EventFilter,
    limit: usize,
) -> Result<Vec<StoredEvent>, CadenceError> {
    let from = to_millis(filter.range.from);
    let to = to_millis(filter.range.to);
    let profile_id = filter.profile_id.clone();
    let source: Option<&'static str> = filter.source.map(Into::into);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, profile_id, occurred_at, source FROM view_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                   AND (?3 IS NULL OR profile_id = ?3)
                   AND (?4 IS NULL OR source = ?4)
                 ORDER BY occurred_at DESC, id DESC
                 LIMIT ?5",
            )?;
            let rows = stmt.query_map(params![from, to, profile_id, source, limit], view_row)?;
            let mut views = Vec::new();
            for row in rows {
                views.push(row?);
            }
            Ok(views)
        })
        .await
        .map_err(map_tr_err)
}

fn view_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEvent> {
    let source: String = row.get(3)?;
    Ok(StoredEvent {
        id: EventId(row.get(0)?),
        event: Event::View(ViewEvent {
            profile_id: row.get(1)?,
            occurred_at: from_millis(2, row.get(2)?)?,
            source: parse_text::<ViewSource>(3, &source)?,
        }),
    })
}

/// Delete views strictly older than `cutoff`. Returns the number removed.
pub async fn delete_views_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<u64, CadenceError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM view_events WHERE occurred_at < ?1",
                params![to_millis(cutoff)],
            )?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Count views matching the profile/source/range parts of `filter`.
pub async fn count_views(db: &Database, filter: &EventFilter) -> Result<u64, CadenceError> {
    let from = to_millis(filter.range.from);
    let to = to_millis(filter.range.to);
    let profile_id = filter.profile_id.clone();
    let source: Option<&'static str> = filter.source.map(Into::into);
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM view_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                   AND (?3 IS NULL OR profile_id = ?3)
                   AND (?4 IS NULL OR source = ?4)",
                params![from, to, profile_id, source],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
        .map_err(map_tr_err)
}
