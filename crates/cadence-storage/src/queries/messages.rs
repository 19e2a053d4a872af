// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message event operations.

use cadence_core::{
    CadenceError, Direction, Event, EventFilter, EventId, MessageEvent, StoredEvent, TimeRange,
};
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::{from_millis, parse_text, to_millis};

/// Append a message event and return its sequence key.
pub async fn insert_message(db: &Database, msg: &MessageEvent) -> Result<EventId, CadenceError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let direction: &'static str = msg.direction.into();
            conn.execute(
                "INSERT INTO message_events (conversation_id, occurred_at, direction, character_count)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    msg.conversation_id,
                    to_millis(msg.occurred_at),
                    direction,
                    msg.character_count,
                ],
            )?;
            Ok(EventId(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// Message events with `occurred_at` in `range`, oldest first.
pub async fn messages_in_range(
    db: &Database,
    range: TimeRange,
) -> Result<Vec<StoredEvent>, CadenceError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, occurred_at, direction, character_count
                 FROM message_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                 ORDER BY occurred_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(
                params![to_millis(range.from), to_millis(range.to)],
                message_row,
            )?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// The newest `limit` message events matching `filter`, latest first.
pub async fn latest_messages(
    db: &Database,
    filter: &EventFilter,
    limit: usize,
) -> Result<Vec<StoredEvent>, CadenceError> {
    let from = to_millis(filter.range.from);
    let to = to_millis(filter.range.to);
    let conversation_id = filter.conversation_id.clone();
    let direction: Option<&'static str> = filter.direction.map(Into::into);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, occurred_at, direction, character_count
                 FROM message_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                   AND (?3 IS NULL OR conversation_id = ?3)
                   AND (?4 IS NULL OR direction = ?4)
                 ORDER BY occurred_at DESC, id DESC
                 LIMIT ?5",
            )?;
            let rows = stmt.query_map(
                params![from, to, conversation_id, direction, limit],
                message_row,
            )?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

fn message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEvent> {
    let direction: String = row.get(3)?;
    Ok(StoredEvent {
        id: EventId(row.get(0)?),
        event: Event::Message(MessageEvent {
            conversation_id: row.get(1)?,
            occurred_at: from_millis(2, row.get(2)?)?,
            direction: parse_text::<Direction>(3, &direction)?,
            character_count: row.get(4)?,
        }),
    })
}

/// Delete message events strictly older than `cutoff`. Returns the number removed.
pub async fn delete_messages_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<u64, CadenceError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM message_events WHERE occurred_at < ?1",
                params![to_millis(cutoff)],
            )?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Count message events matching the conversation/direction/range parts of `filter`.
pub async fn count_messages(db: &Database, filter: &EventFilter) -> Result<u64, CadenceError> {
    let from = to_millis(filter.range.from);
    let to = to_millis(filter.range.to);
    let conversation_id = filter.conversation_id.clone();
    let direction: Option<&'static str> = filter.direction.map(Into::into);
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM message_events
                 WHERE occurred_at >= ?1 AND occurred_at < ?2
                   AND (?3 IS NULL OR conversation_id = ?3)
                   AND (?4 IS NULL OR direction = ?4)",
                params![from, to, conversation_id, direction],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::EntityKind;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn msg(conversation: &str, millis: i64, direction: Direction, chars: u32) -> MessageEvent {
        MessageEvent {
            conversation_id: conversation.to_string(),
            occurred_at: at(millis),
            direction,
            character_count: chars,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back_in_order() {
        let db = Database::open_in_memory().await.unwrap();
        insert_message(&db, &msg("c1", 2_000, Direction::Sent, 12)).await.unwrap();
        insert_message(&db, &msg("c1", 1_000, Direction::Received, 40)).await.unwrap();

        let rows = messages_in_range(&db, TimeRange::all()).await.unwrap();
        let got: Vec<&MessageEvent> = rows.iter().filter_map(|r| r.event.as_message()).collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].direction, Direction::Received);
        assert_eq!(got[0].character_count, 40);
        assert_eq!(got[1].direction, Direction::Sent);
        assert_eq!(got[1].occurred_at, at(2_000));
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let db = Database::open_in_memory().await.unwrap();
        insert_message(&db, &msg("c1", 1_000, Direction::Received, 1)).await.unwrap();
        insert_message(&db, &msg("c1", 1_000, Direction::Sent, 2)).await.unwrap();

        let rows = messages_in_range(&db, TimeRange::all()).await.unwrap();
        assert!(rows[0].id < rows[1].id);
        assert_eq!(rows[0].event.as_message().unwrap().direction, Direction::Received);
    }

    #[tokio::test]
    async fn count_and_delete() {
        let db = Database::open_in_memory().await.unwrap();
        insert_message(&db, &msg("c1", 1_000, Direction::Sent, 5)).await.unwrap();
        insert_message(&db, &msg("c2", 2_000, Direction::Sent, 5)).await.unwrap();
        insert_message(&db, &msg("c2", 3_000, Direction::Received, 5)).await.unwrap();

        let sent = EventFilter::new(EntityKind::Message).direction(Direction::Sent);
        assert_eq!(count_messages(&db, &sent).await.unwrap(), 2);
        let c2 = EventFilter::new(EntityKind::Message).conversation("c2");
        assert_eq!(count_messages(&db, &c2).await.unwrap(), 2);

        assert_eq!(delete_messages_before(&db, at(2_500)).await.unwrap(), 2);
        assert_eq!(
            count_messages(&db, &EventFilter::new(EntityKind::Message)).await.unwrap(),
            1
        );
    }
}
