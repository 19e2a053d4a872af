// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shorthand constructors for test events.

use chrono::{DateTime, TimeZone, Utc};

use cadence_core::{Direction, Event, MessageEvent, ViewEvent, ViewSource};

/// UTC instant from calendar parts.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn view(profile_id: &str, at: DateTime<Utc>) -> Event {
    view_from(profile_id, at, ViewSource::Browse)
}

pub fn view_from(profile_id: &str, at: DateTime<Utc>, source: ViewSource) -> Event {
    Event::View(ViewEvent {
        profile_id: profile_id.to_string(),
        occurred_at: at,
        source,
    })
}

pub fn sent(conversation_id: &str, at: DateTime<Utc>, characters: u32) -> Event {
    message(conversation_id, at, Direction::Sent, characters)
}

pub fn received(conversation_id: &str, at: DateTime<Utc>, characters: u32) -> Event {
    message(conversation_id, at, Direction::Received, characters)
}

fn message(conversation_id: &str, at: DateTime<Utc>, direction: Direction, characters: u32) -> Event {
    Event::Message(MessageEvent {
        conversation_id: conversation_id.to_string(),
        occurred_at: at,
        direction,
        character_count: characters,
    })
}
