// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the pacer, the event store, and the analytics layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Coarse classification of an outgoing request, used for pacing and rate limits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    ProfileFetch,
    Chat,
    Media,
    Location,
    Search,
    Favorites,
    Blocks,
    Other,
}

impl RequestCategory {
    /// Dense index in `0..RequestCategory::COUNT`, stable across releases.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`RequestCategory::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().nth(index)
    }
}

/// Metadata describing an outgoing request, as delivered by the interception hook.
///
/// Both fields are optional: hooks may fail to extract them, in which case the
/// request is classified as [`RequestCategory::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub url: Option<String>,
    pub method: Option<String>,
}

impl RequestMeta {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            method: Some(method.into()),
        }
    }
}

/// Where a profile view originated in the host application.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViewSource {
    #[default]
    Browse,
    Cascade,
    Search,
    Favorite,
}

/// Direction of a chat message relative to the local user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

/// The event streams kept by an [`EventStore`](crate::EventStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    View,
    Message,
}

/// Opaque, store-assigned sequence key of a persisted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub i64);

/// A profile was displayed to the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub profile_id: String,
    pub occurred_at: DateTime<Utc>,
    pub source: ViewSource,
}

/// A chat message was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub conversation_id: String,
    pub occurred_at: DateTime<Utc>,
    pub direction: Direction,
    pub character_count: u32,
}

/// An event about to be appended to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    View(ViewEvent),
    Message(MessageEvent),
}

impl Event {
    pub fn kind(&self) -> EntityKind {
        match self {
            Event::View(_) => EntityKind::View,
            Event::Message(_) => EntityKind::Message,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Event::View(v) => v.occurred_at,
            Event::Message(m) => m.occurred_at,
        }
    }

    /// Replace the event timestamp, keeping everything else.
    pub fn with_occurred_at(self, at: DateTime<Utc>) -> Self {
        match self {
            Event::View(v) => Event::View(ViewEvent {
                occurred_at: at,
                ..v
            }),
            Event::Message(m) => Event::Message(MessageEvent {
                occurred_at: at,
                ..m
            }),
        }
    }

    pub fn as_view(&self) -> Option<&ViewEvent> {
        match self {
            Event::View(v) => Some(v),
            Event::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Event::Message(m) => Some(m),
            Event::View(_) => None,
        }
    }
}

/// An event as read back from the store, with its sequence key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: EventId,
    pub event: Event,
}

/// Half-open time interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Everything at or after `cutoff`.
    pub fn since(cutoff: DateTime<Utc>) -> Self {
        Self {
            from: cutoff,
            to: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// The whole timeline.
    pub fn all() -> Self {
        Self {
            from: DateTime::<Utc>::MIN_UTC,
            to: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

/// Predicate for [`EventStore::count_where`](crate::EventStore::count_where).
///
/// Unset fields match everything. Fields that do not apply to the selected
/// kind (for example `direction` on views) are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub kind: EntityKind,
    pub range: TimeRange,
    pub profile_id: Option<String>,
    pub source: Option<ViewSource>,
    pub conversation_id: Option<String>,
    pub direction: Option<Direction>,
}

impl EventFilter {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            range: TimeRange::all(),
            profile_id: None,
            source: None,
            conversation_id: None,
            direction: None,
        }
    }

    pub fn within(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    pub fn profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    pub fn source(mut self, source: ViewSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Evaluate the filter against an event in memory.
    pub fn matches(&self, event: &Event) -> bool {
        if event.kind() != self.kind || !self.range.contains(event.occurred_at()) {
            return false;
        }
        match event {
            Event::View(v) => {
                self.profile_id.as_ref().is_none_or(|p| *p == v.profile_id)
                    && self.source.is_none_or(|s| s == v.source)
            }
            Event::Message(m) => {
                self.conversation_id
                    .as_ref()
                    .is_none_or(|c| *c == m.conversation_id)
                    && self.direction.is_none_or(|d| d == m.direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn category_index_round_trips() {
        for category in RequestCategory::iter() {
            assert_eq!(RequestCategory::from_index(category.index()), Some(category));
        }
        assert_eq!(RequestCategory::from_index(RequestCategory::COUNT), None);
    }

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(RequestCategory::ProfileFetch.to_string(), "profile_fetch");
        assert_eq!(
            RequestCategory::from_str("favorites").unwrap(),
            RequestCategory::Favorites
        );
        let json = serde_json::to_string(&RequestCategory::ProfileFetch).unwrap();
        assert_eq!(json, "\"profile_fetch\"");
    }

    #[test]
    fn view_source_defaults_to_browse() {
        assert_eq!(ViewSource::default(), ViewSource::Browse);
        assert_eq!(ViewSource::from_str("cascade").unwrap(), ViewSource::Cascade);
    }

    #[test]
    fn time_range_is_half_open() {
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let range = TimeRange::new(from, to);
        assert!(range.contains(from));
        assert!(!range.contains(to));
        assert!(TimeRange::since(from).contains(to));
    }

    #[test]
    fn filter_matches_by_kind_and_fields() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let view = Event::View(ViewEvent {
            profile_id: "A".into(),
            occurred_at: at,
            source: ViewSource::Search,
        });
        let message = Event::Message(MessageEvent {
            conversation_id: "c1".into(),
            occurred_at: at,
            direction: Direction::Sent,
            character_count: 12,
        });

        assert!(EventFilter::new(EntityKind::View).profile("A").matches(&view));
        assert!(!EventFilter::new(EntityKind::View).profile("B").matches(&view));
        assert!(!EventFilter::new(EntityKind::View).matches(&message));
        assert!(
            EventFilter::new(EntityKind::Message)
                .direction(Direction::Sent)
                .matches(&message)
        );
        assert!(
            !EventFilter::new(EntityKind::Message)
                .direction(Direction::Received)
                .matches(&message)
        );
    }

    #[test]
    fn with_occurred_at_only_moves_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let later = at + chrono::Duration::seconds(5);
        let event = Event::View(ViewEvent {
            profile_id: "A".into(),
            occurred_at: at,
            source: ViewSource::Browse,
        });
        let moved = event.clone().with_occurred_at(later);
        assert_eq!(moved.occurred_at(), later);
        assert_eq!(moved.as_view().unwrap().profile_id, "A");
    }
}
