// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object hook that feeds constructed profiles and messages to the recorder.

use std::sync::Arc;

use tracing::debug;

use cadence_analytics::EventRecorder;

use crate::hook::{ConstructedObject, ObjectHook};

#[derive(Debug)]
pub struct AnalyticsHook {
    recorder: Arc<EventRecorder>,
}

impl AnalyticsHook {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self { recorder }
    }
}

impl ObjectHook for AnalyticsHook {
    fn name(&self) -> &str {
        "analytics"
    }

    fn on_constructed(&self, object: &ConstructedObject) {
        match object {
            ConstructedObject::Profile {
                id: Some(id),
                source,
            } => self.recorder.record_view(id, *source),
            ConstructedObject::Message {
                conversation_id: Some(conversation_id),
                direction,
                character_count,
            } => self
                .recorder
                .record_message(conversation_id, *direction, *character_count),
            _ => debug!("constructed object without id, not recorded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Direction, EntityKind, EventFilter, EventStore, ViewSource};
    use cadence_test_utils::MemoryEventStore;

    #[tokio::test]
    async fn profiles_and_messages_are_recorded() {
        let store = Arc::new(MemoryEventStore::new());
        let recorder = Arc::new(EventRecorder::spawn(store.clone(), 16));
        let hook = AnalyticsHook::new(Arc::clone(&recorder));

        hook.on_constructed(&ConstructedObject::Profile {
            id: Some("p1".into()),
            source: ViewSource::Cascade,
        });
        hook.on_constructed(&ConstructedObject::Profile {
            id: None,
            source: ViewSource::Browse,
        });
        hook.on_constructed(&ConstructedObject::Message {
            conversation_id: Some("c1".into()),
            direction: Direction::Received,
            character_count: 42,
        });
        recorder.flush().await;

        assert_eq!(store.len().await, 2);
        let cascade = EventFilter::new(EntityKind::View).source(ViewSource::Cascade);
        assert_eq!(store.count_where(&cascade).await.unwrap(), 1);
    }
}
