// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event recording.
//!
//! Callers hand events to [`EventRecorder`], which queues them on a bounded
//! channel without waiting. A single worker task drains the queue in FIFO
//! order and appends to the [`EventStore`]. Persistence problems are logged
//! and dropped; they never reach the code that observed the event.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use cadence_core::{
    Direction, EntityKind, Event, EventStore, MessageEvent, ViewEvent, ViewSource,
};

enum Command {
    Record(Event),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the background recording worker.
pub struct EventRecorder {
    tx: mpsc::Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventRecorder {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn EventStore>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = RecorderWorker {
            store,
            last_view_at: None,
            last_message_at: None,
        };
        let handle = tokio::spawn(
            worker
                .run(rx)
                .instrument(tracing::info_span!("event_recorder")),
        );
        Self {
            tx,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Record that `profile_id` was displayed, stamped with the current time.
    pub fn record_view(&self, profile_id: &str, source: ViewSource) {
        self.record(Event::View(ViewEvent {
            profile_id: profile_id.to_string(),
            occurred_at: Utc::now(),
            source,
        }));
    }

    /// Record a chat message, stamped with the current time.
    pub fn record_message(&self, conversation_id: &str, direction: Direction, character_count: u32) {
        self.record(Event::Message(MessageEvent {
            conversation_id: conversation_id.to_string(),
            occurred_at: Utc::now(),
            direction,
            character_count,
        }));
    }

    /// Queue an already stamped event. Never blocks.
    pub fn record(&self, event: Event) {
        let id = match &event {
            Event::View(v) => v.profile_id.as_str(),
            Event::Message(m) => m.conversation_id.as_str(),
        };
        if id.trim().is_empty() {
            debug!(kind = %event.kind(), "ignoring event without an id");
            return;
        }

        let kind = event.kind();
        match self.tx.try_send(Command::Record(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(kind = %kind, "recorder queue full, event dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(kind = %kind, "recorder stopped, event dropped");
            }
        }
    }

    /// Wait until every event queued before this call has been handled.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).await.is_err() {
            return;
        }
        let _ = done.await;
    }

    /// Drain the queue and stop the worker. Later records are dropped with a warning.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "recorder worker ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for EventRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder")
            .field("queued", &(self.tx.max_capacity() - self.tx.capacity()))
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

struct RecorderWorker {
    store: Arc<dyn EventStore>,
    last_view_at: Option<DateTime<Utc>>,
    last_message_at: Option<DateTime<Utc>>,
}

impl RecorderWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        debug!(store = self.store.name(), "recorder started");
        while let Some(command) = rx.recv().await {
            match command {
                Command::Record(event) => self.persist(event).await,
                Command::Flush(ack) => {
                    let _ = ack.send(());
                }
                Command::Shutdown(ack) => {
                    rx.close();
                    while let Some(command) = rx.recv().await {
                        match command {
                            Command::Record(event) => self.persist(event).await,
                            Command::Flush(ack) | Command::Shutdown(ack) => {
                                let _ = ack.send(());
                            }
                        }
                    }
                    let _ = ack.send(());
                    break;
                }
            }
        }
        info!("recorder stopped");
    }

    async fn persist(&mut self, event: Event) {
        let event = self.clamp(event);
        let kind = event.kind();
        if let Err(e) = self.store.insert(&event).await {
            warn!(kind = %kind, error = %e, "failed to record event");
        }
    }

    /// Keep each stream's timestamps non-decreasing in insertion order.
    fn clamp(&mut self, event: Event) -> Event {
        let last = match event.kind() {
            EntityKind::View => &mut self.last_view_at,
            EntityKind::Message => &mut self.last_message_at,
        };
        let at = event.occurred_at();
        match *last {
            Some(previous) if at < previous => {
                debug!(
                    behind_ms = (previous - at).num_milliseconds(),
                    "clamping regressed event timestamp"
                );
                event.with_occurred_at(previous)
            }
            _ => {
                *last = Some(at);
                event
            }
        }
    }
}
