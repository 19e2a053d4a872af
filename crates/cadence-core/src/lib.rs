// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Cadence.
//!
//! Defines the domain vocabulary (request categories, interaction events,
//! time ranges), the shared [`CadenceError`] type, and the [`EventStore`]
//! trait that persistence backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CadenceError;
pub use traits::EventStore;
pub use types::{
    Direction, EntityKind, Event, EventFilter, EventId, MessageEvent, RequestCategory,
    RequestMeta, StoredEvent, TimeRange, ViewEvent, ViewSource,
};
