// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callback shapes invoked by the host's interception layer.

use std::time::Duration;

use serde::Serialize;

use cadence_core::{Direction, RequestCategory, RequestMeta, ViewSource};

/// What the interception layer should do with an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Proceed,
    Reject {
        category: RequestCategory,
        retry_after: Duration,
    },
}

impl Verdict {
    pub fn is_reject(&self) -> bool {
        matches!(self, Verdict::Reject { .. })
    }
}

/// An object the host just materialized from a response.
///
/// Identifiers are optional because extraction from host objects can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructedObject {
    Profile {
        id: Option<String>,
        source: ViewSource,
    },
    Message {
        conversation_id: Option<String>,
        direction: Direction,
        character_count: u32,
    },
}

/// Invoked synchronously before a request is dispatched. May block.
pub trait RequestHook: Send + Sync {
    fn name(&self) -> &str;

    fn before_dispatch(&self, meta: &RequestMeta) -> Verdict;

    /// True when a `Proceed` verdict spends shared budget (a rate-limit
    /// admission, a dispatch slot). Such hooks run after all others.
    fn claims_budget(&self) -> bool {
        false
    }
}

/// Invoked after a profile or message object is constructed. Must not block.
pub trait ObjectHook: Send + Sync {
    fn name(&self) -> &str;

    fn on_constructed(&self, object: &ConstructedObject);
}
