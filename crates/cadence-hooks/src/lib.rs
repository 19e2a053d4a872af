// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interception hooks for Cadence.
//!
//! The host installs interception of outgoing requests and object
//! construction and forwards each callback to a [`HookRegistry`]. Two
//! adapters are provided: [`PacingHook`] for traffic shaping and
//! [`AnalyticsHook`] for event recording.

pub mod analytics;
pub mod hook;
pub mod pacing;
pub mod registry;

pub use analytics::AnalyticsHook;
pub use hook::{ConstructedObject, ObjectHook, RequestHook, Verdict};
pub use pacing::PacingHook;
pub use registry::HookRegistry;
