// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the analytics layer and its persistence backend.

pub mod store;

pub use store::EventStore;
