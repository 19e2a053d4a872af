// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cadence integration tests.
//!
//! Provides in-memory and fault-injecting event stores plus a temp-file
//! SQLite harness, so analytics and hook tests run fast and deterministically.
//!
//! # Components
//!
//! - [`MemoryEventStore`] - Vec-backed store with the same ordering rules as SQLite
//! - [`FaultyEventStore`] - Wraps a memory store with switchable failures and latency
//! - [`TempSqlite`] - A real SQLite store in a temporary directory

pub mod events;
pub mod faulty_store;
pub mod harness;
pub mod memory_store;

pub use faulty_store::FaultyEventStore;
pub use harness::TempSqlite;
pub use memory_store::MemoryEventStore;
