// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Cadence.

use thiserror::Error;

/// The primary error type used across Cadence crates.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Event store errors (connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A query did not complete within its time budget.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A caller supplied an argument the operation cannot honor.
    #[error("invalid argument: {0}")]
    Invalid(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// True for failures caused by the event store being unreachable or broken.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}
