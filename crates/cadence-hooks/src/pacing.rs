// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request hook that paces and rate-limits outgoing traffic.

use std::sync::Arc;

use cadence_core::RequestMeta;
use cadence_pacer::{PaceDecision, RequestPacer, classify};

use crate::hook::{RequestHook, Verdict};

/// Classifies each request and blocks the dispatching thread for its delay.
#[derive(Debug)]
pub struct PacingHook {
    pacer: Arc<RequestPacer>,
}

impl PacingHook {
    pub fn new(pacer: Arc<RequestPacer>) -> Self {
        Self { pacer }
    }
}

impl RequestHook for PacingHook {
    fn name(&self) -> &str {
        "pacing"
    }

    fn claims_budget(&self) -> bool {
        true
    }

    fn before_dispatch(&self, meta: &RequestMeta) -> Verdict {
        match self.pacer.pace_blocking(classify(meta)) {
            PaceDecision::Proceed { .. } => Verdict::Proceed,
            PaceDecision::Denied {
                category,
                retry_after,
            } => Verdict::Reject {
                category,
                retry_after,
            },
        }
    }
}
