// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inter-request delay shaping.
//!
//! [`RequestPacer`] decides, for every outgoing request, whether it may go out
//! and how long it must wait first. The limiter is consulted before anything
//! else; a denied request leaves the pacing state exactly as it was.
//!
//! The state remembers when the last admitted request is scheduled to leave,
//! not when it was decided. A caller that arrives while an earlier request is
//! still waiting lines up behind it, so consecutive dispatches are always at
//! least the base delay apart. The slot is a single `AtomicU64` claimed with a
//! compare-and-swap loop before sleeping; no lock is held while a caller
//! sleeps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cadence_config::model::{CadenceConfig, PacerConfig};
use cadence_core::RequestCategory;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::jitter::JitterSource;
use crate::rate_limit::RateLimiter;

const CATEGORY_BITS: u32 = 4;
const CATEGORY_MASK: u64 = (1 << CATEGORY_BITS) - 1;

/// Outcome of pacing a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceDecision {
    /// Send after waiting `delay`.
    Proceed { delay: Duration },
    /// The category is over its cap. Do not send.
    Denied {
        category: RequestCategory,
        retry_after: Duration,
    },
}

impl PaceDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, PaceDecision::Denied { .. })
    }

    /// The wait before sending, if the request was admitted.
    pub fn delay(&self) -> Option<Duration> {
        match self {
            PaceDecision::Proceed { delay } => Some(*delay),
            PaceDecision::Denied { .. } => None,
        }
    }
}

/// Shared pacing state: the last scheduled dispatch and the per-category windows.
///
/// One instance is created by whoever composes the system and handed to every
/// [`RequestPacer`] that must share a budget.
#[derive(Debug)]
pub struct PacerState {
    epoch: Instant,
    /// `0` before the first admission, else `(dispatch nanos since epoch << 4) | (category index + 1)`.
    last: AtomicU64,
    limiter: RateLimiter,
}

impl PacerState {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            epoch: Instant::now(),
            last: AtomicU64::new(0),
            limiter,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// When the last admitted request is scheduled to go out, and its category.
    pub fn last_request(&self) -> Option<(Instant, RequestCategory)> {
        self.decode(self.last.load(Ordering::Acquire))
    }

    fn encode(&self, at: Instant, category: RequestCategory) -> u64 {
        let nanos = u64::try_from(at.saturating_duration_since(self.epoch).as_nanos())
            .unwrap_or(u64::MAX)
            .min(u64::MAX >> CATEGORY_BITS);
        (nanos << CATEGORY_BITS) | (category.index() as u64 + 1)
    }

    fn decode(&self, packed: u64) -> Option<(Instant, RequestCategory)> {
        let tag = packed & CATEGORY_MASK;
        if tag == 0 {
            return None;
        }
        let category = RequestCategory::from_index((tag - 1) as usize)?;
        let at = self.epoch + Duration::from_nanos(packed >> CATEGORY_BITS);
        Some((at, category))
    }
}

/// Computes and applies per-request delays against a shared [`PacerState`].
pub struct RequestPacer {
    state: Arc<PacerState>,
    base_delay: Duration,
    repeat_extra_ms: u64,
    switch_extra_ms: u64,
    jitter: Arc<dyn JitterSource>,
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("base_delay", &self.base_delay)
            .field("repeat_extra_ms", &self.repeat_extra_ms)
            .field("switch_extra_ms", &self.switch_extra_ms)
            .finish_non_exhaustive()
    }
}

impl RequestPacer {
    pub fn new(
        state: Arc<PacerState>,
        config: &PacerConfig,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        Self {
            state,
            base_delay: Duration::from_millis(config.base_delay_ms),
            repeat_extra_ms: config.repeat_extra_ms,
            switch_extra_ms: config.switch_extra_ms,
            jitter,
        }
    }

    /// Build a pacer with fresh state from a full configuration.
    pub fn from_config(config: &CadenceConfig, jitter: Arc<dyn JitterSource>) -> Self {
        let state = Arc::new(PacerState::new(RateLimiter::new(&config.rate_limit)));
        Self::new(state, &config.pacer, jitter)
    }

    pub fn state(&self) -> &Arc<PacerState> {
        &self.state
    }

    /// Largest delay for a caller arriving after the previous dispatch.
    ///
    /// Callers that arrive while others are still queued wait longer.
    pub fn max_delay(&self) -> Duration {
        let widest = self.repeat_extra_ms.max(self.switch_extra_ms);
        self.base_delay + Duration::from_millis(widest.saturating_sub(1))
    }

    /// Admit or deny a request without waiting.
    pub fn decide(&self, category: RequestCategory) -> PaceDecision {
        let limiter = self.state.limiter();
        if !limiter.allow(category) {
            let retry_after = limiter.retry_after(category);
            warn!(
                category = %category,
                retry_after_ms = retry_after.as_millis() as u64,
                "request denied by rate limit"
            );
            return PaceDecision::Denied {
                category,
                retry_after,
            };
        }
        PaceDecision::Proceed {
            delay: self.compute_delay(category),
        }
    }

    /// Claim the next dispatch slot for `category` and return how long to wait for it.
    ///
    /// Zero for the very first request. Does not consult the rate limiter.
    pub fn compute_delay(&self, category: RequestCategory) -> Duration {
        self.compute_delay_at(category, Instant::now())
    }

    pub(crate) fn compute_delay_at(&self, category: RequestCategory, now: Instant) -> Duration {
        let mut current = self.state.last.load(Ordering::Acquire);
        loop {
            let delay = self.delay_after(self.state.decode(current), category, now);
            let dispatch_at = now.checked_add(delay).unwrap_or(now);
            let next = self.state.encode(dispatch_at, category);
            match self.state.last.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!(
                        category = %category,
                        delay_ms = delay.as_millis() as u64,
                        "request paced"
                    );
                    return delay;
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn delay_after(
        &self,
        last: Option<(Instant, RequestCategory)>,
        category: RequestCategory,
        now: Instant,
    ) -> Duration {
        let Some((last_at, last_category)) = last else {
            return Duration::ZERO;
        };
        let extra_bound = if last_category == category {
            self.repeat_extra_ms
        } else {
            self.switch_extra_ms
        };
        let required = self.base_delay + Duration::from_millis(self.jitter.pick_u64(0..extra_bound));
        match last_at.checked_duration_since(now) {
            // The previous request has not left yet: queue behind it.
            Some(queued) => queued.saturating_add(required),
            None => required.saturating_sub(now.saturating_duration_since(last_at)),
        }
    }

    /// Decide, then sleep out the delay on the tokio timer.
    pub async fn pace(&self, category: RequestCategory) -> PaceDecision {
        let decision = self.decide(category);
        if let PaceDecision::Proceed { delay } = decision {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        decision
    }

    /// Decide, then block the calling thread for the delay.
    ///
    /// For synchronous interception points that run outside the async runtime.
    pub fn pace_blocking(&self, category: RequestCategory) -> PaceDecision {
        let decision = self.decide(category);
        if let PaceDecision::Proceed { delay } = decision {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        decision
    }
}
