// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category sliding-window rate limiter.
//!
//! Each category keeps the admission instants that fall inside the trailing
//! window. An admission is granted while the count is below the category cap,
//! and capacity frees up exactly `window` after each admission. Categories are
//! guarded by independent locks, so traffic in one never waits on another.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cadence_config::model::{CategoryCaps, RateLimitConfig};
use cadence_core::RequestCategory;
use strum::{EnumCount, IntoEnumIterator};
use tokio::time::Instant;
use tracing::debug;

const CATEGORIES: usize = RequestCategory::COUNT;

/// Sliding-window admission control keyed by [`RequestCategory`].
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    caps: [u32; CATEGORIES],
    admitted: [Mutex<VecDeque<Instant>>; CATEGORIES],
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_caps(config.window(), &config.caps)
    }

    pub fn with_caps(window: Duration, caps: &CategoryCaps) -> Self {
        let mut table = [0u32; CATEGORIES];
        for category in RequestCategory::iter() {
            table[category.index()] = caps.cap(category);
        }
        Self {
            window,
            caps: table,
            admitted: std::array::from_fn(|_| Mutex::new(VecDeque::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn cap(&self, category: RequestCategory) -> u32 {
        self.caps[category.index()]
    }

    /// Try to admit one request. Records the admission and returns `true` when
    /// the category is under its cap, otherwise leaves the window untouched.
    pub fn allow(&self, category: RequestCategory) -> bool {
        self.allow_at(category, Instant::now())
    }

    pub(crate) fn allow_at(&self, category: RequestCategory, now: Instant) -> bool {
        let cap = self.cap(category) as usize;
        let mut admitted = self.lock(category);
        evict(&mut admitted, now, self.window);
        if admitted.len() < cap {
            admitted.push_back(now);
            true
        } else {
            debug!(
                category = %category,
                cap,
                "rate limit reached"
            );
            false
        }
    }

    /// Admissions still available in the current window.
    pub fn remaining(&self, category: RequestCategory) -> u32 {
        let mut admitted = self.lock(category);
        evict(&mut admitted, Instant::now(), self.window);
        let used = u32::try_from(admitted.len()).unwrap_or(u32::MAX);
        self.cap(category).saturating_sub(used)
    }

    /// How long until the next admission for `category` would succeed.
    /// Zero when capacity is available now.
    pub fn retry_after(&self, category: RequestCategory) -> Duration {
        let now = Instant::now();
        let mut admitted = self.lock(category);
        evict(&mut admitted, now, self.window);
        if admitted.len() < self.cap(category) as usize {
            return Duration::ZERO;
        }
        admitted
            .front()
            .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
            .unwrap_or(self.window)
    }

    fn lock(&self, category: RequestCategory) -> MutexGuard<'_, VecDeque<Instant>> {
        self.admitted[category.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drop admissions that have aged out of the window.
fn evict(admitted: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = admitted.front() {
        if now.saturating_duration_since(*oldest) >= window {
            admitted.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn limiter(category: RequestCategory, cap: u32) -> RateLimiter {
        RateLimiter::with_caps(
            Duration::from_secs(60),
            &CategoryCaps::default().with(category, cap),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn location_cap_of_two() {
        let limiter = limiter(RequestCategory::Location, 2);
        assert!(limiter.allow(RequestCategory::Location));
        assert!(limiter.allow(RequestCategory::Location));
        assert!(!limiter.allow(RequestCategory::Location));
        assert_eq!(limiter.remaining(RequestCategory::Location), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_returns_after_window() {
        let limiter = limiter(RequestCategory::Search, 1);
        assert!(limiter.allow(RequestCategory::Search));
        assert!(!limiter.allow(RequestCategory::Search));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!limiter.allow(RequestCategory::Search));
        assert_eq!(
            limiter.retry_after(RequestCategory::Search),
            Duration::from_secs(1)
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(limiter.retry_after(RequestCategory::Search), Duration::ZERO);
        assert!(limiter.allow(RequestCategory::Search));
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_per_admission() {
        let limiter = limiter(RequestCategory::Chat, 2);
        assert!(limiter.allow(RequestCategory::Chat));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(limiter.allow(RequestCategory::Chat));
        assert!(!limiter.allow(RequestCategory::Chat));

        // Only the first admission has aged out.
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(limiter.remaining(RequestCategory::Chat), 1);
        assert!(limiter.allow(RequestCategory::Chat));
        assert!(!limiter.allow(RequestCategory::Chat));
    }

    #[tokio::test(start_paused = true)]
    async fn denial_does_not_consume_capacity() {
        let limiter = limiter(RequestCategory::Media, 1);
        assert!(limiter.allow(RequestCategory::Media));
        for _ in 0..10 {
            assert!(!limiter.allow(RequestCategory::Media));
        }
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(limiter.remaining(RequestCategory::Media), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn categories_are_independent() {
        let limiter = limiter(RequestCategory::Location, 1);
        assert!(limiter.allow(RequestCategory::Location));
        assert!(!limiter.allow(RequestCategory::Location));
        assert!(limiter.allow(RequestCategory::Chat));
        assert_eq!(limiter.remaining(RequestCategory::Chat), 99);
    }

    #[test]
    fn concurrent_admissions_never_exceed_cap() {
        let limiter = Arc::new(limiter(RequestCategory::Chat, 100));
        let granted = Arc::new(AtomicU32::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let limiter = Arc::clone(&limiter);
                let granted = Arc::clone(&granted);
                scope.spawn(move || {
                    for _ in 0..50 {
                        if limiter.allow(RequestCategory::Chat) {
                            granted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(granted.load(Ordering::Relaxed), 100);
        assert_eq!(limiter.remaining(RequestCategory::Chat), 0);
    }

    #[test]
    fn admissions_at_explicit_instants() {
        let limiter = limiter(RequestCategory::Blocks, 2);
        let start = Instant::now();
        assert!(limiter.allow_at(RequestCategory::Blocks, start));
        assert!(limiter.allow_at(RequestCategory::Blocks, start + Duration::from_secs(10)));
        assert!(!limiter.allow_at(RequestCategory::Blocks, start + Duration::from_secs(59)));
        assert!(limiter.allow_at(RequestCategory::Blocks, start + Duration::from_secs(60)));
    }
}
