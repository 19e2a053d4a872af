// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gradual location movement.
//!
//! Instead of jumping to a requested position, each accepted update moves a
//! random fraction of the remaining distance. Updates arriving before the
//! randomly drawn minimum gap has elapsed are answered with the current point.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cadence_config::model::LocationConfig;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::jitter::JitterSource;

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Planar distance in degree space. Only used to compare progress.
    pub fn distance_to(&self, other: GeoPoint) -> f64 {
        (self.latitude - other.latitude).hypot(self.longitude - other.longitude)
    }

    /// The point `fraction` of the way from `self` to `target`.
    pub fn toward(&self, target: GeoPoint, fraction: f64) -> GeoPoint {
        let f = fraction.clamp(0.0, 1.0);
        GeoPoint {
            latitude: self.latitude + (target.latitude - self.latitude) * f,
            longitude: self.longitude + (target.longitude - self.longitude) * f,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Gate {
    accepted_at: Instant,
    required_gap: Duration,
}

/// Smooths location updates toward a target.
pub struct LocationSmoother {
    min_interval: Duration,
    max_interval: Duration,
    min_fraction: f64,
    max_fraction: f64,
    jitter: Arc<dyn JitterSource>,
    gate: Mutex<Option<Gate>>,
}

impl LocationSmoother {
    pub fn new(config: &LocationConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            min_interval: Duration::from_secs(config.min_interval_secs),
            max_interval: Duration::from_secs(config.max_interval_secs),
            min_fraction: config.min_step_fraction,
            max_fraction: config.max_step_fraction,
            jitter,
            gate: Mutex::new(None),
        }
    }

    /// Next point to report when heading from `current` to `target`.
    ///
    /// The first call is always accepted. Later calls inside the required gap
    /// return `current` unchanged.
    pub fn step(&self, target: GeoPoint, current: GeoPoint) -> GeoPoint {
        self.step_at(target, current, Instant::now())
    }

    pub(crate) fn step_at(&self, target: GeoPoint, current: GeoPoint, now: Instant) -> GeoPoint {
        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = *gate {
            let waited = now.saturating_duration_since(previous.accepted_at);
            if waited < previous.required_gap {
                debug!(
                    waited_ms = waited.as_millis() as u64,
                    required_ms = previous.required_gap.as_millis() as u64,
                    "location update held back"
                );
                return current;
            }
        }

        let fraction = self.jitter.pick_f64(self.min_fraction..self.max_fraction);
        let next = current.toward(target, fraction);
        *gate = Some(Gate {
            accepted_at: now,
            required_gap: self.draw_gap(),
        });
        next
    }

    fn draw_gap(&self) -> Duration {
        let min = self.min_interval.as_millis() as u64;
        let max = self.max_interval.as_millis() as u64;
        Duration::from_millis(self.jitter.pick_u64(min..max.saturating_add(1)))
    }
}

impl std::fmt::Debug for LocationSmoother {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSmoother")
            .field("min_interval", &self.min_interval)
            .field("max_interval", &self.max_interval)
            .field("min_fraction", &self.min_fraction)
            .field("max_fraction", &self.max_fraction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{FixedJitter, SeededJitter};
    use proptest::prelude::*;

    fn smoother(jitter: impl JitterSource + 'static) -> LocationSmoother {
        LocationSmoother::new(&LocationConfig::default(), Arc::new(jitter))
    }

    #[tokio::test(start_paused = true)]
    async fn first_update_moves_partway() {
        let s = smoother(FixedJitter::lowest());
        let next = s.step(GeoPoint::new(10.0, 10.0), GeoPoint::new(0.0, 0.0));
        assert!((next.latitude - 3.0).abs() < 1e-9);
        assert!((next.longitude - 3.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn updates_inside_gap_are_held() {
        let s = smoother(FixedJitter::lowest());
        let target = GeoPoint::new(10.0, 0.0);
        let first = s.step(target, GeoPoint::new(0.0, 0.0));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(s.step(target, first), first);

        tokio::time::advance(Duration::from_secs(1)).await;
        let second = s.step(target, first);
        assert!(second.distance_to(target) < first.distance_to(target));
    }

    #[tokio::test(start_paused = true)]
    async fn gap_is_redrawn_on_each_acceptance() {
        let s = smoother(FixedJitter::highest());
        let target = GeoPoint::new(1.0, 1.0);
        let first = s.step(target, GeoPoint::new(0.0, 0.0));

        tokio::time::advance(Duration::from_secs(179)).await;
        assert_eq!(s.step(target, first), first);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_ne!(s.step(target, first), first);
    }

    #[test]
    fn at_target_stays_put() {
        let s = smoother(SeededJitter::new(1));
        let here = GeoPoint::new(52.52, 13.405);
        assert_eq!(s.step(here, here), here);
    }

    proptest! {
        /// Every accepted step lands on the segment, strictly closer to the
        /// target, and covers at least the minimum fraction.
        #[test]
        fn accepted_steps_converge(
            start in (-80.0f64..80.0, -170.0f64..170.0),
            target in (-80.0f64..80.0, -170.0f64..170.0),
            seed in any::<u64>(),
        ) {
            let start = GeoPoint::new(start.0, start.1);
            let target = GeoPoint::new(target.0, target.1);
            prop_assume!(start.distance_to(target) > 1e-3);

            let s = smoother(SeededJitter::new(seed));
            let origin = Instant::now();
            let mut current = start;
            for k in 0..12u64 {
                let now = origin + Duration::from_secs(181 * k);
                let before = current.distance_to(target);
                let next = s.step_at(target, current, now);
                let after = next.distance_to(target);

                prop_assert!(after < before);
                prop_assert!(after <= before * 0.7 + 1e-9);
                let on_segment = current.distance_to(next) + after;
                prop_assert!((on_segment - before).abs() <= 1e-9 * before.max(1.0));
                current = next;
            }
            prop_assert!(current.distance_to(target) <= start.distance_to(target) * 0.7f64.powi(12) + 1e-9);
        }
    }
}
