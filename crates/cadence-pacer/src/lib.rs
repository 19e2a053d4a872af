// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traffic shaping for Cadence.
//!
//! Everything that decides *when* an outgoing request may leave:
//!
//! - [`RequestPacer`] spaces requests with a jittered minimum gap and consults
//!   the per-category [`RateLimiter`] first.
//! - [`LocationSmoother`] moves reported positions gradually.
//! - [`HeartbeatScheduler`] and [`TypingSimulator`] draw humanlike intervals.
//! - [`UserAgentVarier`] occasionally alters the outgoing User-Agent.
//!
//! All randomness comes from an injected [`JitterSource`].

pub mod classify;
pub mod heartbeat;
pub mod jitter;
pub mod location;
pub mod pacer;
pub mod rate_limit;
pub mod typing;
pub mod user_agent;

use std::sync::Arc;

use cadence_config::model::CadenceConfig;

pub use classify::classify;
pub use heartbeat::HeartbeatScheduler;
pub use jitter::{FixedJitter, JitterSource, SeededJitter, ThreadRngJitter};
pub use location::{GeoPoint, LocationSmoother};
pub use pacer::{PaceDecision, PacerState, RequestPacer};
pub use rate_limit::RateLimiter;
pub use typing::TypingSimulator;
pub use user_agent::UserAgentVarier;

/// The full set of shaping components built from one configuration and one
/// jitter source.
#[derive(Debug)]
pub struct Shaping {
    pub pacer: Arc<RequestPacer>,
    pub location: Arc<LocationSmoother>,
    pub heartbeat: Arc<HeartbeatScheduler>,
    pub typing: Arc<TypingSimulator>,
    pub user_agent: Arc<UserAgentVarier>,
}

impl Shaping {
    pub fn from_config(config: &CadenceConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            pacer: Arc::new(RequestPacer::from_config(config, Arc::clone(&jitter))),
            location: Arc::new(LocationSmoother::new(&config.location, Arc::clone(&jitter))),
            heartbeat: Arc::new(HeartbeatScheduler::new(&config.heartbeat, Arc::clone(&jitter))),
            typing: Arc::new(TypingSimulator::new(&config.typing, Arc::clone(&jitter))),
            user_agent: Arc::new(UserAgentVarier::new(&config.user_agent, jitter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{RequestCategory, RequestMeta};

    #[tokio::test(start_paused = true)]
    async fn shaping_wires_shared_state() {
        let mut config = CadenceConfig::default();
        config.rate_limit.caps.location = 2;
        let shaping = Shaping::from_config(&config, Arc::new(FixedJitter::lowest()));

        let meta = RequestMeta::new("/v4/location", "PUT");
        let category = classify(&meta);
        assert_eq!(category, RequestCategory::Location);

        assert!(!shaping.pacer.decide(category).is_denied());
        assert!(!shaping.pacer.decide(category).is_denied());
        assert!(shaping.pacer.decide(category).is_denied());
        assert_eq!(shaping.pacer.state().limiter().remaining(category), 0);
        assert_eq!(
            shaping.user_agent.vary("Cadence/1.0"),
            "Cadence/1.0 (slight variant)"
        );
    }
}
