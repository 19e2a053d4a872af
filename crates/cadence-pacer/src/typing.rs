// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated typing duration for outgoing messages.

use std::sync::Arc;
use std::time::Duration;

use cadence_config::model::TypingConfig;

use crate::jitter::JitterSource;

pub struct TypingSimulator {
    ms_per_char: u64,
    jitter_fraction: f64,
    jitter: Arc<dyn JitterSource>,
}

impl TypingSimulator {
    pub fn new(config: &TypingConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            ms_per_char: config.ms_per_char,
            jitter_fraction: config.jitter_fraction,
            jitter,
        }
    }

    /// Time a person would plausibly spend typing `character_count` characters:
    /// `count × ms_per_char`, spread by ±`jitter_fraction`.
    pub fn delay_for(&self, character_count: usize) -> Duration {
        let base = (character_count as u64).saturating_mul(self.ms_per_char);
        let spread = (base as f64 * self.jitter_fraction) as u64;
        let low = base.saturating_sub(spread);
        let high = base.saturating_add(spread);
        Duration::from_millis(self.jitter.pick_u64(low..high.saturating_add(1)))
    }
}

impl std::fmt::Debug for TypingSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingSimulator")
            .field("ms_per_char", &self.ms_per_char)
            .field("jitter_fraction", &self.jitter_fraction)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{FixedJitter, ThreadRngJitter};

    #[test]
    fn empty_message_takes_no_time() {
        let t = TypingSimulator::new(&TypingConfig::default(), Arc::new(ThreadRngJitter));
        assert_eq!(t.delay_for(0), Duration::ZERO);
    }

    #[test]
    fn twenty_percent_band() {
        let config = TypingConfig::default();
        let low = TypingSimulator::new(&config, Arc::new(FixedJitter::lowest()));
        let high = TypingSimulator::new(&config, Arc::new(FixedJitter::highest()));
        assert_eq!(low.delay_for(10), Duration::from_millis(1600));
        assert_eq!(high.delay_for(10), Duration::from_millis(2400));

        let random = TypingSimulator::new(&config, Arc::new(ThreadRngJitter));
        for _ in 0..200 {
            let d = random.delay_for(25);
            assert!(d >= Duration::from_millis(4000) && d <= Duration::from_millis(6000));
        }
    }
}
