// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Occasional User-Agent variation.

use std::borrow::Cow;
use std::sync::Arc;

use cadence_config::model::UserAgentConfig;

use crate::jitter::JitterSource;

/// Returns the client's User-Agent, sometimes with a suffix appended.
pub struct UserAgentVarier {
    suffix: String,
    probability: f64,
    jitter: Arc<dyn JitterSource>,
}

impl UserAgentVarier {
    pub fn new(config: &UserAgentConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            suffix: config.variant_suffix.clone(),
            probability: config.variant_probability.clamp(0.0, 1.0),
            jitter,
        }
    }

    /// `base` unchanged, or `base` followed by the configured suffix.
    pub fn vary<'a>(&self, base: &'a str) -> Cow<'a, str> {
        if self.suffix.is_empty() || self.jitter.pick_f64(0.0..1.0) >= self.probability {
            Cow::Borrowed(base)
        } else {
            Cow::Owned(format!("{base}{}", self.suffix))
        }
    }
}

impl std::fmt::Debug for UserAgentVarier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAgentVarier")
            .field("suffix", &self.suffix)
            .field("probability", &self.probability)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{FixedJitter, SeededJitter};

    const BASE: &str = "Cadence/1.0 (Android 14)";

    #[test]
    fn low_draw_appends_suffix() {
        let varier = UserAgentVarier::new(&UserAgentConfig::default(), Arc::new(FixedJitter::lowest()));
        assert_eq!(varier.vary(BASE), "Cadence/1.0 (Android 14) (slight variant)");
    }

    #[test]
    fn high_draw_keeps_base() {
        let varier =
            UserAgentVarier::new(&UserAgentConfig::default(), Arc::new(FixedJitter::highest()));
        assert!(matches!(varier.vary(BASE), Cow::Borrowed(BASE)));
    }

    #[test]
    fn zero_probability_never_varies() {
        let config = UserAgentConfig {
            variant_probability: 0.0,
            ..UserAgentConfig::default()
        };
        let varier = UserAgentVarier::new(&config, Arc::new(FixedJitter::lowest()));
        assert_eq!(varier.vary(BASE), BASE);
    }

    #[test]
    fn default_mix_is_mostly_base() {
        let varier = UserAgentVarier::new(&UserAgentConfig::default(), Arc::new(SeededJitter::new(7)));
        let varied = (0..3000).filter(|_| varier.vary(BASE) != BASE).count();
        assert!((700..1300).contains(&varied), "varied {varied} of 3000");
    }
}
