// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of installed hooks.
//!
//! Request hooks run in registration order and the first rejection wins;
//! later hooks are not consulted. Hooks that claim budget (see
//! [`RequestHook::claims_budget`]) run after every other request hook, so a
//! request rejected elsewhere never consumes a rate-limit admission or a
//! pacing slot. Object hooks all run.

use std::sync::Arc;

use tracing::debug;

use cadence_core::RequestMeta;

use crate::hook::{ConstructedObject, ObjectHook, RequestHook, Verdict};

#[derive(Default)]
pub struct HookRegistry {
    request_hooks: Vec<Arc<dyn RequestHook>>,
    object_hooks: Vec<Arc<dyn ObjectHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request hook. Budget-claiming hooks are consulted last
    /// regardless of when they were registered.
    pub fn register_request(&mut self, hook: Arc<dyn RequestHook>) {
        debug!(hook = hook.name(), "request hook registered");
        self.request_hooks.push(hook);
    }

    pub fn register_object(&mut self, hook: Arc<dyn ObjectHook>) {
        debug!(hook = hook.name(), "object hook registered");
        self.object_hooks.push(hook);
    }

    pub fn before_dispatch(&self, meta: &RequestMeta) -> Verdict {
        let checks = self.request_hooks.iter().filter(|h| !h.claims_budget());
        let claims = self.request_hooks.iter().filter(|h| h.claims_budget());
        for hook in checks.chain(claims) {
            let verdict = hook.before_dispatch(meta);
            if verdict.is_reject() {
                debug!(hook = hook.name(), url = meta.url.as_deref().unwrap_or(""), "request rejected");
                return verdict;
            }
        }
        Verdict::Proceed
    }

    pub fn on_constructed(&self, object: &ConstructedObject) {
        for hook in &self.object_hooks {
            hook.on_constructed(object);
        }
    }

    /// Names of registered hooks, request hooks first.
    pub fn names(&self) -> Vec<&str> {
        self.request_hooks
            .iter()
            .map(|h| h.name())
            .chain(self.object_hooks.iter().map(|h| h.name()))
            .collect()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use cadence_core::{RequestCategory, ViewSource};

    struct Fixed {
        name: &'static str,
        verdict: Verdict,
        calls: AtomicU32,
    }

    impl Fixed {
        fn new(name: &'static str, verdict: Verdict) -> Arc<Self> {
            Arc::new(Self {
                name,
                verdict,
                calls: AtomicU32::new(0),
            })
        }
    }

    impl RequestHook for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn before_dispatch(&self, _meta: &RequestMeta) -> Verdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    struct Counter(AtomicU32);

    impl ObjectHook for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn on_constructed(&self, _object: &ConstructedObject) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn reject() -> Verdict {
        Verdict::Reject {
            category: RequestCategory::Search,
            retry_after: Duration::from_secs(3),
        }
    }

    #[test]
    fn empty_registry_proceeds() {
        let registry = HookRegistry::new();
        assert_eq!(registry.before_dispatch(&RequestMeta::default()), Verdict::Proceed);
    }

    #[test]
    fn first_rejection_wins() {
        let pass = Fixed::new("pass", Verdict::Proceed);
        let deny = Fixed::new("deny", reject());
        let after = Fixed::new("after", Verdict::Proceed);

        let mut registry = HookRegistry::new();
        registry.register_request(pass.clone());
        registry.register_request(deny.clone());
        registry.register_request(after.clone());

        assert_eq!(registry.before_dispatch(&RequestMeta::new("/v2/search", "GET")), reject());
        assert_eq!(pass.calls.load(Ordering::SeqCst), 1);
        assert_eq!(deny.calls.load(Ordering::SeqCst), 1);
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.names(), vec!["pass", "deny", "after"]);
    }

    #[test]
    fn every_object_hook_runs() {
        let a = Arc::new(Counter(AtomicU32::new(0)));
        let b = Arc::new(Counter(AtomicU32::new(0)));
        let mut registry = HookRegistry::new();
        registry.register_object(a.clone());
        registry.register_object(b.clone());

        registry.on_constructed(&ConstructedObject::Profile {
            id: Some("p".into()),
            source: ViewSource::Browse,
        });
        assert_eq!(a.0.load(Ordering::SeqCst), 1);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn budget_claiming_hooks_run_last() {
        use cadence_config::model::CadenceConfig;
        use cadence_pacer::{FixedJitter, RequestPacer};

        use crate::pacing::PacingHook;

        let mut config = CadenceConfig::default();
        config.pacer.base_delay_ms = 0;
        config.pacer.repeat_extra_ms = 0;
        config.pacer.switch_extra_ms = 0;
        let pacer = Arc::new(RequestPacer::from_config(&config, Arc::new(FixedJitter::lowest())));
        let deny = Fixed::new("deny", reject());

        let mut registry = HookRegistry::new();
        registry.register_request(Arc::new(PacingHook::new(Arc::clone(&pacer))));
        registry.register_request(deny.clone());

        let meta = RequestMeta::new("/v4/location", "PUT");
        for _ in 0..3 {
            assert_eq!(registry.before_dispatch(&meta), reject());
        }
        assert_eq!(deny.calls.load(Ordering::SeqCst), 3);
        assert_eq!(pacer.state().limiter().remaining(RequestCategory::Location), 30);
        assert!(pacer.state().last_request().is_none());
    }
}
