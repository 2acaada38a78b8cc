//! Model Router (§4.4): chooses the backend for a role under the current
//! mode. Grounded on the teacher's `dag::scheduler::SwarmBackend` enum plus
//! `review::dispatcher`'s role-based specialist dispatch — a static
//! role→provider table with a fallback chain, swapped behind a mode flag.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::adapter::{BuildWorker, TextGenAdapter};
use crate::config::RouterMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Research,
    Planning,
    Building,
    Reviewing,
}

impl Role {
    fn assignment(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Role::Research => ("gemini", Some("openai")),
            Role::Planning => ("openai", Some("gemini")),
            Role::Building => ("claude", None),
            Role::Reviewing => ("claude", Some("openai")),
        }
    }
}

pub struct Assignment<A: ?Sized> {
    pub adapter: Arc<A>,
    pub provider_name: &'static str,
    pub is_mock: bool,
}

impl<A: ?Sized> Assignment<A> {
    fn new(adapter: Arc<A>, provider_name: &'static str, is_mock: bool) -> Self {
        Self {
            adapter,
            provider_name,
            is_mock,
        }
    }
}

/// `getAssignment(role)` table: provider name and fallback, for debugging.
pub fn static_table() -> Vec<(Role, &'static str, Option<&'static str>)> {
    [Role::Research, Role::Planning, Role::Building, Role::Reviewing]
        .into_iter()
        .map(|role| {
            let (primary, fallback) = role.assignment();
            (role, primary, fallback)
        })
        .collect()
}

pub struct Router {
    mode: RwLock<RouterMode>,
    enabled: RwLock<HashMap<String, bool>>,
    adapters: RwLock<HashMap<String, Arc<dyn TextGenAdapter>>>,
    build_workers: RwLock<HashMap<String, Arc<dyn BuildWorker>>>,
    mock_adapter: Arc<dyn TextGenAdapter>,
    mock_build_worker: Arc<dyn BuildWorker>,
}

impl Router {
    pub fn new(
        mode: RouterMode,
        enabled: HashMap<String, bool>,
        mock_adapter: Arc<dyn TextGenAdapter>,
        mock_build_worker: Arc<dyn BuildWorker>,
    ) -> Self {
        Self {
            mode: RwLock::new(mode),
            enabled: RwLock::new(enabled),
            adapters: RwLock::new(HashMap::new()),
            build_workers: RwLock::new(HashMap::new()),
            mock_adapter,
            mock_build_worker,
        }
    }

    pub fn register_adapter(&self, provider: impl Into<String>, adapter: Arc<dyn TextGenAdapter>) {
        self.adapters
            .write()
            .expect("router lock poisoned")
            .insert(provider.into(), adapter);
    }

    pub fn register_build_worker(&self, provider: impl Into<String>, worker: Arc<dyn BuildWorker>) {
        self.build_workers
            .write()
            .expect("router lock poisoned")
            .insert(provider.into(), worker);
    }

    /// Swaps the effective mode/enable flags without invalidating
    /// registered adapters.
    pub fn update_config(&self, mode: RouterMode, enabled: HashMap<String, bool>) {
        *self.mode.write().expect("router lock poisoned") = mode;
        *self.enabled.write().expect("router lock poisoned") = enabled;
    }

    fn mode(&self) -> RouterMode {
        *self.mode.read().expect("router lock poisoned")
    }

    fn is_enabled(&self, provider: &str) -> bool {
        self.enabled
            .read()
            .expect("router lock poisoned")
            .get(provider)
            .copied()
            .unwrap_or(false)
    }

    fn is_registered(&self, provider: &str) -> bool {
        self.adapters.read().expect("router lock poisoned").contains_key(provider)
    }

    fn get_registered(&self, provider: &str) -> Option<Arc<dyn TextGenAdapter>> {
        self.adapters.read().expect("router lock poisoned").get(provider).cloned()
    }

    pub fn get_adapter(&self, role: Role) -> Assignment<dyn TextGenAdapter> {
        let (primary, fallback) = role.assignment();
        match self.mode() {
            RouterMode::Simulation => Assignment::new(self.mock_adapter.clone(), "mock", true),
            RouterMode::Selective => {
                if self.is_enabled(primary) && self.is_registered(primary) {
                    Assignment::new(self.get_registered(primary).unwrap(), primary, false)
                } else if let Some(fb) = fallback {
                    if self.is_enabled(fb) && self.is_registered(fb) {
                        Assignment::new(self.get_registered(fb).unwrap(), fb, false)
                    } else {
                        Assignment::new(self.mock_adapter.clone(), "mock", true)
                    }
                } else {
                    Assignment::new(self.mock_adapter.clone(), "mock", true)
                }
            }
            RouterMode::Live => {
                if self.is_registered(primary) {
                    Assignment::new(self.get_registered(primary).unwrap(), primary, false)
                } else if let Some(fb) = fallback {
                    if self.is_registered(fb) {
                        Assignment::new(self.get_registered(fb).unwrap(), fb, false)
                    } else {
                        Assignment::new(self.mock_adapter.clone(), "mock", true)
                    }
                } else {
                    Assignment::new(self.mock_adapter.clone(), "mock", true)
                }
            }
        }
    }

    /// Same pattern as `get_adapter` with the single provider `claude`.
    pub fn get_build_worker(&self) -> Assignment<dyn BuildWorker> {
        const PROVIDER: &str = "claude";
        match self.mode() {
            RouterMode::Simulation => Assignment::new(self.mock_build_worker.clone(), "mock", true),
            RouterMode::Selective => {
                if self.is_enabled(PROVIDER)
                    && let Some(w) = self.build_workers.read().expect("router lock poisoned").get(PROVIDER).cloned()
                {
                    return Assignment::new(w, PROVIDER, false);
                }
                Assignment::new(self.mock_build_worker.clone(), "mock", true)
            }
            RouterMode::Live => {
                if let Some(w) = self.build_workers.read().expect("router lock poisoned").get(PROVIDER).cloned() {
                    Assignment::new(w, PROVIDER, false)
                } else {
                    Assignment::new(self.mock_build_worker.clone(), "mock", true)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MockAdapter, MockBuildWorker};

    fn router(mode: RouterMode, enabled: &[(&str, bool)]) -> Router {
        let enabled = enabled.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Router::new(
            mode,
            enabled,
            Arc::new(MockAdapter::default()),
            Arc::new(MockBuildWorker),
        )
    }

    #[test]
    fn simulation_mode_always_mocks() {
        let r = router(RouterMode::Simulation, &[]);
        r.register_adapter("gemini", Arc::new(MockAdapter::default()));
        assert!(r.get_adapter(Role::Research).is_mock);
    }

    /// Scenario E from §8.2.
    #[test]
    fn selective_mode_fallback_routing() {
        let r = router(RouterMode::Selective, &[("openai", true), ("gemini", false), ("claude", false)]);
        r.register_adapter("openai", Arc::new(MockAdapter::default()));
        r.register_adapter("gemini", Arc::new(MockAdapter::default()));

        let research = r.get_adapter(Role::Research);
        assert_eq!(research.provider_name, "openai");
        assert!(!research.is_mock);

        let building = r.get_build_worker();
        assert!(building.is_mock);
    }

    #[test]
    fn live_mode_prefers_primary_then_fallback_then_mock() {
        let r = router(RouterMode::Live, &[]);
        r.register_adapter("openai", Arc::new(MockAdapter::default()));
        let planning = r.get_adapter(Role::Planning);
        assert_eq!(planning.provider_name, "openai");

        // Reviewing's primary (claude) isn't registered; its fallback
        // (openai) is, so live mode should fall through to it rather than
        // mocking.
        let reviewing = r.get_adapter(Role::Reviewing);
        assert_eq!(reviewing.provider_name, "openai");
        assert!(!reviewing.is_mock);

        // Building has no fallback and nothing registered for claude, so
        // it must mock.
        let building = r.get_adapter(Role::Building);
        assert!(building.is_mock);
    }

    #[test]
    fn update_config_swaps_mode_without_losing_registrations() {
        let r = router(RouterMode::Simulation, &[]);
        r.register_adapter("claude", Arc::new(MockAdapter::default()));
        r.update_config(RouterMode::Live, HashMap::new());
        let building = r.get_adapter(Role::Building);
        assert_eq!(building.provider_name, "claude");
        assert!(!building.is_mock);
    }
}
