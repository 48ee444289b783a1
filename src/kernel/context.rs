//! Shared application context and startup state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::BuildError;
use crate::kernel::{Component, Registry};
use crate::lifecycle::ServerHandle;

/// Values produced once at startup by state initiators.
#[derive(Default)]
pub struct StateContainer {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl StateContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run each named initiator in order and store its value under its key.
    ///
    /// Names that are not registered, or not state initiators, are skipped.
    /// A failing initiator aborts startup.
    pub fn initialize(names: &[String], registry: &Registry, config: &AppConfig) -> Result<Self, BuildError> {
        let mut container = Self::new();

        for name in names {
            match registry.get(name) {
                Some(Component::StateInitiator { key, factory }) => {
                    let value = factory(config).map_err(|source| BuildError::StateInit {
                        name: name.clone(),
                        source,
                    })?;
                    tracing::debug!(initiator = %name, key = %key, "State initialized");
                    container.values.insert(key.clone(), value);
                }
                Some(other) => {
                    tracing::warn!(initiator = %name, kind = %other.kind(), "Not a state initiator; skipping");
                }
                None => {
                    tracing::warn!(initiator = %name, "State initiator not registered; skipping");
                }
            }
        }

        Ok(container)
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// The value under `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.values.get(key).cloned()?.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Handed to controllers, middleware, jobs and tasks.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<AppConfig>,
    state: Arc<StateContainer>,
    server: ServerHandle,
}

impl AppContext {
    pub fn new(config: Arc<AppConfig>, state: Arc<StateContainer>, server: ServerHandle) -> Self {
        Self { config, state, server }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &StateContainer {
        &self.state
    }

    pub fn server(&self) -> &ServerHandle {
        &self.server
    }
}
