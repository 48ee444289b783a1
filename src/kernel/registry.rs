//! Named component factories.
//!
//! # Responsibilities
//! - Map names used in routes and config to typed factories
//! - Record the kind of each name so capability checks are lookups
//! - Collect route declarations and config validators registered in code
//!
//! # Design Decisions
//! - Factories, not instances: controllers, middleware and task executors are
//!   built fresh per use
//! - Re-registering a name replaces the earlier entry and logs a warning

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigValidator};
use crate::controller::{Controller, PathParams};
use crate::error::BoxError;
use crate::jobs::CyclicJob;
use crate::kernel::AppContext;
use crate::middleware::{DispatchError, Middleware, MiddlewareOptions, MiddlewareSpec};
use crate::routing::RouteDeclaration;
use crate::task::{TaskContext, TaskExecutor};

pub type ControllerFactory = Box<dyn Fn(PathParams, &AppContext) -> Box<dyn Controller> + Send + Sync>;
pub type JobFactory = Box<dyn Fn(&AppContext) -> Box<dyn CyclicJob> + Send + Sync>;
pub type TaskFactory = Box<dyn Fn(TaskContext) -> Box<dyn TaskExecutor> + Send + Sync>;
pub type StateFactory =
    Box<dyn Fn(&AppConfig) -> Result<Arc<dyn Any + Send + Sync>, BoxError> + Send + Sync>;

/// How a middleware is constructed.
pub enum MiddlewareFactory {
    /// Takes no arguments; spec options are ignored.
    Plain(Box<dyn Fn() -> Box<dyn Middleware> + Send + Sync>),
    /// Receives the `MiddlewareSpec` options.
    Configurable(Box<dyn Fn(&MiddlewareOptions) -> Box<dyn Middleware> + Send + Sync>),
}

/// A registered component.
pub enum Component {
    Controller(ControllerFactory),
    Middleware(MiddlewareFactory),
    CyclicJob(JobFactory),
    Task(TaskFactory),
    /// Produces the state value stored under `key`.
    StateInitiator { key: String, factory: StateFactory },
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Controller(_) => ComponentKind::Controller,
            Component::Middleware(_) => ComponentKind::Middleware,
            Component::CyclicJob(_) => ComponentKind::CyclicJob,
            Component::Task(_) => ComponentKind::Task,
            Component::StateInitiator { .. } => ComponentKind::StateInitiator,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.kind()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Controller,
    Middleware,
    CyclicJob,
    Task,
    StateInitiator,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Controller => "controller",
            ComponentKind::Middleware => "middleware",
            ComponentKind::CyclicJob => "cyclic job",
            ComponentKind::Task => "task executor",
            ComponentKind::StateInitiator => "state initiator",
        };
        f.write_str(name)
    }
}

/// Typed name → factory map, filled before the application is built.
#[derive(Default)]
pub struct Registry {
    components: HashMap<String, Component>,
    routes: Vec<RouteDeclaration>,
    validators: Vec<Arc<dyn ConfigValidator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller and the route that targets it.
    pub fn controller<C, F>(&mut self, route: RouteDeclaration, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn(PathParams, &AppContext) -> C + Send + Sync + 'static,
    {
        let name = route.controller.clone();
        self.routes.push(route);
        self.register_controller(name, factory)
    }

    /// Register a controller without a route; config `[[routes]]` may target it.
    pub fn register_controller<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn(PathParams, &AppContext) -> C + Send + Sync + 'static,
    {
        self.insert(
            name.into(),
            Component::Controller(Box::new(move |params: PathParams, ctx: &AppContext| {
                Box::new(factory(params, ctx)) as Box<dyn Controller>
            })),
        )
    }

    /// Add a route declaration for an already registered controller.
    pub fn route(&mut self, route: RouteDeclaration) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn middleware<M, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        M: Middleware + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.insert(
            name.into(),
            Component::Middleware(MiddlewareFactory::Plain(Box::new(move || {
                Box::new(factory()) as Box<dyn Middleware>
            }))),
        )
    }

    pub fn configurable_middleware<M, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        M: Middleware + 'static,
        F: Fn(&MiddlewareOptions) -> M + Send + Sync + 'static,
    {
        self.insert(
            name.into(),
            Component::Middleware(MiddlewareFactory::Configurable(Box::new(
                move |options: &MiddlewareOptions| Box::new(factory(options)) as Box<dyn Middleware>,
            ))),
        )
    }

    pub fn cyclic_job<J, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        J: CyclicJob + 'static,
        F: Fn(&AppContext) -> J + Send + Sync + 'static,
    {
        self.insert(
            name.into(),
            Component::CyclicJob(Box::new(move |ctx: &AppContext| {
                Box::new(factory(ctx)) as Box<dyn CyclicJob>
            })),
        )
    }

    pub fn task<T, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        T: TaskExecutor + 'static,
        F: Fn(TaskContext) -> T + Send + Sync + 'static,
    {
        self.insert(
            name.into(),
            Component::Task(Box::new(move |ctx: TaskContext| {
                Box::new(factory(ctx)) as Box<dyn TaskExecutor>
            })),
        )
    }

    /// Register a state initiator. When named in `state_container_initiation`
    /// its value is stored under `key`.
    pub fn state_initiator<T, F>(
        &mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        factory: F,
    ) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&AppConfig) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let factory: StateFactory = Box::new(move |config: &AppConfig| {
            factory(config).map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>)
        });
        self.insert(
            name.into(),
            Component::StateInitiator {
                key: key.into(),
                factory,
            },
        )
    }

    pub fn validator(&mut self, validator: impl ConfigValidator + 'static) -> &mut Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ComponentKind> {
        self.get(name).map(Component::kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn routes(&self) -> &[RouteDeclaration] {
        &self.routes
    }

    pub fn validators(&self) -> &[Arc<dyn ConfigValidator>] {
        &self.validators
    }

    /// Instantiate the middleware named by `spec`.
    pub fn build_middleware(&self, spec: &MiddlewareSpec) -> Result<Box<dyn Middleware>, DispatchError> {
        match self.get(&spec.name) {
            Some(Component::Middleware(MiddlewareFactory::Plain(factory))) => {
                if !spec.options.is_empty() {
                    tracing::debug!(middleware = %spec.name, "Options ignored by plain middleware");
                }
                Ok(factory())
            }
            Some(Component::Middleware(MiddlewareFactory::Configurable(factory))) => Ok(factory(&spec.options)),
            Some(other) => Err(DispatchError::NotMiddleware {
                name: spec.name.clone(),
                kind: other.kind(),
            }),
            None => Err(DispatchError::UnknownMiddleware(spec.name.clone())),
        }
    }

    fn insert(&mut self, name: String, component: Component) -> &mut Self {
        tracing::debug!(name = %name, kind = %component.kind(), "Registering component");
        if let Some(previous) = self.components.insert(name.clone(), component) {
            tracing::warn!(name = %name, previous = %previous.kind(), "Component name registered twice; keeping the latest");
        }
        self
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.components.len())
            .field("routes", &self.routes.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::builtin::{AccessLog, ResponseHeaders};

    #[test]
    fn test_kind_lookup() {
        let mut registry = Registry::new();
        registry
            .middleware(AccessLog::NAME, || AccessLog)
            .configurable_middleware(ResponseHeaders::NAME, ResponseHeaders::from_options);

        assert_eq!(registry.kind_of("access_log"), Some(ComponentKind::Middleware));
        assert_eq!(registry.kind_of("response_headers"), Some(ComponentKind::Middleware));
        assert_eq!(registry.kind_of("missing"), None);
    }

    #[test]
    fn test_build_unknown_middleware() {
        let registry = Registry::new();
        let result = registry.build_middleware(&MiddlewareSpec::new("nope"));

        assert!(matches!(result, Err(DispatchError::UnknownMiddleware(name)) if name == "nope"));
    }

    #[test]
    fn test_build_non_middleware() {
        let mut registry = Registry::new();
        registry.state_initiator("db", "db", |_config: &AppConfig| Ok(1u32));

        let result = registry.build_middleware(&MiddlewareSpec::new("db"));

        assert!(matches!(
            result,
            Err(DispatchError::NotMiddleware { kind: ComponentKind::StateInitiator, .. })
        ));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = Registry::new();
        registry.middleware("x", || AccessLog);
        registry.state_initiator("x", "x", |_config: &AppConfig| Ok(()));

        assert_eq!(registry.kind_of("x"), Some(ComponentKind::StateInitiator));
    }
}
