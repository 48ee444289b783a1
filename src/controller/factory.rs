//! Controller instantiation for matched routes.

use crate::controller::{Controller, ErrorController, PathParams};
use crate::kernel::{AppContext, Component, Registry};
use crate::routing::RouteDescriptor;

/// Builds the controller bound to a matched route.
pub struct HandlerFactory<'a> {
    registry: &'a Registry,
}

impl<'a> HandlerFactory<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Extract path parameters and instantiate the route's controller.
    ///
    /// Never fails: an unregistered controller, or a name registered as some
    /// other component, yields an [`ErrorController`].
    pub fn build(
        &self,
        route: &RouteDescriptor,
        segments: &[&str],
        ctx: &AppContext,
    ) -> Box<dyn Controller> {
        let params = extract_params(route, segments);

        match self.registry.get(route.controller()) {
            Some(Component::Controller(factory)) => factory(params, ctx),
            Some(other) => {
                tracing::error!(
                    controller = %route.controller(),
                    kind = %other.kind(),
                    "Route target is not a controller"
                );
                Box::new(ErrorController)
            }
            None => {
                tracing::error!(controller = %route.controller(), "Route target is not registered");
                Box::new(ErrorController)
            }
        }
    }
}

/// Read `{name}` captures out of the raw path segments.
pub fn extract_params(route: &RouteDescriptor, segments: &[&str]) -> PathParams {
    let mut params = PathParams::new();
    for (index, name) in route.param_bindings() {
        if let Some(value) = segments.get(*index) {
            params.insert(name.clone(), *value);
        }
    }
    params
}
