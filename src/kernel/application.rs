//! The assembled application: config, registry, routes and state.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::config::{validate_config, AppConfig};
use crate::controller::{Controller, HandlerFactory, NotFoundController};
use crate::error::{panic_message, BuildError};
use crate::http::{Request, Response};
use crate::jobs::{CyclicJobsBuilder, CyclicScheduler, SchedulerHandle};
use crate::kernel::{AppContext, Registry, StateContainer};
use crate::lifecycle::{ServerHandle, Shutdown};
use crate::middleware::{Chain, DispatchError, MiddlewarePipeline, MiddlewareSpec};
use crate::observability::metrics;
use crate::routing::{split_path, RouteTable};
use crate::task::{TaskDispatcher, TaskInvocation, TaskResult};

/// Everything needed to serve requests, run tasks and start cyclic jobs.
#[derive(Debug)]
pub struct Application {
    registry: Registry,
    routes: RouteTable,
    context: AppContext,
}

impl Application {
    /// Validate the config, compile the route table and run state initiators.
    ///
    /// Routes registered in code come first, then `[[routes]]` from config.
    pub fn build(config: AppConfig, registry: Registry) -> Result<Self, BuildError> {
        validate_config(&config, &registry).map_err(BuildError::Validation)?;

        let routes = RouteTable::build(registry.routes().iter().chain(config.routes.iter()))?;
        let state = StateContainer::initialize(&config.state_container_initiation, &registry, &config)?;

        tracing::info!(
            routes = routes.len(),
            global_middlewares = config.global_middlewares.len(),
            state_values = state.len(),
            "Application built"
        );

        let context = AppContext::new(Arc::new(config), Arc::new(state), ServerHandle::new(Shutdown::new()));
        Ok(Self {
            registry,
            routes,
            context,
        })
    }

    /// Dispatch one request. Never fails: defects become error responses.
    pub async fn handle(&self, request: Request) -> Response {
        let started = Instant::now();
        let method = request.method().to_string();
        let path = request.path().to_string();
        let request_id = request.request_id().map(str::to_owned).unwrap_or_default();

        let response = match AssertUnwindSafe(self.dispatch(request)).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    error = %error,
                    "Dispatch failed"
                );
                internal_error()
            }
            Err(panic) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    panic = %panic_message(panic.as_ref()),
                    "Dispatch panicked"
                );
                internal_error()
            }
        };

        metrics::record_request(&method, response.status().as_u16(), started);
        response
    }

    async fn dispatch(&self, request: Request) -> Result<Response, DispatchError> {
        let matched = {
            let segments = split_path(request.path());
            self.routes.resolve(request.method(), &segments).map(|route| {
                let controller = HandlerFactory::new(&self.registry).build(route, &segments, &self.context);
                (controller, route.middlewares())
            })
        };

        match matched {
            Some((controller, route_middlewares)) => {
                let chain = Chain::new(self.global_middlewares(), route_middlewares);
                MiddlewarePipeline::new(&self.registry, &self.context)
                    .execute(request, Response::new(), controller, chain)
                    .await
            }
            None => Ok(NotFoundController.execute(request, Response::new()).await),
        }
    }

    /// Run a named task executor.
    pub async fn run_task(
        &self,
        server: &ServerHandle,
        task_id: u64,
        reactor_id: u32,
        invocation: TaskInvocation,
    ) -> TaskResult {
        TaskDispatcher::new(&self.registry, &self.context)
            .execute(server, task_id, reactor_id, invocation)
            .await
    }

    /// Spawn one loop per job named in `cyclic_jobs`.
    pub fn start_cyclic_jobs(&self) -> SchedulerHandle {
        let specs = CyclicJobsBuilder::new(&self.registry, &self.context).build(&self.config().cyclic_jobs);
        CyclicScheduler::new(specs).start(self.server().shutdown())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn global_middlewares(&self) -> &[MiddlewareSpec] {
        &self.context.config().global_middlewares
    }

    pub fn config(&self) -> &AppConfig {
        self.context.config()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn server(&self) -> &ServerHandle {
        self.context.server()
    }
}

fn internal_error() -> Response {
    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteDeclaration;

    #[test]
    fn test_build_rejects_bad_uri() {
        let mut config = AppConfig::default();
        config.routes.push(RouteDeclaration::new("GET", "no-slash", "status"));

        let error = Application::build(config, Registry::new()).unwrap_err();

        assert!(matches!(error, BuildError::Route(ref e) if e.code() == 1));
    }

    #[tokio::test]
    async fn test_not_found() {
        let app = Application::build(AppConfig::default(), Registry::new()).unwrap();

        let response = app.handle(Request::new("GET", "/nowhere")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.body_json().unwrap(),
            serde_json::json!({"codeStatus": "404", "text": "Page not found"})
        );
    }
}
