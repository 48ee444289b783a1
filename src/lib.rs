//! Request-dispatch and background-job kernel.
//!
//! Routes requests to controllers through ordered middleware chains, runs
//! one-off tasks and keeps cyclic jobs going, all on the tokio runtime.

pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod jobs;
pub mod kernel;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;
pub mod task;

pub use config::{AppConfig, ConfigLoader};
pub use controller::{Controller, PathParams};
pub use error::{BoxError, BuildError};
pub use http::{HttpServer, Request, Response};
pub use jobs::CyclicJob;
pub use kernel::{AppContext, Application, Registry};
pub use lifecycle::{ServerHandle, Shutdown};
pub use middleware::{DispatchError, Middleware, MiddlewareOptions, Next};
pub use routing::RouteDeclaration;
pub use task::{TaskContext, TaskExecutor, TaskInvocation, TaskResult};
