//! Middleware (interceptor) subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route:
//!     global specs ++ route specs  (pipeline.rs: Chain)
//!     → Next::run pops the first spec
//!     → Registry builds the middleware (lazily, only when reached)
//!     → middleware.process(request, response, ctx, next)
//!         → either next.run(...) and optionally post-process
//!         → or return its own response (short-circuit)
//!     → chain exhausted: controller.execute(request, response)
//! ```
//!
//! # Design Decisions
//! - Interceptors are built per request; no instance is shared between requests
//! - Unknown names fail at first use, not at registration
//! - Errors propagate with `?` up to `Application::handle`, which answers 500

pub mod builtin;
pub mod pipeline;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BoxError;
use crate::http::{Request, Response};
use crate::kernel::{AppContext, ComponentKind};

pub use pipeline::{Chain, MiddlewarePipeline, Next};

/// Options passed to configurable middleware.
pub type MiddlewareOptions = serde_json::Map<String, serde_json::Value>;

/// An interceptor around controller execution.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Inspect or transform the exchange. Call `next.run` to continue the chain.
    async fn process(
        &self,
        request: Request,
        response: Response,
        ctx: &AppContext,
        next: Next<'_>,
    ) -> Result<Response, DispatchError>;
}

/// Errors raised while running the middleware chain.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("middleware '{0}' is not registered")]
    UnknownMiddleware(String),

    #[error("'{name}' is registered as a {kind}, not a middleware")]
    NotMiddleware { name: String, kind: ComponentKind },

    #[error(transparent)]
    Other(BoxError),
}

impl DispatchError {
    /// Wrap any error raised inside a middleware.
    pub fn other(error: impl Into<BoxError>) -> Self {
        DispatchError::Other(error.into())
    }
}

/// A named middleware plus its options, as declared globally or on a route.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "MiddlewareEntry", into = "MiddlewareEntry")]
pub struct MiddlewareSpec {
    pub name: String,
    pub options: MiddlewareOptions,
}

impl MiddlewareSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: MiddlewareOptions::new(),
        }
    }

    pub fn with_options(name: impl Into<String>, options: MiddlewareOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Config representation: a bare name or `{ class = "...", options = { ... } }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum MiddlewareEntry {
    Name(String),
    Detailed {
        class: String,
        #[serde(default)]
        options: MiddlewareOptions,
    },
}

impl From<MiddlewareEntry> for MiddlewareSpec {
    fn from(entry: MiddlewareEntry) -> Self {
        match entry {
            MiddlewareEntry::Name(name) => MiddlewareSpec::new(name),
            MiddlewareEntry::Detailed { class, options } => MiddlewareSpec::with_options(class, options),
        }
    }
}

impl From<MiddlewareSpec> for MiddlewareEntry {
    fn from(spec: MiddlewareSpec) -> Self {
        MiddlewareEntry::Detailed {
            class: spec.name,
            options: spec.options,
        }
    }
}
