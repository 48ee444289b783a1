//! Controllers: the request handlers bound to routes.
//!
//! # Data Flow
//! ```text
//! Matched RouteDescriptor + raw path segments
//!     → factory.rs (extract {params}, look up the registered factory)
//!     → Box<dyn Controller>
//!     → executed at the end of the middleware chain
//!
//! No match / unavailable controller:
//!     → builtin.rs (NotFoundController / ErrorController)
//! ```
//!
//! # Design Decisions
//! - One controller instance per request, built with its path parameters
//! - Controllers always produce a response; failures are rendered, not raised

pub mod builtin;
pub mod factory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::http::{Request, Response};

pub use builtin::{ErrorController, NotFoundController, StatusController};
pub use factory::HandlerFactory;

/// A request handler.
#[async_trait]
pub trait Controller: Send {
    /// Produce the response for this request. `response` is the value handed
    /// down by the middleware chain (a fresh 200 unless a middleware changed it).
    async fn execute(&mut self, request: Request, response: Response) -> Response;
}

/// Parameters captured from `{name}` segments of the route URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
