//! Route declarations and their compiled descriptors.
//!
//! # Responsibilities
//! - Hold the declarative form of a route (method, URI template, controller, middleware)
//! - Compile a declaration into an immutable `RouteDescriptor`
//! - Reject malformed URI templates at load time
//!
//! # Design Decisions
//! - A URI template must start with '/'; anything else is fatal, never skipped
//! - `{name}` segments become wildcards with a named capture
//! - A bare `*` segment is a wildcard without a capture

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::middleware::{MiddlewareOptions, MiddlewareSpec};

/// Errors raised while compiling a route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route uri '{uri}' for controller '{controller}' must start with '/'")]
    MissingLeadingSlash { uri: String, controller: String },

    #[error("route uri '{uri}' has an empty parameter name at segment {index}")]
    EmptyParameter { uri: String, index: usize },
}

impl RouteError {
    /// Stable numeric code, usable by tooling that greps startup failures.
    pub fn code(&self) -> u32 {
        match self {
            RouteError::MissingLeadingSlash { .. } => 1,
            RouteError::EmptyParameter { .. } => 2,
        }
    }
}

/// One token of a compiled URI pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(String),
    Wildcard,
}

impl PatternSegment {
    /// Returns true if this token accepts the given path segment.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            PatternSegment::Literal(literal) => literal == value,
            PatternSegment::Wildcard => true,
        }
    }
}

impl fmt::Display for PatternSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSegment::Literal(literal) => f.write_str(literal),
            PatternSegment::Wildcard => f.write_str("*"),
        }
    }
}

/// Declarative route metadata, as written by application code or config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteDeclaration {
    /// HTTP method (compared case-insensitively).
    pub method: String,

    /// URI template, e.g. `/api/{version}/items`.
    pub uri: String,

    /// Registry key of the controller serving this route.
    pub controller: String,

    /// Route-scoped middleware, run after the global ones.
    #[serde(default)]
    pub middlewares: Vec<MiddlewareSpec>,
}

impl RouteDeclaration {
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            controller: controller.into(),
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware without options.
    pub fn middleware(mut self, name: impl Into<String>) -> Self {
        self.middlewares.push(MiddlewareSpec::new(name));
        self
    }

    /// Append a middleware with options.
    pub fn middleware_with(mut self, name: impl Into<String>, options: MiddlewareOptions) -> Self {
        self.middlewares.push(MiddlewareSpec::with_options(name, options));
        self
    }

    /// Compile into an immutable descriptor.
    pub fn compile(&self) -> Result<RouteDescriptor, RouteError> {
        if !self.uri.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                uri: self.uri.clone(),
                controller: self.controller.clone(),
            });
        }

        let mut pattern_segments = Vec::new();
        let mut param_bindings = BTreeMap::new();

        for (index, raw) in split_path(&self.uri).into_iter().enumerate() {
            if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
                let name = &raw[1..raw.len() - 1];
                if name.is_empty() {
                    return Err(RouteError::EmptyParameter {
                        uri: self.uri.clone(),
                        index,
                    });
                }
                param_bindings.insert(index, name.to_string());
                pattern_segments.push(PatternSegment::Wildcard);
            } else if raw == "*" {
                pattern_segments.push(PatternSegment::Wildcard);
            } else {
                pattern_segments.push(PatternSegment::Literal(raw.to_string()));
            }
        }

        Ok(RouteDescriptor {
            pattern_segments,
            param_bindings,
            method: self.method.clone(),
            controller: self.controller.clone(),
            middlewares: self.middlewares.clone(),
        })
    }
}

/// Compiled, immutable route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    pattern_segments: Vec<PatternSegment>,
    param_bindings: BTreeMap<usize, String>,
    method: String,
    controller: String,
    middlewares: Vec<MiddlewareSpec>,
}

impl RouteDescriptor {
    pub fn pattern_segments(&self) -> &[PatternSegment] {
        &self.pattern_segments
    }

    /// Segment index → parameter name, for `{name}` segments only.
    pub fn param_bindings(&self) -> &BTreeMap<usize, String> {
        &self.param_bindings
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn middlewares(&self) -> &[MiddlewareSpec] {
        &self.middlewares
    }

    /// Rebuild the pattern as a printable template, e.g. `/api/*/items`.
    pub fn pattern(&self) -> String {
        if self.pattern_segments.len() == 1 {
            return "/".to_string();
        }
        self.pattern_segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Split a URI path into its '/'-delimited segments.
///
/// The first segment of an absolute path is always the empty string. The empty
/// path and `/` both collapse to the single empty segment, so they match the
/// root route `/`.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() || path == "/" {
        return vec![""];
    }
    path.split('/').collect()
}
