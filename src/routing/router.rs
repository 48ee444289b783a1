//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the matching route for a request
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order; the first match wins
//! - Construction fails on the first malformed declaration

use crate::routing::matcher::{AndMatcher, Matcher, RouteTarget};
use crate::routing::route::{RouteDeclaration, RouteDescriptor, RouteError};

#[derive(Debug)]
struct CompiledRoute {
    descriptor: RouteDescriptor,
    matcher: AndMatcher,
}

/// Immutable, ordered route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile declarations in order. Registration order is match priority.
    pub fn build<'a, I>(declarations: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = &'a RouteDeclaration>,
    {
        let mut routes = Vec::new();
        for declaration in declarations {
            let descriptor = declaration.compile()?;
            tracing::debug!(
                method = %descriptor.method(),
                pattern = %descriptor.pattern(),
                controller = %descriptor.controller(),
                "Route compiled"
            );
            let matcher = AndMatcher::for_route(&descriptor);
            routes.push(CompiledRoute { descriptor, matcher });
        }
        Ok(Self { routes })
    }

    /// Find the first route matching `method` and the raw path segments.
    ///
    /// `None` is the not-found sentinel.
    pub fn resolve(&self, method: &str, segments: &[&str]) -> Option<&RouteDescriptor> {
        let target = RouteTarget { method, segments };
        self.routes
            .iter()
            .find(|route| route.matcher.matches(&target))
            .map(|route| &route.descriptor)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Descriptors in match order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().map(|route| &route.descriptor)
    }
}
