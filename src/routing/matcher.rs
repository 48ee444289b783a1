//! Route matching logic.
//!
//! # Responsibilities
//! - Match the HTTP method (case-insensitive)
//! - Match path segments positionally (literal or wildcard)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Method matching is case-insensitive (verbs arrive in any case)
//! - Segment matching is case-sensitive and exact
//! - Segment counts must be equal; there is no prefix matching
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::routing::route::{PatternSegment, RouteDescriptor};

/// The parts of an inbound request that routing looks at.
#[derive(Debug, Clone, Copy)]
pub struct RouteTarget<'a> {
    pub method: &'a str,
    pub segments: &'a [&'a str],
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the target matches this condition.
    fn matches(&self, target: &RouteTarget<'_>) -> bool;
}

/// Matches the HTTP method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    expected: String,
}

impl MethodMatcher {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            expected: method.into(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        self.expected.eq_ignore_ascii_case(target.method)
    }
}

/// Matches path segments against a compiled pattern.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    pattern: Vec<PatternSegment>,
}

impl SegmentMatcher {
    pub fn new(pattern: Vec<PatternSegment>) -> Self {
        Self { pattern }
    }
}

impl Matcher for SegmentMatcher {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        self.pattern.len() == target.segments.len()
            && self
                .pattern
                .iter()
                .zip(target.segments)
                .all(|(token, value)| token.accepts(value))
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Method check first: it is the cheap rejection.
    pub fn for_route(route: &RouteDescriptor) -> Self {
        Self::new(vec![
            Box::new(MethodMatcher::new(route.method())),
            Box::new(SegmentMatcher::new(route.pattern_segments().to_vec())),
        ])
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, target: &RouteTarget<'_>) -> bool {
        self.matchers.iter().all(|m| m.matches(target))
    }
}
