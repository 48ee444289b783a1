//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteDeclaration[] (code registrations, then config [[routes]])
//!     → route.rs (validate URI, split segments, bind {params})
//!     → matcher.rs (method + segment matchers)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → split_path (raw segments)
//!     → router.rs (linear scan, first match)
//!     → Return: &RouteDescriptor or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order is priority)

pub mod matcher;
pub mod route;
pub mod router;

pub use route::{split_path, PatternSegment, RouteDeclaration, RouteDescriptor, RouteError};
pub use router::RouteTable;
