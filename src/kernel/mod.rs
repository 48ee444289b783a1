//! Application kernel: component registry, shared context and assembly.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Registry (code) + AppConfig (file/env)
//!     → validate_config
//!     → RouteTable::build (code routes, then config routes)
//!     → StateContainer::initialize (state_container_initiation)
//!     → Application { registry, routes, AppContext }
//!
//! Runtime:
//!     Application::handle(Request)       → Response
//!     Application::run_task(invocation)  → TaskResult
//!     Application::start_cyclic_jobs()   → SchedulerHandle
//! ```
//!
//! # Design Decisions
//! - Named factories instead of by-name reflection; capability checks are
//!   "registered as the right kind"
//! - Everything built here is immutable and shared without locks

pub mod application;
pub mod context;
pub mod registry;

pub use application::Application;
pub use context::{AppContext, StateContainer};
pub use registry::{Component, ComponentKind, MiddlewareFactory, Registry};
