//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (route, job, task, request_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, full or compact)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID from the HTTP layer is attached to access log and dispatch
//!   failure lines
//! - Metrics are cheap; without a recorder they cost nothing

pub mod logging;
pub mod metrics;
