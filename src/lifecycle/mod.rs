//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build application → Metrics → Bind listener → Cyclic jobs
//!     → Signal listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal or request_shutdown() → broadcast
//!     → HTTP server drains → job loops exit → join
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - One broadcast coordinator shared by server, jobs and tasks

pub mod handle;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use handle::ServerHandle;
pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
