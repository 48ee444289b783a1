//! Handle to the running server.

use std::time::{Duration, Instant};

use crate::lifecycle::Shutdown;

/// Cloneable view of the running server, injected into tasks and controllers.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shutdown: Shutdown,
    started_at: Instant,
}

impl ServerHandle {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            shutdown,
            started_at: Instant::now(),
        }
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Ask the server to stop gracefully.
    pub fn request_shutdown(&self) {
        self.shutdown.trigger();
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
