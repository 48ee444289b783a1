//! Perpetual background jobs.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     cyclic_jobs = ["cleanup", "report"]      (config)
//!     → builder.rs (look up factories, read timings, skip invalid)
//!     → CyclicJobSpec[]
//!     → scheduler.rs (one tokio task per spec)
//!
//! Per job:
//!     sleep(startup_delay)
//!     loop { run_job(); sleep(repeat_interval) }
//!     exit on shutdown broadcast
//! ```
//!
//! # Design Decisions
//! - Jobs are independent: a failing or panicking iteration is logged and the
//!   loop continues; other jobs are unaffected
//! - Timings are read once, when the `CyclicJobSpec` is built

pub mod builder;
pub mod scheduler;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BoxError;

pub use builder::CyclicJobsBuilder;
pub use scheduler::{CyclicScheduler, SchedulerHandle};

pub const DEFAULT_STARTUP_DELAY_SECONDS: f64 = 10.0;
pub const DEFAULT_REPEAT_INTERVAL_SECONDS: f64 = 86_400.0;

/// A job run repeatedly for the life of the process.
#[async_trait]
pub trait CyclicJob: Send {
    /// Delay before the first run.
    fn startup_delay_seconds(&self) -> f64 {
        DEFAULT_STARTUP_DELAY_SECONDS
    }

    /// Pause between the end of one run and the start of the next.
    fn repeat_interval_seconds(&self) -> f64 {
        DEFAULT_REPEAT_INTERVAL_SECONDS
    }

    async fn run_job(&mut self) -> Result<(), BoxError>;
}

/// A job ready to be scheduled.
pub struct CyclicJobSpec {
    pub name: String,
    pub startup_delay: Duration,
    pub repeat_interval: Duration,
    pub job: Box<dyn CyclicJob>,
}

impl CyclicJobSpec {
    pub fn startup_delay_seconds(&self) -> f64 {
        self.startup_delay.as_secs_f64()
    }

    pub fn repeat_interval_seconds(&self) -> f64 {
        self.repeat_interval.as_secs_f64()
    }
}

impl fmt::Debug for CyclicJobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CyclicJobSpec")
            .field("name", &self.name)
            .field("startup_delay", &self.startup_delay)
            .field("repeat_interval", &self.repeat_interval)
            .finish_non_exhaustive()
    }
}
