//! Cooperative scheduler for cyclic jobs.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::error::panic_message;
use crate::jobs::CyclicJobSpec;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

pub struct CyclicScheduler {
    specs: Vec<CyclicJobSpec>,
}

impl CyclicScheduler {
    pub fn new(specs: Vec<CyclicJobSpec>) -> Self {
        Self { specs }
    }

    /// Spawn one loop per job. Must be called from within a tokio runtime.
    pub fn start(self, shutdown: &Shutdown) -> SchedulerHandle {
        let handles = self
            .specs
            .into_iter()
            .map(|spec| {
                let name = spec.name.clone();
                let shutdown = shutdown.clone();
                tracing::info!(
                    job = %name,
                    startup_delay_secs = spec.startup_delay_seconds(),
                    repeat_interval_secs = spec.repeat_interval_seconds(),
                    "Starting cyclic job"
                );
                (name, tokio::spawn(run_loop(spec, shutdown)))
            })
            .collect();
        SchedulerHandle { handles }
    }
}

async fn run_loop(spec: CyclicJobSpec, shutdown: Shutdown) {
    let CyclicJobSpec {
        name,
        startup_delay,
        repeat_interval,
        mut job,
    } = spec;

    tokio::select! {
        _ = sleep(startup_delay) => {}
        _ = shutdown.wait() => {
            tracing::debug!(job = %name, "Cyclic job stopped before first run");
            return;
        }
    }

    loop {
        let outcome = AssertUnwindSafe(job.run_job()).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => {
                tracing::debug!(job = %name, "Cyclic job iteration completed");
                metrics::record_job_iteration(&name, "ok");
            }
            Ok(Err(error)) => {
                tracing::error!(job = %name, error = %error, "Cyclic job iteration failed");
                metrics::record_job_iteration(&name, "error");
            }
            Err(panic) => {
                tracing::error!(job = %name, panic = %panic_message(panic.as_ref()), "Cyclic job iteration panicked");
                metrics::record_job_iteration(&name, "panic");
            }
        }

        tokio::select! {
            _ = sleep(repeat_interval) => {}
            _ = shutdown.wait() => break,
        }
    }

    tracing::debug!(job = %name, "Cyclic job stopped");
}

/// Running job loops.
#[derive(Debug)]
pub struct SchedulerHandle {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl SchedulerHandle {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(|(name, _)| name.as_str())
    }

    /// Wait for every loop to exit (after shutdown).
    pub async fn join(self) {
        for (name, handle) in self.handles {
            if let Err(error) = handle.await {
                tracing::warn!(job = %name, error = %error, "Cyclic job task ended abnormally");
            }
        }
    }

    pub fn abort_all(&self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}
