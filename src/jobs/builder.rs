//! Builds job specs from configured names.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::error::panic_message;
use crate::jobs::CyclicJobSpec;
use crate::kernel::{AppContext, Component, Registry};

pub struct CyclicJobsBuilder<'a> {
    registry: &'a Registry,
    ctx: &'a AppContext,
}

impl<'a> CyclicJobsBuilder<'a> {
    pub fn new(registry: &'a Registry, ctx: &'a AppContext) -> Self {
        Self { registry, ctx }
    }

    /// One spec per usable name, in order. Unusable names are skipped with a
    /// warning; nothing here is fatal.
    pub fn build(&self, names: &[String]) -> Vec<CyclicJobSpec> {
        names.iter().filter_map(|name| self.build_one(name)).collect()
    }

    fn build_one(&self, name: &str) -> Option<CyclicJobSpec> {
        let factory = match self.registry.get(name) {
            Some(Component::CyclicJob(factory)) => factory,
            Some(other) => {
                tracing::warn!(job = %name, kind = %other.kind(), "Not a cyclic job; skipping");
                return None;
            }
            None => {
                tracing::warn!(job = %name, "Cyclic job not registered; skipping");
                return None;
            }
        };

        let constructed = panic::catch_unwind(AssertUnwindSafe(|| {
            let job = factory(self.ctx);
            let startup = job.startup_delay_seconds();
            let interval = job.repeat_interval_seconds();
            (job, startup, interval)
        }));
        let (job, startup, interval) = match constructed {
            Ok(parts) => parts,
            Err(panic) => {
                tracing::warn!(
                    job = %name,
                    panic = %panic_message(panic.as_ref()),
                    "Cyclic job constructor panicked; skipping"
                );
                return None;
            }
        };

        let (startup_delay, repeat_interval) =
            match (Duration::try_from_secs_f64(startup), Duration::try_from_secs_f64(interval)) {
                (Ok(startup_delay), Ok(repeat_interval)) => (startup_delay, repeat_interval),
                _ => {
                    tracing::warn!(job = %name, startup, interval, "Invalid job timings; skipping");
                    return None;
                }
            };

        tracing::debug!(job = %name, startup, interval, "Cyclic job configured");
        Some(CyclicJobSpec {
            name: name.to_string(),
            startup_delay,
            repeat_interval,
            job,
        })
    }
}
