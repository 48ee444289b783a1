//! Isolated execution of named task executors.

use std::error::Error;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::{json, Value};

use crate::error::panic_message;
use crate::kernel::registry::TaskFactory;
use crate::kernel::{AppContext, Component, Registry};
use crate::lifecycle::ServerHandle;
use crate::observability::metrics;
use crate::task::{trace, TaskContext, TaskError, TaskInvocation, TaskResult};

/// Diagnostic returned for every failure when `app_debug` is off.
pub const REDACTED_FAILURE: &str = "Task execution failed";

/// Metrics label for invocations that named no usable executor.
const UNKNOWN_TASK: &str = "unknown";

pub struct TaskDispatcher<'a> {
    registry: &'a Registry,
    ctx: &'a AppContext,
}

impl<'a> TaskDispatcher<'a> {
    pub fn new(registry: &'a Registry, ctx: &'a AppContext) -> Self {
        Self { registry, ctx }
    }

    /// Run the executor named by `invocation.handler`.
    ///
    /// The executor's own result passes through unchanged. Pre-check failures
    /// and panics become failed results.
    pub async fn execute(
        &self,
        server: &ServerHandle,
        task_id: u64,
        reactor_id: u32,
        invocation: TaskInvocation,
    ) -> TaskResult {
        let name = invocation.handler.clone();
        tracing::debug!(task = %name, task_id, reactor_id, "Executing task");

        let mut label = name.as_str();
        let outcome = match self.lookup(&name) {
            Ok(factory) => {
                let context = TaskContext {
                    server: server.clone(),
                    task_id,
                    reactor_id,
                    invocation,
                    app: self.ctx.clone(),
                };
                let run = async move {
                    let mut executor = factory(context);
                    executor.execute().await
                };
                trace::install_panic_hook();
                AssertUnwindSafe(run).catch_unwind().await.map_err(|panic| {
                    let error = TaskError::Panicked {
                        name: name.clone(),
                        message: panic_message(panic.as_ref()),
                    };
                    (error, trace::take_panic_trace().unwrap_or_default())
                })
            }
            Err(error) => {
                label = UNKNOWN_TASK;
                let stack = if self.ctx.config().app_debug {
                    trace::capture()
                } else {
                    Vec::new()
                };
                Err((error, stack))
            }
        };

        let result = match outcome {
            Ok(result) => result,
            Err((error, stack)) => {
                tracing::error!(task = %name, task_id, reactor_id, error = %error, "Task execution failed");
                self.failure(&error, stack)
            }
        };

        metrics::record_task(label, result.succeeded);
        result
    }

    fn lookup(&self, name: &str) -> Result<&'a TaskFactory, TaskError> {
        if name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        match self.registry.get(name) {
            Some(Component::Task(factory)) => Ok(factory),
            Some(other) => Err(TaskError::NotExecutor {
                name: name.to_string(),
                kind: other.kind(),
            }),
            None => Err(TaskError::NotFound(name.to_string())),
        }
    }

    fn failure(&self, error: &TaskError, stack: Vec<String>) -> TaskResult {
        if !self.ctx.config().app_debug {
            return TaskResult::failure(Value::String(REDACTED_FAILURE.to_string()));
        }

        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(Value::String(cause.to_string()));
            source = cause.source();
        }
        trace.extend(stack.into_iter().map(Value::String));
        TaskResult::failure(json!({
            "message": error.to_string(),
            "trace": trace,
        }))
    }
}
