//! One-off asynchronous tasks.
//!
//! # Data Flow
//! ```text
//! Application::run_task(server, task_id, reactor_id, TaskInvocation)
//!     → dispatcher.rs pre-checks (empty name, not registered, wrong kind)
//!     → factory(TaskContext) → Box<dyn TaskExecutor>
//!     → executor.execute()            (panics caught)
//!     → TaskResult (passed through, or a failure diagnostic)
//! ```
//!
//! # Design Decisions
//! - Every outcome is a `TaskResult`; callers never see a panic or an `Err`
//! - Diagnostics are redacted unless `app_debug` is set; in debug they carry
//!   the panic location and a backtrace

pub mod dispatcher;
pub mod trace;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::kernel::{AppContext, ComponentKind};
use crate::lifecycle::ServerHandle;

pub use dispatcher::TaskDispatcher;

/// A request to run the task executor registered as `handler`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaskInvocation {
    pub handler: String,
    #[serde(default)]
    pub payload: Value,
}

impl TaskInvocation {
    pub fn new(handler: impl Into<String>, payload: Value) -> Self {
        Self {
            handler: handler.into(),
            payload,
        }
    }
}

/// Outcome of a task execution.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaskResult {
    pub succeeded: bool,
    pub payload: Value,
}

impl TaskResult {
    pub fn success(payload: Value) -> Self {
        Self {
            succeeded: true,
            payload,
        }
    }

    pub fn failure(payload: Value) -> Self {
        Self {
            succeeded: false,
            payload,
        }
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }

    /// The success payload, or the failure diagnostic as an error.
    pub fn result(&self) -> Result<&Value, TaskError> {
        if self.succeeded {
            Ok(&self.payload)
        } else {
            Err(TaskError::Failed(self.diagnostic()))
        }
    }

    pub fn into_result(self) -> Result<Value, TaskError> {
        if self.succeeded {
            Ok(self.payload)
        } else {
            Err(TaskError::Failed(self.diagnostic()))
        }
    }

    /// Human-readable form of the payload.
    pub fn diagnostic(&self) -> String {
        match &self.payload {
            Value::String(text) => text.clone(),
            other => format!("Task execution failed: {}", other),
        }
    }
}

/// Why a task could not produce a successful result.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task class name is empty")]
    EmptyName,

    #[error("task executor '{0}' not found")]
    NotFound(String),

    #[error("'{name}' must implement the task executor contract (registered as a {kind})")]
    NotExecutor { name: String, kind: ComponentKind },

    #[error("task '{name}' panicked: {message}")]
    Panicked { name: String, message: String },

    #[error("{0}")]
    Failed(String),
}

/// Everything a task executor is constructed with.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub server: ServerHandle,
    pub task_id: u64,
    pub reactor_id: u32,
    pub invocation: TaskInvocation,
    pub app: AppContext,
}

/// A unit of one-off work.
#[async_trait]
pub trait TaskExecutor: Send {
    async fn execute(&mut self) -> TaskResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_success() {
        let result = TaskResult::success(json!({"rows": 3}));
        assert_eq!(result.result().unwrap(), &json!({"rows": 3}));
    }

    #[test]
    fn test_result_failure_is_error() {
        let result = TaskResult::failure(json!("Task execution failed"));
        let error = result.result().unwrap_err();
        assert_eq!(error.to_string(), "Task execution failed");

        let result = TaskResult::failure(json!({"message": "boom", "trace": []}));
        assert!(result
            .into_result()
            .unwrap_err()
            .to_string()
            .starts_with("Task execution failed: "));
    }
}
