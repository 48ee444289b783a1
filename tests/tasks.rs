//! Task execution through the application.

use async_trait::async_trait;
use serde_json::{json, Value};

use dispatch_kernel::task::dispatcher::REDACTED_FAILURE;
use dispatch_kernel::task::TaskError;
use dispatch_kernel::{
    AppConfig, AppContext, Application, PathParams, Registry, TaskContext, TaskExecutor, TaskInvocation,
    TaskResult,
};

mod common;

/// Reports what it was constructed with.
struct Report {
    ctx: TaskContext,
}

#[async_trait]
impl TaskExecutor for Report {
    async fn execute(&mut self) -> TaskResult {
        TaskResult::success(json!({
            "task_id": self.ctx.task_id,
            "reactor_id": self.ctx.reactor_id,
            "payload": self.ctx.invocation.payload,
            "debug": self.ctx.app.config().app_debug,
        }))
    }
}

/// Reports its own failure.
struct Declines;

#[async_trait]
impl TaskExecutor for Declines {
    async fn execute(&mut self) -> TaskResult {
        TaskResult::failure(json!("quota exceeded"))
    }
}

struct Panics;

#[async_trait]
impl TaskExecutor for Panics {
    async fn execute(&mut self) -> TaskResult {
        panic!("task exploded")
    }
}

fn app(debug: bool) -> Application {
    let mut registry = Registry::new();
    registry
        .task("report", |ctx: TaskContext| Report { ctx })
        .task("declines", |_ctx: TaskContext| Declines)
        .task("panics", |_ctx: TaskContext| Panics)
        .task("panics_on_build", |_ctx: TaskContext| -> Panics { panic!("constructor exploded") })
        .register_controller("a_controller", |_p: PathParams, _c: &AppContext| common::Explodes);

    let mut config = AppConfig::default();
    config.app_debug = debug;
    Application::build(config, registry).unwrap()
}

async fn run(app: &Application, handler: &str) -> TaskResult {
    let server = app.server().clone();
    app.run_task(&server, 1, 1, TaskInvocation::new(handler, json!({"test": "data"})))
        .await
}

fn trace(result: &TaskResult) -> Vec<String> {
    result.payload["trace"]
        .as_array()
        .map(|frames| frames.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn message(result: &TaskResult) -> String {
    result.payload["message"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_success_passes_through() {
    let app = app(false);
    let server = app.server().clone();

    let result = app
        .run_task(&server, 7, 3, TaskInvocation::new("report", json!({"test": "data"})))
        .await;

    assert!(result.is_success());
    assert_eq!(
        result.payload,
        json!({"task_id": 7, "reactor_id": 3, "payload": {"test": "data"}, "debug": false})
    );
}

#[tokio::test]
async fn test_executor_failure_passes_through() {
    let result = run(&app(false), "declines").await;

    assert!(!result.is_success());
    assert_eq!(result.payload, json!("quota exceeded"));
    assert_eq!(result.result().unwrap_err().to_string(), "quota exceeded");
}

#[tokio::test]
async fn test_precondition_diagnostics_in_debug() {
    let app = app(true);

    let empty = run(&app, "").await;
    let missing = run(&app, "NonExistent").await;
    let wrong_kind = run(&app, "a_controller").await;

    for result in [&empty, &missing, &wrong_kind] {
        assert!(!result.is_success());
        assert!(!trace(result).is_empty());
    }
    assert!(message(&empty).contains("empty"));
    assert!(message(&missing).contains("not found"));
    assert!(message(&wrong_kind).contains("implement"));
}

#[tokio::test]
async fn test_failures_are_redacted_in_production() {
    let app = app(false);

    for handler in ["", "NonExistent", "a_controller", "panics"] {
        let result = run(&app, handler).await;
        assert!(!result.is_success());
        assert_eq!(result.payload, Value::String(REDACTED_FAILURE.to_string()));
    }
}

#[tokio::test]
async fn test_panics_become_failures() {
    let app = app(true);

    let during_execute = run(&app, "panics").await;
    let during_build = run(&app, "panics_on_build").await;

    assert!(message(&during_execute).contains("task exploded"));
    assert!(message(&during_build).contains("constructor exploded"));
    for result in [&during_execute, &during_build] {
        let trace = trace(result);
        assert!(trace.len() > 1);
        assert!(trace[0].starts_with("panicked at"));
        assert!(trace[0].contains("tasks.rs"));
    }

    // The application keeps working afterwards
    assert!(run(&app, "report").await.is_success());
}

#[tokio::test]
async fn test_failed_result_is_an_error() {
    let result = run(&app(false), "NonExistent").await;

    match result.result() {
        Err(TaskError::Failed(text)) => assert_eq!(text, REDACTED_FAILURE),
        other => panic!("expected a failure, got {:?}", other),
    }
}
