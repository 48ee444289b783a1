//! Controllers shipped with the kernel.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;

use crate::controller::Controller;
use crate::http::{Request, Response};
use crate::kernel::AppContext;

/// Answers requests that matched no route.
#[derive(Debug, Default)]
pub struct NotFoundController;

#[async_trait]
impl Controller for NotFoundController {
    async fn execute(&mut self, request: Request, _response: Response) -> Response {
        tracing::debug!(method = %request.method(), path = %request.path(), "No route matched");
        Response::error(StatusCode::NOT_FOUND, "Page not found")
    }
}

/// Answers requests whose route points at an unusable controller.
#[derive(Debug, Default)]
pub struct ErrorController;

#[async_trait]
impl Controller for ErrorController {
    async fn execute(&mut self, _request: Request, _response: Response) -> Response {
        Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Controller is not available")
    }
}

#[derive(Serialize)]
struct SystemStatus {
    version: &'static str,
    status: &'static str,
    uptime_secs: u64,
}

/// Reports version and uptime.
pub struct StatusController {
    ctx: AppContext,
}

impl StatusController {
    pub const NAME: &'static str = "status";

    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Controller for StatusController {
    async fn execute(&mut self, _request: Request, _response: Response) -> Response {
        Response::json(
            StatusCode::OK,
            &SystemStatus {
                version: env!("CARGO_PKG_VERSION"),
                status: "operational",
                uptime_secs: self.ctx.server().uptime().as_secs(),
            },
        )
    }
}
