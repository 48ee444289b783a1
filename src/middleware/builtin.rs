//! Middleware shipped with the kernel.

use std::time::Instant;

use async_trait::async_trait;

use crate::http::{Request, Response};
use crate::kernel::AppContext;
use crate::middleware::{DispatchError, Middleware, MiddlewareOptions, Next};

/// Logs one line per exchange once the rest of the chain has answered.
#[derive(Debug, Default)]
pub struct AccessLog;

impl AccessLog {
    pub const NAME: &'static str = "access_log";
}

#[async_trait]
impl Middleware for AccessLog {
    async fn process(
        &self,
        request: Request,
        response: Response,
        _ctx: &AppContext,
        next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        let started = Instant::now();
        let method = request.method().to_string();
        let path = request.path().to_string();
        let request_id = request.request_id().map(str::to_owned).unwrap_or_default();

        let response = next.run(request, response).await?;

        tracing::info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            request_id = %request_id,
            "Request served"
        );
        Ok(response)
    }
}

/// Adds fixed headers to every response passing through it.
///
/// Options map header names to string values:
/// ```toml
/// global_middlewares = [{ class = "response_headers", options = { "x-frame-options" = "DENY" } }]
/// ```
#[derive(Debug, Default)]
pub struct ResponseHeaders {
    headers: Vec<(String, String)>,
}

impl ResponseHeaders {
    pub const NAME: &'static str = "response_headers";

    /// Non-string option values are ignored.
    pub fn from_options(options: &MiddlewareOptions) -> Self {
        let headers = options
            .iter()
            .filter_map(|(name, value)| match value.as_str() {
                Some(value) => Some((name.clone(), value.to_string())),
                None => {
                    tracing::warn!(header = %name, "Ignoring non-string header value");
                    None
                }
            })
            .collect();
        Self { headers }
    }
}

#[async_trait]
impl Middleware for ResponseHeaders {
    async fn process(
        &self,
        request: Request,
        response: Response,
        _ctx: &AppContext,
        next: Next<'_>,
    ) -> Result<Response, DispatchError> {
        let mut response = next.run(request, response).await?;
        for (name, value) in &self.headers {
            response.set_header(name, value);
        }
        Ok(response)
    }
}
