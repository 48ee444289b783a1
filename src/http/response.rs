//! Response values produced by controllers and middleware.
//!
//! # Responsibilities
//! - Carry status, headers and body through the middleware chain
//! - Build JSON bodies, including the structured error bodies
//! - Convert into an `axum` response at the server edge
//!
//! # Design Decisions
//! - A fresh `Response` (200, empty) enters the chain; stages mutate or replace it
//! - Error bodies share one shape: `{"codeStatus": "<code>", "text": "<message>"}`

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

/// An outbound response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// JSON body with `Content-Type: application/json`.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        let mut response = Self::new();
        response.status = status;
        match serde_json::to_vec(value) {
            Ok(body) => {
                response.body = Bytes::from(body);
                response
                    .headers
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                response.status = StatusCode::INTERNAL_SERVER_ERROR;
            }
        }
        response
    }

    /// Structured error body.
    pub fn error(status: StatusCode, text: &str) -> Self {
        Self::json(
            status,
            &serde_json::json!({
                "codeStatus": status.as_u16().to_string(),
                "text": text,
            }),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set a header; invalid names or values are logged and ignored.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Ignoring invalid response header"),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Parse the body as JSON.
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
