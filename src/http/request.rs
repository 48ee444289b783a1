//! Request values handed to the dispatch core.
//!
//! # Responsibilities
//! - Carry method, path, query, headers and a buffered body
//! - Expose the request ID set by the server layers
//! - Convert from `axum` request parts
//!
//! # Design Decisions
//! - Method is kept as a string; route matching compares it case-insensitively
//! - Body is buffered before dispatch; controllers never see a stream
//! - Request ID is added as early as possible (outermost layer) for tracing

use axum::body::Bytes;
use axum::http::{request::Parts, Extensions, HeaderMap, HeaderName};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// An inbound request, already parsed by the HTTP layer.
#[derive(Debug, Default)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Build from `axum` parts and a buffered body.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
            extensions: parts.extensions,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Typed per-request values that middleware hands to later stages.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The request ID, from the `x-request-id` header or the ID layer's extension.
    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID).or_else(|| {
            self.extensions
                .get::<RequestId>()
                .and_then(|id| id.header_value().to_str().ok())
        })
    }
}

/// Layer that assigns a UUID v4 request ID when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let (parts, _) = axum::http::Request::builder()
            .method("PATCH")
            .uri("http://example.com/api/v1/items?page=2")
            .header(X_REQUEST_ID, "abc-123")
            .body(())
            .unwrap()
            .into_parts();

        let request = Request::from_parts(parts, Bytes::from_static(b"{}"));

        assert_eq!(request.method(), "PATCH");
        assert_eq!(request.path(), "/api/v1/items");
        assert_eq!(request.query(), Some("page=2"));
        assert_eq!(request.request_id(), Some("abc-123"));
        assert_eq!(request.body().as_ref(), b"{}");
    }

    #[test]
    fn test_request_id_missing() {
        assert_eq!(Request::new("GET", "/").request_id(), None);
    }
}
