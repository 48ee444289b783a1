//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout/request-id layers)
//!     → fallback handler buffers the body
//!     → request.rs (framework-neutral Request)
//!     → Application::handle (routing, middleware, controller)
//!     → response.rs (status, headers, body) → Axum response
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Request, X_REQUEST_ID};
pub use response::Response;
pub use server::HttpServer;
