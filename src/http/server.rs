//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single fallback handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies within the configured limit
//! - Hand every request to the dispatch core
//! - Serve until the shutdown coordinator fires

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::{Request, Response};
use crate::kernel::Application;
use crate::lifecycle::Shutdown;

/// HTTP front end of the kernel.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(app: Arc<Application>) -> Self {
        Self {
            router: Self::build_router(app),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(app: Arc<Application>) -> Router {
        let timeout = Duration::from_secs(app.config().timeouts.request_secs);
        Router::new().fallback(dispatch_handler).with_state(app).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    /// The configured router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the body and dispatches through the kernel.
async fn dispatch_handler(State(app): State<Arc<Application>>, request: axum::extract::Request) -> Response {
    let limit = app.config().listener.max_body_bytes;
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(path = %parts.uri.path(), limit, error = %error, "Request body rejected");
            return Response::error(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
        }
    };

    app.handle(Request::from_parts(parts, body)).await
}
