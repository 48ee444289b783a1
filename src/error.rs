//! Crate-level error types.

use std::any::Any;

use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::routing::RouteError;

/// Boxed error used at extension points (middleware, jobs, state initiators).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structural defects found while assembling the application. Fatal at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("configuration validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("state initiator '{name}' failed: {source}")]
    StateInit {
        name: String,
        #[source]
        source: BoxError,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
