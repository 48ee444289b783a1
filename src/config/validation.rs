//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (global middleware names exist in the registry)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Run application-registered validators
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: (AppConfig, Registry) → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route middleware is not checked here; unknown names fail at first use

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::AppConfig;
use crate::kernel::{ComponentKind, Registry};

/// A single semantic defect in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("global_middlewares[{index}]: '{name}' is not registered")]
    UnknownMiddleware { name: String, index: usize },

    #[error("global_middlewares[{index}]: '{name}' is registered as a {kind}, not a middleware")]
    NotMiddleware {
        name: String,
        index: usize,
        kind: ComponentKind,
    },

    #[error("{0}")]
    Custom(String),
}

/// Application-defined configuration check.
pub trait ConfigValidator: Send + Sync {
    /// Return a message describing the problem, if any.
    fn validate(&self, config: &AppConfig) -> Result<(), String>;
}

impl<F> ConfigValidator for F
where
    F: Fn(&AppConfig) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, config: &AppConfig) -> Result<(), String> {
        self(config)
    }
}

pub fn validate_config(config: &AppConfig, registry: &Registry) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (index, spec) in config.global_middlewares.iter().enumerate() {
        match registry.kind_of(&spec.name) {
            Some(ComponentKind::Middleware) => {}
            Some(kind) => errors.push(ValidationError::NotMiddleware {
                name: spec.name.clone(),
                index,
                kind,
            }),
            None => errors.push(ValidationError::UnknownMiddleware {
                name: spec.name.clone(),
                index,
            }),
        }
    }

    for validator in registry.validators() {
        if let Err(message) = validator.validate(config) {
            errors.push(ValidationError::Custom(message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            tracing::error!(error = %error, "Configuration rejected");
        }
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::builtin::AccessLog;
    use crate::middleware::MiddlewareSpec;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default(), &Registry::new()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.global_middlewares = vec![
            MiddlewareSpec::new("access_log"),
            MiddlewareSpec::new("missing"),
            MiddlewareSpec::new("db"),
        ];

        let mut registry = Registry::new();
        registry
            .middleware("access_log", || AccessLog)
            .state_initiator("db", "db", |_config: &AppConfig| Ok(()));

        let errors = validate_config(&config, &registry).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("not-an-address".into()),
                ValidationError::ZeroRequestTimeout,
                ValidationError::UnknownMiddleware {
                    name: "missing".into(),
                    index: 1
                },
                ValidationError::NotMiddleware {
                    name: "db".into(),
                    index: 2,
                    kind: ComponentKind::StateInitiator
                },
            ]
        );
    }

    #[test]
    fn test_custom_validator() {
        let mut registry = Registry::new();
        registry.validator(|config: &AppConfig| {
            if config.get("db.host").is_some() {
                Ok(())
            } else {
                Err("db.host is required".to_string())
            }
        });

        let errors = validate_config(&AppConfig::default(), &registry).unwrap_err();

        assert_eq!(errors, vec![ValidationError::Custom("db.host is required".into())]);
    }
}
