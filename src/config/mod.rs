//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (read & parse into a raw table)
//!     → env.rs (KERNEL_* process variables, then .env lines, overlaid)
//!     → deserialize into AppConfig
//!     → validation.rs (semantic checks against the Registry)
//!     → Arc<AppConfig> shared with every component via AppContext
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigLoader};
pub use schema::{AppConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig};
pub use validation::{validate_config, ConfigValidator, ValidationError};
