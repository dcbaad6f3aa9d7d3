//! Configuration module for the YesBot runtime.
//!
//! Layered, figment-based loading of logging, distribution and runtime
//! settings, plus semantic validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DistributionConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RuntimeConfig,
    SpanEventConfig, YesBotConfig,
};
pub use validation::validate_config;
