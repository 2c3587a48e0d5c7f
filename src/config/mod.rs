//! Configuration management
//!
//! This module handles loading, validating, and accessing the Argus
//! configuration from TOML files with environment variable overrides.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ArgusConfig, DetectionConfig, Environment, KafkaConfig, LoggingConfig,
    RegistryConfig, ReportingConfig, SamplingConfig, TaggingConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
