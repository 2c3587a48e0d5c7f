//! Domain error types
//!
//! This module defines the error hierarchy for Argus. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Argus error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ArgusError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Kafka source errors
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaSourceError),

    /// Schema Registry errors
    #[error("Schema Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Detection pipeline errors
    #[error("Detection error: {0}")]
    Detection(String),

    /// Classification errors
    #[error("Classification error: {0}")]
    Classification(String),

    /// Schema tagging errors
    #[error("Tagging error: {0}")]
    Tagging(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Report generation errors
    #[error("Reporting error: {0}")]
    Reporting(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Kafka-specific errors
///
/// Errors that occur when sampling messages from Kafka.
/// These errors don't expose third-party client types.
#[derive(Debug, Error)]
pub enum KafkaSourceError {
    /// Failed to connect to the Kafka cluster
    #[error("Failed to connect to Kafka: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Topic not found
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    /// Partition metadata could not be fetched
    #[error("Failed to fetch partition metadata: {0}")]
    MetadataFailed(String),

    /// Message consumption failed
    #[error("Failed to consume messages: {0}")]
    ConsumeFailed(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Schema Registry-specific errors
///
/// Errors that occur when interacting with the Confluent Schema Registry.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the registry
    #[error("Failed to connect to Schema Registry: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Subject not found (404)
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    /// Schema registration was rejected
    #[error("Schema registration failed: {0}")]
    RegistrationFailed(String),

    /// Compatibility endpoint failure
    #[error("Compatibility update failed: {0}")]
    CompatibilityFailed(String),

    /// Invalid response from the registry
    #[error("Invalid response from Schema Registry: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ArgusError {
    fn from(err: std::io::Error) -> Self {
        ArgusError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArgusError {
    fn from(err: serde_json::Error) -> Self {
        ArgusError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ArgusError {
    fn from(err: toml::de::Error) -> Self {
        ArgusError::Configuration(format!("TOML parse error: {err}"))
    }
}
