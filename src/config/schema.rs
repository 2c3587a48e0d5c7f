//! Configuration schema types
//!
//! This module defines the configuration structure for Argus.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Argus configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgusConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Kafka cluster configuration
    pub kafka: KafkaConfig,

    /// Schema Registry configuration
    pub schema_registry: RegistryConfig,

    /// PII detection and classification settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Message sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Schema tagging settings
    #[serde(default)]
    pub tagging: TaggingConfig,

    /// Report generation settings
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Topics to analyze (empty = discover all topics)
    #[serde(default)]
    pub topics: Vec<String>,

    /// Number of topics processed concurrently
    #[serde(default = "default_parallel_topics")]
    pub parallel_topics: usize,
}

impl ArgusConfig {
    /// Loads and validates configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::domain::Result<Self> {
        crate::config::loader::load_config(path)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.kafka.validate(&self.environment)?;
        self.schema_registry.validate()?;
        self.detection.validate()?;
        self.sampling.validate()?;
        self.tagging.validate()?;
        self.reporting.validate()?;
        self.logging.validate()?;

        if self.parallel_topics == 0 || self.parallel_topics > 100 {
            return Err(format!(
                "parallel_topics must be between 1 and 100, got {}",
                self.parallel_topics
            ));
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (classify but never write to the Schema Registry)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Kafka cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers
    pub bootstrap_servers: String,

    /// Security protocol (plaintext, ssl, sasl_plaintext, sasl_ssl)
    #[serde(default = "default_security_protocol")]
    pub security_protocol: String,

    /// SASL mechanism (e.g. PLAIN, SCRAM-SHA-256)
    #[serde(default)]
    pub sasl_mechanism: Option<String>,

    /// SASL username
    #[serde(default)]
    pub sasl_username: Option<String>,

    /// SASL password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub sasl_password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl KafkaConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.bootstrap_servers.is_empty() {
            return Err("kafka.bootstrap_servers cannot be empty".to_string());
        }

        let valid_protocols = ["plaintext", "ssl", "sasl_plaintext", "sasl_ssl"];
        let protocol = self.security_protocol.to_lowercase();
        if !valid_protocols.contains(&protocol.as_str()) {
            return Err(format!(
                "Invalid kafka.security_protocol '{}'. Must be one of: {}",
                self.security_protocol,
                valid_protocols.join(", ")
            ));
        }

        if protocol.starts_with("sasl") {
            if self.sasl_mechanism.is_none() {
                return Err(
                    "kafka.sasl_mechanism is required when security_protocol uses SASL".to_string(),
                );
            }
            if self
                .sasl_username
                .as_ref()
                .map(|s| s.is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "kafka.sasl_username cannot be empty when security_protocol uses SASL"
                        .to_string(),
                );
            }
            if self
                .sasl_password
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "kafka.sasl_password cannot be empty when security_protocol uses SASL"
                        .to_string(),
                );
            }
        }

        // Unencrypted brokers carry sampled message payloads in the clear
        if *environment == Environment::Production && protocol == "plaintext" {
            return Err(
                "kafka.security_protocol cannot be 'plaintext' in production environments. \
                Use 'ssl' or 'sasl_ssl'. For development/testing environments, set \
                'environment = \"development\"' or 'environment = \"staging\"'."
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            security_protocol: default_security_protocol(),
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Schema Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the Schema Registry
    pub url: String,

    /// Authentication type (none, basic)
    #[serde(default = "default_registry_auth_type")]
    pub auth_type: String,

    /// Username for basic authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.url.is_empty() {
            return Err("schema_registry.url cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("schema_registry.url must start with http:// or https://".to_string());
        }

        let valid_auth_types = ["none", "basic"];
        if !valid_auth_types.contains(&self.auth_type.as_str()) {
            return Err(format!(
                "Invalid schema_registry.auth_type '{}'. Must be one of: {}",
                self.auth_type,
                valid_auth_types.join(", ")
            ));
        }

        if self.auth_type == "basic" {
            if self
                .username
                .as_ref()
                .map(|s| s.is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "schema_registry.username cannot be empty when auth_type is 'basic'"
                        .to_string(),
                );
            }
            if self
                .password
                .as_ref()
                .map(|s| s.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "schema_registry.password cannot be empty when auth_type is 'basic'"
                        .to_string(),
                );
            }
        }

        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            auth_type: default_registry_auth_type(),
            username: None,
            password: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// PII detection and classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Detector providers to run (e.g. ["pattern"])
    #[serde(default)]
    pub providers: Vec<String>,

    /// Always include the built-in pattern detector
    #[serde(default = "default_true")]
    pub use_pattern: bool,

    /// PII category names to report (empty = report nothing)
    #[serde(default)]
    pub enabled_types: Vec<String>,

    /// Minimum mean confidence for a category to survive classification
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Minimum fraction of samples with detections for a field to qualify
    #[serde(default = "default_min_detection_rate")]
    pub min_detection_rate: f64,

    /// Require detections in at least two distinct samples
    #[serde(default = "default_true")]
    pub require_multiple_detections: bool,
}

impl DetectionConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "detection.confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.min_detection_rate) {
            return Err(format!(
                "detection.min_detection_rate must be between 0.0 and 1.0, got {}",
                self.min_detection_rate
            ));
        }

        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            use_pattern: true,
            enabled_types: Vec::new(),
            confidence_threshold: default_confidence_threshold(),
            min_detection_rate: default_min_detection_rate(),
            require_multiple_detections: true,
        }
    }
}

/// Message sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling strategy (percentage, count, all)
    #[serde(default = "default_sampling_strategy")]
    pub strategy: String,

    /// Percentage of messages to sample. Values > 1.0 are interpreted as
    /// percent (e.g. 5 means 5%)
    #[serde(default = "default_sample_percentage")]
    pub sample_percentage: f64,

    /// Maximum samples per partition
    #[serde(default = "default_max_samples_per_partition")]
    pub max_samples_per_partition: usize,

    /// Minimum samples per partition
    #[serde(default = "default_min_samples_per_partition")]
    pub min_samples_per_partition: usize,

    /// Sample count per partition (count strategy)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Optional cap on partitions scanned per topic
    #[serde(default)]
    pub max_partitions_per_topic: Option<usize>,
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_strategies = ["percentage", "count", "all"];
        if !valid_strategies.contains(&self.strategy.as_str()) {
            return Err(format!(
                "Invalid sampling.strategy '{}'. Must be one of: {}",
                self.strategy,
                valid_strategies.join(", ")
            ));
        }

        if self.sample_percentage <= 0.0 || self.sample_percentage > 100.0 {
            return Err(format!(
                "sampling.sample_percentage must be in (0, 100], got {}",
                self.sample_percentage
            ));
        }

        if self.max_samples_per_partition == 0 {
            return Err("sampling.max_samples_per_partition must be > 0".to_string());
        }

        if self.min_samples_per_partition > self.max_samples_per_partition {
            return Err(format!(
                "sampling.min_samples_per_partition ({}) cannot exceed max_samples_per_partition ({})",
                self.min_samples_per_partition, self.max_samples_per_partition
            ));
        }

        if self.sample_count == 0 {
            return Err("sampling.sample_count must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            strategy: default_sampling_strategy(),
            sample_percentage: default_sample_percentage(),
            max_samples_per_partition: default_max_samples_per_partition(),
            min_samples_per_partition: default_min_samples_per_partition(),
            sample_count: default_sample_count(),
            max_partitions_per_topic: None,
        }
    }
}

/// Schema tagging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Enable writing PII annotations back to the Schema Registry
    #[serde(default)]
    pub enabled: bool,

    /// Tag format (metadata, description)
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Create a local JSON backup of each schema before modification
    #[serde(default = "default_true")]
    pub create_backup: bool,

    /// Directory for schema backups
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

impl TaggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["metadata", "description"];
        if !valid_formats.contains(&self.tag_format.as_str()) {
            return Err(format!(
                "Invalid tagging.tag_format '{}'. Must be one of: {}",
                self.tag_format,
                valid_formats.join(", ")
            ));
        }

        if self.enabled && self.backup_dir.is_empty() && self.create_backup {
            return Err("tagging.backup_dir cannot be empty when backups are enabled".to_string());
        }

        Ok(())
    }
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tag_format: default_tag_format(),
            create_backup: true,
            backup_dir: default_backup_dir(),
        }
    }
}

/// Report generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Enable writing a JSON scan report
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output directory for reports
    #[serde(default = "default_report_dir")]
    pub output_dir: String,
}

impl ReportingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.output_dir.is_empty() {
            return Err("reporting.output_dir cannot be empty when reporting is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_report_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_security_protocol() -> String {
    "plaintext".to_string()
}

fn default_registry_auth_type() -> String {
    "none".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_min_detection_rate() -> f64 {
    0.3
}

fn default_sampling_strategy() -> String {
    "percentage".to_string()
}

fn default_sample_percentage() -> f64 {
    5.0
}

fn default_max_samples_per_partition() -> usize {
    100
}

fn default_min_samples_per_partition() -> usize {
    10
}

fn default_sample_count() -> usize {
    100
}

fn default_tag_format() -> String {
    "metadata".to_string()
}

fn default_backup_dir() -> String {
    "schema_backups".to_string()
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_local_path() -> String {
    "/var/log/argus".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_parallel_topics() -> usize {
    10
}
