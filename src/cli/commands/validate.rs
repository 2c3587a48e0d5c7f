//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Argus configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing
        let config = match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid");
                config
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Kafka Bootstrap: {}", config.kafka.bootstrap_servers);
        println!("  Security Protocol: {}", config.kafka.security_protocol);
        println!("  Schema Registry: {}", config.schema_registry.url);
        println!(
            "  Enabled PII Types: {}",
            if config.detection.enabled_types.is_empty() {
                "(none - detections will be filtered out)".to_string()
            } else {
                config.detection.enabled_types.join(", ")
            }
        );
        println!(
            "  Confidence Threshold: {}",
            config.detection.confidence_threshold
        );
        println!(
            "  Min Detection Rate: {}",
            config.detection.min_detection_rate
        );
        println!("  Sampling Strategy: {}", config.sampling.strategy);
        println!("  Tagging Enabled: {}", config.tagging.enabled);
        println!("  Reporting Enabled: {}", config.reporting.enabled);
        println!(
            "  Topics: {}",
            if config.topics.is_empty() {
                "(all)".to_string()
            } else {
                config.topics.join(", ")
            }
        );
        println!("  Parallel Topics: {}", config.parallel_topics);
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
