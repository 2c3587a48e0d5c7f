//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "argus.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("Initializing Argus configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your cluster settings", self.output);
                println!("  2. List the PII types to report under [detection] enabled_types");
                println!("  3. Create a .env file with your credentials:");
                println!("     - Set ARGUS_KAFKA_SASL_PASSWORD (if using SASL)");
                println!("     - Set ARGUS_SCHEMA_REGISTRY_PASSWORD (if using basic auth)");
                println!("  4. Validate configuration: argus validate-config");
                println!("  5. Run a scan: argus scan --snapshot-dir <dir>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the sample configuration
    fn sample_config() -> &'static str {
        r#"# Argus Configuration File
# Kafka PII Classification Agent

# Runtime environment (development, staging, production)
environment = "development"

# Topics to analyze; empty means every topic the source lists
topics = []
parallel_topics = 10

[application]
log_level = "info"
dry_run = false

[kafka]
bootstrap_servers = "localhost:9092"
security_protocol = "plaintext"  # plaintext | ssl | sasl_plaintext | sasl_ssl
# sasl_mechanism = "PLAIN"
# sasl_username = "client"
# sasl_password = "${ARGUS_KAFKA_SASL_PASSWORD}"

[schema_registry]
url = "http://localhost:8081"
auth_type = "none"  # none | basic
# username = "client"
# password = "${ARGUS_SCHEMA_REGISTRY_PASSWORD}"

[detection]
# Categories reported by classification. An empty list disables reporting.
enabled_types = ["SSN", "EMAIL", "PHONE_NUMBER", "CREDIT_CARD", "NAME", "ADDRESS"]
providers = ["pattern"]
confidence_threshold = 0.7
min_detection_rate = 0.3
require_multiple_detections = true

[sampling]
strategy = "percentage"  # percentage | count | all
sample_percentage = 5
max_samples_per_partition = 100
min_samples_per_partition = 10

[tagging]
enabled = false
tag_format = "metadata"  # metadata | description
create_backup = true
backup_dir = "schema_backups"

[reporting]
enabled = true
output_dir = "reports"

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config: crate::config::ArgusConfig =
            toml::from_str(InitArgs::sample_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.strategy, "percentage");
    }

    #[test]
    fn test_init_args_creation() {
        let args = InitArgs {
            output: "argus.toml".to_string(),
            force: false,
        };
        let _ = format!("{args:?}");
    }
}
