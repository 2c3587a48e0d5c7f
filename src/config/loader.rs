//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ArgusConfig;
use crate::config::secret_string_opt;
use crate::domain::errors::ArgusError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ArgusConfig
/// 4. Applies environment variable overrides (ARGUS_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use argus::config::loader::load_config;
///
/// let config = load_config("argus.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ArgusConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(ArgusError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        ArgusError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: ArgusConfig = toml::from_str(&contents)
        .map_err(|e| ArgusError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config);

    // Validate configuration
    config
        .validate()
        .map_err(|e| ArgusError::Configuration(format!("Configuration validation failed: {}", e)))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Arguments
///
/// * `input` - String containing ${VAR} placeholders
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid substitution pattern");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ArgusError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using ARGUS_* prefix
///
/// Environment variables follow the pattern: ARGUS_<SECTION>_<KEY>
/// For example: ARGUS_KAFKA_BOOTSTRAP_SERVERS, ARGUS_TAGGING_ENABLED
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
fn apply_env_overrides(config: &mut ArgusConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("ARGUS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("ARGUS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Kafka overrides
    if let Ok(val) = std::env::var("ARGUS_KAFKA_BOOTSTRAP_SERVERS") {
        config.kafka.bootstrap_servers = val;
    }
    if let Ok(val) = std::env::var("ARGUS_KAFKA_SECURITY_PROTOCOL") {
        config.kafka.security_protocol = val;
    }
    if let Ok(val) = std::env::var("ARGUS_KAFKA_SASL_MECHANISM") {
        config.kafka.sasl_mechanism = Some(val);
    }
    if let Ok(val) = std::env::var("ARGUS_KAFKA_SASL_USERNAME") {
        config.kafka.sasl_username = Some(val);
    }
    if let Ok(val) = std::env::var("ARGUS_KAFKA_SASL_PASSWORD") {
        config.kafka.sasl_password = secret_string_opt(Some(val));
    }

    // Schema Registry overrides
    if let Ok(val) = std::env::var("ARGUS_SCHEMA_REGISTRY_URL") {
        config.schema_registry.url = val;
    }
    if let Ok(val) = std::env::var("ARGUS_SCHEMA_REGISTRY_AUTH_TYPE") {
        config.schema_registry.auth_type = val;
    }
    if let Ok(val) = std::env::var("ARGUS_SCHEMA_REGISTRY_USERNAME") {
        config.schema_registry.username = Some(val);
    }
    if let Ok(val) = std::env::var("ARGUS_SCHEMA_REGISTRY_PASSWORD") {
        config.schema_registry.password = secret_string_opt(Some(val));
    }

    // Detection overrides
    if let Ok(val) = std::env::var("ARGUS_DETECTION_CONFIDENCE_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.detection.confidence_threshold = threshold;
        }
    }
    if let Ok(val) = std::env::var("ARGUS_DETECTION_MIN_DETECTION_RATE") {
        if let Ok(rate) = val.parse() {
            config.detection.min_detection_rate = rate;
        }
    }
    if let Ok(val) = std::env::var("ARGUS_DETECTION_REQUIRE_MULTIPLE_DETECTIONS") {
        config.detection.require_multiple_detections = val.parse().unwrap_or(true);
    }

    // Sampling overrides
    if let Ok(val) = std::env::var("ARGUS_SAMPLING_STRATEGY") {
        config.sampling.strategy = val;
    }
    if let Ok(val) = std::env::var("ARGUS_SAMPLING_SAMPLE_PERCENTAGE") {
        if let Ok(pct) = val.parse() {
            config.sampling.sample_percentage = pct;
        }
    }

    // Tagging overrides
    if let Ok(val) = std::env::var("ARGUS_TAGGING_ENABLED") {
        config.tagging.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ARGUS_TAGGING_BACKUP_DIR") {
        config.tagging.backup_dir = val;
    }

    // Reporting overrides
    if let Ok(val) = std::env::var("ARGUS_REPORTING_ENABLED") {
        config.reporting.enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("ARGUS_REPORTING_OUTPUT_DIR") {
        config.reporting.output_dir = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ARGUS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("ARGUS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
