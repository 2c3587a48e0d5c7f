//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Argus using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Argus - Kafka PII Classification Agent
#[derive(Parser, Debug)]
#[command(name = "argus")]
#[command(version, about, long_about = None)]
#[command(author = "Argus Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "argus.toml", env = "ARGUS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ARGUS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan topics, classify PII fields, and optionally tag schemas
    Scan(commands::scan::ScanArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_scan() {
        let cli = Cli::parse_from(["argus", "scan", "--snapshot-dir", "snapshots"]);
        assert_eq!(cli.config, "argus.toml");
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "argus",
            "--config",
            "custom.toml",
            "scan",
            "--snapshot-dir",
            "snapshots",
        ]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from([
            "argus",
            "--log-level",
            "debug",
            "scan",
            "--snapshot-dir",
            "snapshots",
        ]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_scan_topics() {
        let cli = Cli::parse_from([
            "argus",
            "scan",
            "--snapshot-dir",
            "snapshots",
            "--topic",
            "orders",
            "--topic",
            "customers",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.topics, vec!["orders", "customers"]);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["argus", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["argus", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
