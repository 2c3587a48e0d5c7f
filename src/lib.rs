// Argus - Kafka PII Classification Agent
// Copyright (c) 2025 Argus Contributors
// Licensed under the MIT License

//! # Argus - Kafka PII Classification Agent
//!
//! Argus samples messages from Kafka topics, detects PII in field values,
//! aggregates per-sample detections into per-field classifications, and
//! optionally tags the Confluent Schema Registry with the results.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** PII in field values through pluggable detector backends
//! - **Resolving** conflicting detections with field-name context, numeric
//!   validation (Luhn), and category-priority tie-breaking
//! - **Classifying** fields across many samples with confidence and
//!   detection-rate thresholds
//! - **Tagging** Avro schemas in the Schema Registry with the verdicts
//!
//! ## Architecture
//!
//! Argus follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`pii`] - Detection, conflict resolution, and classification kernel
//! - [`core`] - Scan orchestration, transforms, sampling, tagging
//! - [`adapters`] - External integrations (Kafka source, Schema Registry)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`reporting`] - Scan report generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use argus::config::DetectionConfig;
//! use argus::pii::{DetectionEngine, DetectorRegistry, FieldClassifier};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DetectionConfig {
//!         enabled_types: vec!["EMAIL".to_string()],
//!         ..Default::default()
//!     };
//!
//!     let registry = DetectorRegistry::with_builtins();
//!     let engine = DetectionEngine::new(&config, &registry)?;
//!
//!     let detections = engine.detect_in_field("user.email", &json!("jane@example.com"));
//!     println!("Found {} detections", detections.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Classification
//!
//! Detections from many samples reduce to one verdict per field path:
//!
//! ```rust
//! use argus::config::DetectionConfig;
//! use argus::pii::{Detection, FieldClassifier, PiiType};
//!
//! let classifier = FieldClassifier::new(&DetectionConfig::default());
//! let samples = vec![
//!     vec![Detection::new(PiiType::Email, 0.95, "a@b.com", "email")],
//!     vec![Detection::new(PiiType::Email, 0.92, "c@d.com", "email")],
//! ];
//!
//! let verdict = classifier.classify_field("user.email", &samples, 4);
//! assert!(verdict.is_some());
//! ```
//!
//! ## Error Handling
//!
//! Argus uses the [`domain::ArgusError`] type for all errors:
//!
//! ```rust,no_run
//! use argus::domain::ArgusError;
//!
//! fn example() -> Result<(), ArgusError> {
//!     let config = argus::config::ArgusConfig::from_file("argus.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Argus uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting scan");
//! warn!(topic = "orders", "No samples collected");
//! error!(error = "timeout", "Scan failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod pii;
pub mod reporting;
