//! Scan command implementation
//!
//! Runs the full classification workflow: sample topics, detect and classify
//! PII fields, optionally tag schemas, and write the scan report.

use crate::adapters::kafka::SnapshotSource;
use crate::adapters::registry::RestRegistryClient;
use crate::config::load_config;
use crate::core::scan::ScanCoordinator;
use crate::core::tagging::SchemaTagger;
use crate::pii::{DetectionEngine, DetectorRegistry, FieldClassifier};
use crate::reporting::ReportGenerator;
use clap::Args;
use std::sync::Arc;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory of topic snapshots to scan (one <topic>.jsonl per topic)
    #[arg(long)]
    pub snapshot_dir: String,

    /// Topics to analyze (defaults to the configured list, then all topics)
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Classify without writing tags to the Schema Registry
    #[arg(long)]
    pub dry_run: bool,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path, snapshot_dir = %self.snapshot_dir, "Starting scan");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if self.dry_run {
            config.application.dry_run = true;
        }

        // Assemble the pipeline
        let source = Arc::new(SnapshotSource::new(&self.snapshot_dir)?);
        let registry_client = Arc::new(RestRegistryClient::new(&config.schema_registry)?);

        let detector_registry = DetectorRegistry::with_builtins();
        let engine = Arc::new(DetectionEngine::new(&config.detection, &detector_registry)?);
        let classifier = Arc::new(FieldClassifier::new(&config.detection));
        let tagger = Arc::new(SchemaTagger::new(
            registry_client.clone(),
            config.tagging.clone(),
        ));

        let coordinator = ScanCoordinator::new(
            &config,
            source,
            registry_client,
            engine,
            classifier,
            tagger,
        )?;

        let topics = if self.topics.is_empty() {
            config.topics.clone()
        } else {
            self.topics.clone()
        };

        let summary = coordinator.run(topics).await?;

        // Console summary
        println!();
        println!("Scan {} complete", summary.run_id);
        println!("  Topics analyzed:   {}", summary.topics_analyzed.len());
        println!("  Empty topics:      {}", summary.empty_topic_count());
        println!("  Fields classified: {}", summary.total_fields_classified);
        println!("  PII fields found:  {}", summary.total_pii_fields);
        if !summary.errors.is_empty() {
            println!("  Errors:            {}", summary.errors.len());
            for error in &summary.errors {
                println!("    - {error}");
            }
        }

        let report_generator = ReportGenerator::new(config.reporting.clone());
        match report_generator.generate(&summary) {
            Ok(paths) => {
                for path in paths {
                    println!("  Report: {}", path.display());
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Report generation failed");
                eprintln!("Report generation failed: {e}");
            }
        }
        println!();

        if summary.errors.is_empty() {
            Ok(0)
        } else {
            Ok(1)
        }
    }
}
