//! Scan report generation
//!
//! Serializes a [`ScanSummary`] to a timestamped JSON file. Detected sample
//! values never land in reports verbatim: they are masked down to their last
//! four characters, with a SHA-256 fingerprint retained so the same value can
//! be correlated across runs.

use crate::config::ReportingConfig;
use crate::core::scan::ScanSummary;
use crate::domain::{ArgusError, Result};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Mask a detected value for reporting, keeping the last `keep_last` chars
pub fn mask_value(value: &str, keep_last: usize) -> String {
    let char_count = value.chars().count();
    if value.is_empty() || char_count <= keep_last {
        return "*".repeat(char_count);
    }

    let masked_length = char_count - keep_last;
    let suffix: String = value.chars().skip(masked_length).collect();
    format!("{}{suffix}", "*".repeat(masked_length))
}

/// Short SHA-256 fingerprint of a value for cross-run correlation
pub fn fingerprint(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..12].to_string()
}

/// Writes scan reports to disk
pub struct ReportGenerator {
    config: ReportingConfig,
}

impl ReportGenerator {
    /// Create a generator from the reporting configuration
    pub fn new(config: ReportingConfig) -> Self {
        Self { config }
    }

    /// Generate report files for a scan run
    ///
    /// Returns the paths written; empty when reporting is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created or the
    /// report cannot be serialized and written.
    pub fn generate(&self, summary: &ScanSummary) -> Result<Vec<PathBuf>> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            ArgusError::Reporting(format!(
                "Failed to create report directory {}: {e}",
                self.config.output_dir
            ))
        })?;

        let timestamp = summary.started_at.format("%Y%m%dT%H%M%SZ");
        let short_run = summary.run_id.chars().take(8).collect::<String>();
        let path = PathBuf::from(&self.config.output_dir)
            .join(format!("pii_scan_{short_run}_{timestamp}.json"));

        let document = masked_summary(summary)?;
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)
            .map_err(|e| ArgusError::Reporting(format!("Failed to write report: {e}")))?;

        tracing::info!(path = %path.display(), "Scan report written");
        Ok(vec![path])
    }
}

/// Serialize a summary with every detected sample value masked
fn masked_summary(summary: &ScanSummary) -> Result<Value> {
    let mut document = serde_json::to_value(summary)?;

    if let Some(topics) = document
        .get_mut("topics_analyzed")
        .and_then(Value::as_array_mut)
    {
        for topic in topics {
            let classifications = match topic
                .get_mut("classifications")
                .and_then(Value::as_object_mut)
            {
                Some(map) => map,
                None => continue,
            };

            for classification in classifications.values_mut() {
                if let Some(values) = classification
                    .get_mut("sample_values")
                    .and_then(Value::as_array_mut)
                {
                    for value in values.iter_mut() {
                        if let Some(raw) = value.as_str() {
                            *value = json!({
                                "masked": mask_value(raw, 4),
                                "fingerprint": fingerprint(raw),
                            });
                        }
                    }
                }
            }
        }
    }

    Ok(document)
}
