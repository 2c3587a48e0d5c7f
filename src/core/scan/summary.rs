//! Scan result aggregates

use crate::core::inference::InferredField;
use crate::core::tagging::TaggingOutcome;
use crate::pii::FieldClassification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Result of scanning one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicReport {
    /// Topic name
    pub topic: String,
    /// Number of messages sampled
    pub samples: usize,
    /// Number of fields that produced a classification
    pub fields_classified: usize,
    /// Number of classified fields carrying PII categories
    pub pii_fields_found: usize,
    /// Whether the topic had no registered schema
    pub schemaless: bool,
    /// Whether the topic held no messages
    pub empty: bool,
    /// Classifications per field path
    pub classifications: HashMap<String, FieldClassification>,
    /// Inferred field inventory for schemaless topics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_schema: Option<BTreeMap<String, InferredField>>,
    /// Tagging outcome, when tagging ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagging: Option<TaggingOutcome>,
}

impl TopicReport {
    /// Report for an empty topic
    pub fn empty(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            samples: 0,
            fields_classified: 0,
            pii_fields_found: 0,
            schemaless: false,
            empty: true,
            classifications: HashMap::new(),
            inferred_schema: None,
            tagging: None,
        }
    }

    /// Report for a topic that yielded no samples
    pub fn no_samples(topic: impl Into<String>, schemaless: bool) -> Self {
        Self {
            topic: topic.into(),
            samples: 0,
            fields_classified: 0,
            pii_fields_found: 0,
            schemaless,
            empty: false,
            classifications: HashMap::new(),
            inferred_schema: None,
            tagging: None,
        }
    }
}

/// Result of one whole scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Unique id for this run
    pub run_id: String,
    /// When the scan started
    pub started_at: DateTime<Utc>,
    /// When the scan finished
    pub completed_at: DateTime<Utc>,
    /// Per-topic results
    pub topics_analyzed: Vec<TopicReport>,
    /// Total classified fields across topics
    pub total_fields_classified: usize,
    /// Total PII fields across topics
    pub total_pii_fields: usize,
    /// Per-topic errors that did not abort the run
    pub errors: Vec<String>,
}

impl ScanSummary {
    /// Start a new summary with a fresh run id
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            completed_at: now,
            topics_analyzed: Vec::new(),
            total_fields_classified: 0,
            total_pii_fields: 0,
            errors: Vec::new(),
        }
    }

    /// Fold a topic report into the totals
    pub fn add_topic(&mut self, report: TopicReport) {
        if !report.empty {
            self.total_fields_classified += report.fields_classified;
            self.total_pii_fields += report.pii_fields_found;
        }
        self.topics_analyzed.push(report);
    }

    /// Record a per-topic error
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Mark the scan finished
    pub fn finish(&mut self) {
        self.completed_at = Utc::now();
    }

    /// Topics skipped because they were empty
    pub fn empty_topic_count(&self) -> usize {
        self.topics_analyzed.iter().filter(|r| r.empty).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals_skip_empty_topics() {
        let mut summary = ScanSummary::begin();

        let mut report = TopicReport::no_samples("orders", false);
        report.samples = 10;
        report.fields_classified = 3;
        report.pii_fields_found = 2;
        summary.add_topic(report);

        let mut empty = TopicReport::empty("heartbeats");
        empty.fields_classified = 99; // never counted for empty topics
        summary.add_topic(empty);

        assert_eq!(summary.total_fields_classified, 3);
        assert_eq!(summary.total_pii_fields, 2);
        assert_eq!(summary.empty_topic_count(), 1);
    }

    #[test]
    fn test_summary_errors_accumulate() {
        let mut summary = ScanSummary::begin();
        summary.add_error("boom");
        summary.add_error("bang");
        assert_eq!(summary.errors.len(), 2);
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(ScanSummary::begin().run_id, ScanSummary::begin().run_id);
    }
}
