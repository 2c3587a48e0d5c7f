//! Scan coordinator
//!
//! Fans the classification pipeline out over topics: sample, parse, flatten,
//! detect, classify, and optionally tag. Topics run concurrently with bounded
//! parallelism; a failing topic contributes an error entry and never aborts
//! the run.

use crate::adapters::kafka::MessageSource;
use crate::adapters::registry::SchemaRegistry;
use crate::config::ArgusConfig;
use crate::core::inference::SchemaInferrer;
use crate::core::sampling::SamplingPlan;
use crate::core::scan::summary::{ScanSummary, TopicReport};
use crate::core::tagging::SchemaTagger;
use crate::core::transform::flatten_message;
use crate::domain::{Result, TopicName};
use crate::pii::{Detection, DetectionEngine, FieldClassifier};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Leniently parse a message payload as JSON
///
/// Accepts plain UTF-8 JSON and payloads with a binary framing prefix (e.g.
/// the Confluent wire format's magic byte and schema id) by scanning forward
/// to the first `{` or `[`. Scalar payloads and undecodable bytes yield
/// `None`.
pub fn parse_payload(payload: &[u8]) -> Option<Value> {
    if let Ok(text) = std::str::from_utf8(payload) {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            if value.is_object() || value.is_array() {
                return Some(value);
            }
        }
    }

    let start = payload
        .iter()
        .position(|b| *b == b'{')
        .or_else(|| payload.iter().position(|b| *b == b'['))?;
    let text = std::str::from_utf8(&payload[start..]).ok()?;
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() || value.is_array() => Some(value),
        _ => None,
    }
}

/// Orchestrates the PII classification workflow across topics
pub struct ScanCoordinator {
    source: Arc<dyn MessageSource>,
    registry: Arc<dyn SchemaRegistry>,
    engine: Arc<DetectionEngine>,
    classifier: Arc<FieldClassifier>,
    tagger: Arc<SchemaTagger>,
    inferrer: Arc<SchemaInferrer>,
    plan: SamplingPlan,
    parallel_topics: usize,
    max_partitions_per_topic: Option<usize>,
    tagging_enabled: bool,
    dry_run: bool,
}

impl ScanCoordinator {
    /// Assemble a coordinator from its collaborators and configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the sampling plan cannot be built from the
    /// configuration.
    pub fn new(
        config: &ArgusConfig,
        source: Arc<dyn MessageSource>,
        registry: Arc<dyn SchemaRegistry>,
        engine: Arc<DetectionEngine>,
        classifier: Arc<FieldClassifier>,
        tagger: Arc<SchemaTagger>,
    ) -> Result<Self> {
        let plan = SamplingPlan::from_config(&config.sampling)?;

        Ok(Self {
            source,
            registry,
            engine,
            classifier,
            tagger,
            inferrer: Arc::new(SchemaInferrer::default()),
            plan,
            parallel_topics: config.parallel_topics,
            max_partitions_per_topic: config.sampling.max_partitions_per_topic,
            tagging_enabled: config.tagging.enabled,
            dry_run: config.application.dry_run,
        })
    }

    /// Run the classification workflow
    ///
    /// Analyzes the given topics, or every topic the source can list when
    /// `topics` is empty.
    pub async fn run(&self, topics: Vec<String>) -> Result<ScanSummary> {
        let mut summary = ScanSummary::begin();

        let topics = if topics.is_empty() {
            let discovered = self.source.list_topics().await?;
            tracing::info!(count = discovered.len(), "No topics specified, analyzing all");
            discovered
        } else {
            topics
        };

        if topics.is_empty() {
            tracing::info!("No topics to analyze");
            summary.finish();
            return Ok(summary);
        }

        let workers = self.parallel_topics.min(topics.len()).max(1);
        tracing::info!(topics = topics.len(), workers, "Starting scan");

        let results: Vec<(String, Result<TopicReport>)> = stream::iter(topics)
            .map(|topic| async move {
                let result = self.process_topic(&topic).await;
                (topic, result)
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        for (topic, result) in results {
            match result {
                Ok(report) => summary.add_topic(report),
                Err(e) => {
                    let msg = format!("Error processing topic {topic}: {e}");
                    tracing::error!(topic, error = %e, "Topic scan failed");
                    summary.add_error(msg);
                }
            }
        }

        summary.finish();
        tracing::info!(
            topics = summary.topics_analyzed.len(),
            pii_fields = summary.total_pii_fields,
            errors = summary.errors.len(),
            "Scan complete"
        );
        Ok(summary)
    }

    /// Scan one topic end to end
    async fn process_topic(&self, topic: &str) -> Result<TopicReport> {
        tracing::debug!(topic, "Processing topic");

        if self.source.is_topic_empty(topic).await? {
            tracing::debug!(topic, "Topic is empty, skipping");
            return Ok(TopicReport::empty(topic));
        }

        let topic_name =
            TopicName::new(topic).map_err(crate::domain::ArgusError::Validation)?;
        let subject = topic_name.value_subject();

        let schema_info = self.registry.get_schema(subject.as_str()).await?;
        let is_schemaless = schema_info.is_none();
        tracing::debug!(topic, schemaless = is_schemaless, "Checked schema");

        let samples = self
            .source
            .sample_topic(topic, &self.plan, self.max_partitions_per_topic)
            .await?;
        tracing::debug!(topic, samples = samples.len(), "Collected samples");

        if samples.is_empty() {
            return Ok(TopicReport::no_samples(topic, is_schemaless));
        }
        let total_samples = samples.len();

        // Parse and flatten what we can; undecodable payloads drop out
        let parsed: Vec<Value> = samples
            .iter()
            .filter_map(|msg| parse_payload(&msg.payload))
            .collect();
        let flattened: Vec<HashMap<String, Value>> = parsed
            .iter()
            .map(|sample| flatten_message(sample).into_iter().collect())
            .collect();

        let mut field_detections: HashMap<String, Vec<Vec<Detection>>> = HashMap::new();

        // Schema-level detection runs once per topic with a handful of samples
        if self.engine.has_schema_detectors() && !parsed.is_empty() {
            let mut field_names: Vec<String> = flattened
                .iter()
                .flat_map(|fields| fields.keys().cloned())
                .collect();
            field_names.sort_unstable();
            field_names.dedup();

            let context = &parsed[..parsed.len().min(10)];
            let schema_detections = self.engine.detect_in_schema(&field_names, context);

            // Schema-level results apply to every sample carrying the field
            for (field_path, detections) in schema_detections {
                let per_sample = field_detections.entry(field_path.clone()).or_default();
                for sample_fields in &flattened {
                    if sample_fields.contains_key(&field_path) {
                        per_sample.push(detections.clone());
                    }
                }
            }
        }

        // Per-value detection for every scalar of every sample
        for sample_fields in &flattened {
            for (field_path, value) in sample_fields {
                let detections = self.engine.detect_in_field(field_path, value);
                if !detections.is_empty() {
                    field_detections
                        .entry(field_path.clone())
                        .or_default()
                        .push(detections);
                }
            }
        }

        let classifications = self
            .classifier
            .classify_fields(&field_detections, total_samples);
        tracing::debug!(topic, classified = classifications.len(), "Classified fields");

        let inferred_schema = if is_schemaless && !parsed.is_empty() {
            Some(self.inferrer.infer(&parsed))
        } else {
            None
        };

        let tagging = if self.tagging_enabled && !self.dry_run && !classifications.is_empty() {
            match self
                .tagger
                .tag_schema(subject.as_str(), &classifications, schema_info)
                .await
            {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    tracing::error!(topic, error = %e, "Tagging failed");
                    None
                }
            }
        } else {
            None
        };

        let pii_fields_found = classifications
            .values()
            .filter(|c| !c.pii_types.is_empty())
            .count();

        Ok(TopicReport {
            topic: topic.to_string(),
            samples: total_samples,
            fields_classified: classifications.len(),
            pii_fields_found,
            schemaless: is_schemaless,
            empty: false,
            classifications,
            inferred_schema,
            tagging,
        })
    }
}
