//! Schema tagging
//!
//! Writes PII classifications back to the Schema Registry: `doc` annotations
//! on the Avro fields that classified, a new schema version registered with
//! compatibility temporarily relaxed, and best-effort subject-level metadata.
//! A local JSON backup of the schema is written before any mutation.

use crate::adapters::registry::{SchemaInfo, SchemaRegistry, SubjectMetadata};
use crate::config::TaggingConfig;
use crate::domain::Result;
use crate::pii::FieldClassification;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of tagging one subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggingOutcome {
    /// Whether the tagging pass completed (zero matched fields still counts)
    pub success: bool,
    /// Number of Avro fields that received a `doc` annotation
    pub fields_tagged: usize,
    /// Version of the newly registered schema, when known
    pub schema_version: Option<u32>,
    /// Id of the newly registered schema
    pub schema_id: Option<u32>,
    /// Whether subject-level metadata was applied
    pub metadata_applied: bool,
    /// Path of the pre-mutation backup, if one was written
    pub backup_path: Option<PathBuf>,
    /// Non-fatal errors collected along the way
    pub errors: Vec<String>,
}

/// Handles tagging schemas in the Schema Registry with PII metadata
pub struct SchemaTagger {
    client: Arc<dyn SchemaRegistry>,
    config: TaggingConfig,
}

impl SchemaTagger {
    /// Create a tagger over a registry client
    pub fn new(client: Arc<dyn SchemaRegistry>, config: TaggingConfig) -> Self {
        Self { client, config }
    }

    /// Tag a subject's schema with field classifications
    ///
    /// Short-circuits when tagging is disabled or there is nothing to tag.
    /// Missing subjects and unparseable schemas are recorded in
    /// [`TaggingOutcome::errors`] rather than failing the scan.
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable transport failures while
    /// fetching the schema.
    pub async fn tag_schema(
        &self,
        subject: &str,
        classifications: &HashMap<String, FieldClassification>,
        schema_info: Option<SchemaInfo>,
    ) -> Result<TaggingOutcome> {
        let mut outcome = TaggingOutcome::default();

        if !self.config.enabled {
            tracing::info!(subject, "Tagging disabled, skipping schema update");
            return Ok(outcome);
        }

        if classifications.is_empty() {
            tracing::info!(subject, "No PII fields to tag");
            return Ok(outcome);
        }

        let schema_info = match schema_info {
            Some(info) => info,
            None => match self.client.get_schema(subject).await? {
                Some(info) => info,
                None => {
                    let msg = format!("Schema not found for subject {subject}, cannot tag");
                    tracing::warn!(subject, "{msg}");
                    outcome.errors.push(msg);
                    return Ok(outcome);
                }
            },
        };

        if self.config.create_backup {
            outcome.backup_path = self.create_backup(subject, &schema_info);
        }

        let write_metadata = match self.config.tag_format.as_str() {
            "metadata" => true,
            "description" => false,
            other => {
                let msg = format!("Unknown tag format: {other}");
                tracing::warn!(subject, "{msg}");
                outcome.errors.push(msg);
                return Ok(outcome);
            }
        };

        self.apply_annotations(subject, classifications, &schema_info, write_metadata, outcome)
            .await
    }

    /// Annotate classified fields, register the schema, and (optionally)
    /// apply subject metadata
    async fn apply_annotations(
        &self,
        subject: &str,
        classifications: &HashMap<String, FieldClassification>,
        schema_info: &SchemaInfo,
        write_metadata: bool,
        mut outcome: TaggingOutcome,
    ) -> Result<TaggingOutcome> {
        let mut avro_schema: Value = match serde_json::from_str(&schema_info.schema) {
            Ok(schema) => schema,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("Failed to parse AVRO schema JSON: {e}"));
                return Ok(outcome);
            }
        };

        let tagged_count = match avro_schema.get_mut("fields").and_then(Value::as_array_mut) {
            Some(fields) => annotate_fields(fields, classifications, ""),
            None => {
                let msg = format!(
                    "AVRO schema for {subject} has no 'fields' key (type={:?}). Cannot tag.",
                    avro_schema.get("type")
                );
                tracing::warn!(subject, "{msg}");
                outcome.errors.push(msg);
                return Ok(outcome);
            }
        };
        outcome.fields_tagged = tagged_count;

        if tagged_count == 0 {
            tracing::info!(
                subject,
                classifications = ?classifications.keys().collect::<Vec<_>>(),
                "No matching fields found in schema"
            );
            // Nothing to do is not a failure
            outcome.success = true;
            return Ok(outcome);
        }

        let updated_schema = match serde_json::to_string(&avro_schema) {
            Ok(schema) => schema,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("Failed to serialize tagged schema: {e}"));
                return Ok(outcome);
            }
        };

        match self
            .register_with_relaxed_compatibility(subject, &updated_schema, &schema_info.schema_type)
            .await
        {
            Ok(schema_id) => {
                outcome.schema_id = Some(schema_id);
                outcome.success = true;
                tracing::info!(
                    subject,
                    fields_tagged = tagged_count,
                    schema_id,
                    "Registered tagged schema"
                );

                // Fetch the new version number; non-critical
                if let Ok(Some(new_info)) = self.client.get_schema(subject).await {
                    outcome.schema_version = Some(new_info.version);
                }
            }
            Err(e) => {
                let msg = format!("Failed to register tagged schema for {subject}: {e}");
                tracing::error!(subject, error = %e, "Schema registration failed");
                outcome.errors.push(msg);
                return Ok(outcome);
            }
        }

        if write_metadata {
            let metadata = build_subject_metadata(classifications, tagged_count);
            match self.client.update_schema_metadata(subject, &metadata).await {
                Ok(applied) => outcome.metadata_applied = applied,
                Err(e) => {
                    let msg = format!("Subject-level metadata update failed for {subject}: {e}");
                    tracing::warn!(subject, error = %e, "Metadata update failed");
                    // Not a hard failure; doc annotations were already written
                    outcome.errors.push(msg);
                }
            }
        }

        Ok(outcome)
    }

    /// Register a schema with the subject's compatibility temporarily set to
    /// NONE, restoring the original setting afterwards
    ///
    /// Adding `doc` fields is typically compatible under BACKWARD/FORWARD
    /// anyway, so compatibility API failures downgrade to a direct register.
    async fn register_with_relaxed_compatibility(
        &self,
        subject: &str,
        schema: &str,
        schema_type: &str,
    ) -> Result<u32> {
        let original = self.client.get_compatibility(subject).await.unwrap_or(None);

        let relaxed = match self.client.set_compatibility(subject, "NONE").await {
            Ok(changed) => {
                if changed {
                    tracing::debug!(
                        subject,
                        original = original.as_deref().unwrap_or("global default"),
                        "Temporarily set compatibility to NONE"
                    );
                }
                changed
            }
            Err(e) => {
                tracing::debug!(subject, error = %e, "Compatibility API unavailable");
                false
            }
        };

        let registration = self.client.register_schema(subject, schema, schema_type).await;

        if relaxed {
            match &original {
                Some(level) => {
                    if let Err(e) = self.client.set_compatibility(subject, level).await {
                        tracing::warn!(subject, error = %e, "Failed to restore compatibility");
                    }
                }
                None => {
                    // No subject-level setting existed before; remove the override
                    if let Err(e) = self.client.delete_subject_config(subject).await {
                        tracing::warn!(
                            subject,
                            error = %e,
                            "Failed to remove compatibility override"
                        );
                    }
                }
            }
        }

        registration
    }

    /// Write a local JSON backup of a schema before modification
    ///
    /// Backups land at `<backup_dir>/<subject>/v<version>_<timestamp>.json`.
    /// Failure to back up is a warning; tagging continues.
    fn create_backup(&self, subject: &str, schema_info: &SchemaInfo) -> Option<PathBuf> {
        let result = (|| -> Result<PathBuf> {
            let safe_subject: String = subject
                .chars()
                .map(|c| if c == '/' || c == '\\' { '_' } else { c })
                .collect();
            let subject_dir = Path::new(&self.config.backup_dir).join(safe_subject);
            std::fs::create_dir_all(&subject_dir)?;

            let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
            let backup_path =
                subject_dir.join(format!("v{}_{timestamp}.json", schema_info.version));

            let backup_data = json!({
                "subject": subject,
                "version": schema_info.version,
                "schema_id": schema_info.schema_id,
                "schema_type": schema_info.schema_type,
                "schema": schema_info.schema,
                "backed_up_at": timestamp.to_string(),
            });

            std::fs::write(&backup_path, serde_json::to_string_pretty(&backup_data)?)?;
            Ok(backup_path)
        })();

        match result {
            Ok(path) => {
                tracing::info!(
                    subject,
                    version = schema_info.version,
                    path = %path.display(),
                    "Schema backup saved"
                );
                Some(path)
            }
            Err(e) => {
                tracing::warn!(
                    subject,
                    error = %e,
                    "Failed to create schema backup. Continuing with tagging anyway."
                );
                None
            }
        }
    }

    /// Summarize the tags that would be applied, without touching the registry
    pub fn tags_summary(
        classifications: &HashMap<String, FieldClassification>,
    ) -> BTreeMap<String, usize> {
        let mut tag_counts = BTreeMap::new();
        for classification in classifications.values() {
            for tag in &classification.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        tag_counts
    }
}

/// Build the `doc` string for a tagged field
///
/// Format: `PII: TYPE1, TYPE2 (confidence: 0.95)`
fn build_doc_annotation(classification: &FieldClassification) -> String {
    let mut names: Vec<&str> = classification
        .pii_types
        .iter()
        .map(|t| t.label())
        .collect();
    names.sort_unstable();
    format!(
        "PII: {} (confidence: {:.2})",
        names.join(", "),
        classification.confidence
    )
}

/// Walk an Avro `fields` array and annotate classified fields in place
///
/// Handles flat records, nested records, union branches, and record-typed
/// array items / map values. Fields match on the full dotted path or the
/// bare field name. Returns the number of fields annotated.
fn annotate_fields(
    fields: &mut [Value],
    classifications: &HashMap<String, FieldClassification>,
    prefix: &str,
) -> usize {
    let mut tagged_count = 0;

    for field_def in fields.iter_mut() {
        let field_name = field_def
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let field_path = if prefix.is_empty() {
            field_name.clone()
        } else {
            format!("{prefix}.{field_name}")
        };

        let classification = classifications
            .get(&field_path)
            .or_else(|| classifications.get(&field_name));
        if let Some(classification) = classification {
            if let Some(obj) = field_def.as_object_mut() {
                obj.insert("doc".to_string(), json!(build_doc_annotation(classification)));
                tagged_count += 1;
            }
        }

        if let Some(field_type) = field_def.get_mut("type") {
            tagged_count += annotate_nested(field_type, classifications, &field_path);
        }
    }

    tagged_count
}

/// Descend into nested record schemas found in a field's type definition
fn annotate_nested(
    field_type: &mut Value,
    classifications: &HashMap<String, FieldClassification>,
    prefix: &str,
) -> usize {
    let mut tagged_count = 0;

    match field_type {
        Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
            Some("record") => {
                if let Some(nested_fields) =
                    obj.get_mut("fields").and_then(Value::as_array_mut)
                {
                    tagged_count += annotate_fields(nested_fields, classifications, prefix);
                }
            }
            Some("array") => {
                if let Some(items) = obj.get_mut("items") {
                    if items.get("type").and_then(Value::as_str) == Some("record") {
                        tagged_count += annotate_nested(items, classifications, prefix);
                    }
                }
            }
            Some("map") => {
                if let Some(values) = obj.get_mut("values") {
                    if values.get("type").and_then(Value::as_str) == Some("record") {
                        tagged_count += annotate_nested(values, classifications, prefix);
                    }
                }
            }
            _ => {}
        },
        Value::Array(branches) => {
            // Union type: check each branch
            for branch in branches {
                tagged_count += annotate_nested(branch, classifications, prefix);
            }
        }
        _ => {}
    }

    tagged_count
}

/// Build the subject-level metadata payload from the classifications
fn build_subject_metadata(
    classifications: &HashMap<String, FieldClassification>,
    fields_tagged: usize,
) -> SubjectMetadata {
    let mut all_tags: BTreeSet<String> = BTreeSet::new();
    let mut field_names: Vec<String> = Vec::new();
    let mut confidence_sum = 0.0;

    for (field_path, classification) in classifications {
        all_tags.extend(classification.tags.iter().cloned());
        field_names.push(field_path.clone());
        confidence_sum += classification.confidence;
    }

    let avg_confidence = if classifications.is_empty() {
        0.0
    } else {
        confidence_sum / classifications.len() as f64
    };
    field_names.sort_unstable();

    let mut properties = BTreeMap::new();
    properties.insert("pii_fields".to_string(), field_names.join(","));
    properties.insert(
        "classification_confidence".to_string(),
        format!("{avg_confidence:.2}"),
    );
    properties.insert("fields_tagged".to_string(), fields_tagged.to_string());
    properties.insert(
        "tagged_at".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );

    SubjectMetadata {
        tags: all_tags.into_iter().collect(),
        properties,
    }
}
