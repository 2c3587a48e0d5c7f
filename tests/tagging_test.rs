//! Schema tagging integration tests
//!
//! Exercises the tagger against an in-memory registry double, including the
//! compatibility relax/restore sequence around registration.

use argus::adapters::registry::{SchemaInfo, SchemaRegistry, SubjectMetadata};
use argus::config::TaggingConfig;
use argus::core::tagging::SchemaTagger;
use argus::domain::Result;
use argus::pii::{FieldClassification, PiiType};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Records every registry interaction in order
#[derive(Default)]
struct RecordingRegistry {
    schema: Mutex<Option<SchemaInfo>>,
    compatibility: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
    metadata_supported: bool,
}

impl RecordingRegistry {
    fn new(schema: Option<SchemaInfo>, compatibility: Option<String>) -> Self {
        Self {
            schema: Mutex::new(schema),
            compatibility: Mutex::new(compatibility),
            calls: Mutex::new(Vec::new()),
            metadata_supported: true,
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaRegistry for RecordingRegistry {
    async fn get_subjects(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }

    async fn get_schema(&self, subject: &str) -> Result<Option<SchemaInfo>> {
        self.record(format!("get_schema:{subject}"));
        Ok(self.schema.lock().unwrap().clone())
    }

    async fn register_schema(
        &self,
        subject: &str,
        _schema: &str,
        _schema_type: &str,
    ) -> Result<u32> {
        self.record(format!("register:{subject}"));
        Ok(7)
    }

    async fn get_compatibility(&self, subject: &str) -> Result<Option<String>> {
        self.record(format!("get_compat:{subject}"));
        Ok(self.compatibility.lock().unwrap().clone())
    }

    async fn set_compatibility(&self, subject: &str, level: &str) -> Result<bool> {
        self.record(format!("set_compat:{subject}:{level}"));
        Ok(true)
    }

    async fn delete_subject_config(&self, subject: &str) -> Result<()> {
        self.record(format!("delete_config:{subject}"));
        Ok(())
    }

    async fn update_schema_metadata(
        &self,
        subject: &str,
        _metadata: &SubjectMetadata,
    ) -> Result<bool> {
        self.record(format!("metadata:{subject}"));
        Ok(self.metadata_supported)
    }
}

fn schema_info(schema: serde_json::Value) -> SchemaInfo {
    SchemaInfo {
        subject: "orders-value".to_string(),
        schema_id: 1,
        version: 3,
        schema_type: "AVRO".to_string(),
        schema: schema.to_string(),
    }
}

fn user_schema() -> serde_json::Value {
    json!({
        "type": "record",
        "name": "Order",
        "fields": [
            {"name": "email", "type": "string"},
            {"name": "quantity", "type": "int"}
        ]
    })
}

fn email_classification() -> HashMap<String, FieldClassification> {
    let classification = FieldClassification {
        field_path: "email".to_string(),
        pii_types: BTreeSet::from([PiiType::Email]),
        tags: vec!["PII".to_string(), "PII-Email".to_string()],
        confidence: 0.93,
        detection_count: 6,
        total_samples: 10,
        detection_rate: 0.6,
        sample_values: vec!["a@b.com".to_string()],
    };
    HashMap::from([("email".to_string(), classification)])
}

fn tagging_config(enabled: bool, backup_dir: &str) -> TaggingConfig {
    TaggingConfig {
        enabled,
        tag_format: "metadata".to_string(),
        create_backup: true,
        backup_dir: backup_dir.to_string(),
    }
}

#[tokio::test]
async fn disabled_tagging_short_circuits() {
    let registry = Arc::new(RecordingRegistry::new(None, None));
    let tagger = SchemaTagger::new(registry.clone(), tagging_config(false, "unused"));

    let outcome = tagger
        .tag_schema("orders-value", &email_classification(), None)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.fields_tagged, 0);
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn empty_classifications_short_circuit() {
    let registry = Arc::new(RecordingRegistry::new(None, None));
    let tagger = SchemaTagger::new(registry.clone(), tagging_config(true, "unused"));

    let outcome = tagger
        .tag_schema("orders-value", &HashMap::new(), None)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn missing_subject_reports_error_without_failing() {
    let registry = Arc::new(RecordingRegistry::new(None, None));
    let tagger = SchemaTagger::new(registry, tagging_config(true, "unused"));

    let outcome = tagger
        .tag_schema("orders-value", &email_classification(), None)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("Schema not found"));
}

#[tokio::test]
async fn tags_and_restores_compatibility_override() {
    let backup_dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(RecordingRegistry::new(
        Some(schema_info(user_schema())),
        Some("BACKWARD".to_string()),
    ));
    let tagger = SchemaTagger::new(
        registry.clone(),
        tagging_config(true, &backup_dir.path().to_string_lossy()),
    );

    let outcome = tagger
        .tag_schema(
            "orders-value",
            &email_classification(),
            Some(schema_info(user_schema())),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.fields_tagged, 1);
    assert_eq!(outcome.schema_id, Some(7));
    assert_eq!(outcome.schema_version, Some(3));
    assert!(outcome.metadata_applied);
    assert!(outcome.backup_path.as_ref().unwrap().exists());

    // Compatibility was relaxed and the previous level restored
    let calls = registry.calls();
    let set_none = calls
        .iter()
        .position(|c| c == "set_compat:orders-value:NONE")
        .unwrap();
    let register = calls.iter().position(|c| c == "register:orders-value").unwrap();
    let restore = calls
        .iter()
        .position(|c| c == "set_compat:orders-value:BACKWARD")
        .unwrap();
    assert!(set_none < register);
    assert!(register < restore);
}

#[tokio::test]
async fn removes_override_when_no_subject_compatibility_existed() {
    let backup_dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(RecordingRegistry::new(
        Some(schema_info(user_schema())),
        None,
    ));
    let tagger = SchemaTagger::new(
        registry.clone(),
        tagging_config(true, &backup_dir.path().to_string_lossy()),
    );

    let outcome = tagger
        .tag_schema(
            "orders-value",
            &email_classification(),
            Some(schema_info(user_schema())),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert!(registry
        .calls()
        .contains(&"delete_config:orders-value".to_string()));
}

#[tokio::test]
async fn zero_matching_fields_is_success_without_registration() {
    let backup_dir = tempfile::tempdir().unwrap();
    let schema = json!({
        "type": "record",
        "name": "Order",
        "fields": [{"name": "quantity", "type": "int"}]
    });
    let registry = Arc::new(RecordingRegistry::new(Some(schema_info(schema.clone())), None));
    let tagger = SchemaTagger::new(
        registry.clone(),
        tagging_config(true, &backup_dir.path().to_string_lossy()),
    );

    let outcome = tagger
        .tag_schema(
            "orders-value",
            &email_classification(),
            Some(schema_info(schema)),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.fields_tagged, 0);
    assert!(!registry
        .calls()
        .iter()
        .any(|c| c.starts_with("register:")));
}

#[tokio::test]
async fn description_format_skips_subject_metadata() {
    let backup_dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(RecordingRegistry::new(
        Some(schema_info(user_schema())),
        None,
    ));
    let config = TaggingConfig {
        enabled: true,
        tag_format: "description".to_string(),
        create_backup: true,
        backup_dir: backup_dir.path().to_string_lossy().to_string(),
    };
    let tagger = SchemaTagger::new(registry.clone(), config);

    let outcome = tagger
        .tag_schema(
            "orders-value",
            &email_classification(),
            Some(schema_info(user_schema())),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert!(!outcome.metadata_applied);
    assert!(!registry
        .calls()
        .iter()
        .any(|c| c.starts_with("metadata:")));
}

#[tokio::test]
async fn unparseable_schema_reports_error() {
    let backup_dir = tempfile::tempdir().unwrap();
    let info = SchemaInfo {
        subject: "orders-value".to_string(),
        schema_id: 1,
        version: 1,
        schema_type: "AVRO".to_string(),
        schema: "definitely not json".to_string(),
    };
    let registry = Arc::new(RecordingRegistry::new(Some(info.clone()), None));
    let tagger = SchemaTagger::new(
        registry,
        tagging_config(true, &backup_dir.path().to_string_lossy()),
    );

    let outcome = tagger
        .tag_schema("orders-value", &email_classification(), Some(info))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("parse"));
}

#[tokio::test]
async fn backup_failure_does_not_block_tagging() {
    // Backups target a path that cannot be created
    let registry = Arc::new(RecordingRegistry::new(
        Some(schema_info(user_schema())),
        None,
    ));
    let tagger = SchemaTagger::new(
        registry,
        tagging_config(true, "/proc/argus-cannot-write-here"),
    );

    let outcome = tagger
        .tag_schema(
            "orders-value",
            &email_classification(),
            Some(schema_info(user_schema())),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert!(outcome.backup_path.is_none());
}
