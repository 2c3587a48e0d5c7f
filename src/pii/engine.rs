//! Detection engine
//!
//! Orchestrates the configured detector backends for a field value and
//! produces the final filtered detection list: fan out to every per-value
//! backend, deduplicate by (category, value), resolve conflicts, then apply
//! the enabled-category allow-list.

use crate::config::DetectionConfig;
use crate::core::transform::flatten_message;
use crate::domain::{ArgusError, Result};
use crate::pii::detector::{DetectorRegistry, ValueDetector};
use crate::pii::resolver::ConflictResolver;
use crate::pii::types::{Detection, PiiType};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Convert a field value to the string form detectors consume
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Multi-backend PII detection engine
///
/// # Thread Safety
///
/// The engine holds only immutable state after construction and can be shared
/// across tasks with `Arc`.
pub struct DetectionEngine {
    field_detectors: Vec<Arc<dyn ValueDetector>>,
    schema_detectors: Vec<Arc<dyn ValueDetector>>,
    enabled_types: HashSet<PiiType>,
    resolver: ConflictResolver,
}

impl DetectionEngine {
    /// Create a detection engine from configuration
    ///
    /// Providers are instantiated through the registry. A provider that fails
    /// to construct or reports itself unavailable is skipped with a warning;
    /// having zero usable providers is a configuration error.
    ///
    /// # Errors
    ///
    /// Returns an error if `enabled_types` contains an unknown category name
    /// or if no detector backend could be initialized.
    pub fn new(config: &DetectionConfig, registry: &DetectorRegistry) -> Result<Self> {
        let mut enabled_types = HashSet::new();
        for name in &config.enabled_types {
            let pii_type: PiiType = name
                .parse()
                .map_err(|e: String| ArgusError::Configuration(e))?;
            enabled_types.insert(pii_type);
        }

        if enabled_types.is_empty() {
            tracing::warn!(
                "No PII types enabled in 'enabled_types' config. All detections will be \
                 filtered out. Add types like [\"SSN\", \"EMAIL\", \"PHONE_NUMBER\"] to \
                 enabled_types."
            );
        }

        let mut providers = config.providers.clone();
        if providers.is_empty() {
            providers = vec!["pattern".to_string()];
        }
        if config.use_pattern && !providers.iter().any(|p| p.eq_ignore_ascii_case("pattern")) {
            providers.insert(0, "pattern".to_string());
        }

        let mut detectors: Vec<Arc<dyn ValueDetector>> = Vec::new();
        for provider_name in &providers {
            match registry.create(provider_name, config) {
                Ok(detector) => {
                    if detector.is_available() {
                        tracing::info!(provider = %provider_name, "Initialized PII detector");
                        detectors.push(detector);
                    } else {
                        tracing::warn!(
                            provider = %provider_name,
                            "PII detector is not available, skipping"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %provider_name,
                        error = %e,
                        "Failed to initialize PII detector"
                    );
                }
            }
        }

        if detectors.is_empty() {
            return Err(ArgusError::Configuration(format!(
                "No PII detectors available. Please check your configuration and dependencies. \
                 Registered providers: {}",
                registry.provider_names().join(", ")
            )));
        }

        let (schema_detectors, field_detectors): (Vec<_>, Vec<_>) = detectors
            .into_iter()
            .partition(|d| d.as_schema_detector().is_some());

        if !schema_detectors.is_empty() {
            let names: Vec<&str> = schema_detectors.iter().map(|d| d.name()).collect();
            tracing::info!(detectors = ?names, "Schema-level detectors configured");
        }

        Ok(Self {
            field_detectors,
            schema_detectors,
            enabled_types,
            resolver: ConflictResolver::new(),
        })
    }

    /// Detect PII in a single field value
    ///
    /// Runs every per-value backend, deduplicates by (category, value)
    /// keeping the highest confidence, resolves conflicts against the field
    /// name, and filters to enabled categories. A backend error contributes
    /// nothing and never fails the field.
    pub fn detect_in_field(&self, field_name: &str, value: &Value) -> Vec<Detection> {
        let value_str = stringify(value);

        let mut detections: Vec<Detection> = Vec::new();
        for detector in &self.field_detectors {
            match detector.detect(&value_str, Some(field_name)) {
                Ok(found) => detections.extend(found),
                Err(e) => {
                    tracing::warn!(
                        detector = detector.name(),
                        field = field_name,
                        error = %e,
                        "PII detection failed"
                    );
                }
            }
        }

        // Deduplicate by (category, value), keeping the higher confidence and
        // the first-seen position
        let mut deduped: Vec<Detection> = Vec::new();
        for det in detections {
            match deduped
                .iter_mut()
                .find(|d| d.pii_type == det.pii_type && d.value == det.value)
            {
                Some(existing) => {
                    if det.confidence > existing.confidence {
                        *existing = det;
                    }
                }
                None => deduped.push(det),
            }
        }

        let resolved = self.resolver.resolve(&deduped, field_name, &value_str);

        resolved
            .into_iter()
            .filter(|d| self.enabled_types.contains(&d.pii_type))
            .collect()
    }

    /// Detect PII in all fields of a message
    ///
    /// Flattens nested structures to dot/bracket field paths and runs
    /// [`Self::detect_in_field`] per scalar. Fields without detections are
    /// absent from the result.
    pub fn detect_in_message(&self, message: &Value) -> HashMap<String, Vec<Detection>> {
        let flat = flatten_message(message);

        let mut field_detections = HashMap::new();
        for (field_path, value) in flat {
            let detections = self.detect_in_field(&field_path, &value);
            if !detections.is_empty() {
                field_detections.insert(field_path, detections);
            }
        }
        field_detections
    }

    /// Whether any configured backend supports schema-wide batch detection
    pub fn has_schema_detectors(&self) -> bool {
        !self.schema_detectors.is_empty()
    }

    /// Run schema-level detection once for a whole topic
    ///
    /// Called once per topic with all field names and a handful of samples
    /// instead of per field value. Backend failures are logged and skipped.
    pub fn detect_in_schema(
        &self,
        field_names: &[String],
        samples: &[Value],
    ) -> HashMap<String, Vec<Detection>> {
        let mut field_detections: HashMap<String, Vec<Detection>> = HashMap::new();

        for detector in &self.schema_detectors {
            let schema_detector = match detector.as_schema_detector() {
                Some(schema_detector) => schema_detector,
                None => continue,
            };

            tracing::info!(detector = detector.name(), "Running schema-level detection");
            match schema_detector.detect_in_schema(field_names, samples) {
                Ok(grouped) => {
                    for (field_name, detections) in grouped {
                        let enabled: Vec<Detection> = detections
                            .into_iter()
                            .filter(|d| self.enabled_types.contains(&d.pii_type))
                            .collect();
                        if !enabled.is_empty() {
                            field_detections
                                .entry(field_name)
                                .or_default()
                                .extend(enabled);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(
                        detector = detector.name(),
                        error = %e,
                        "Schema-level detection failed"
                    );
                }
            }
        }

        field_detections
    }

    /// The enabled-category allow-list
    pub fn enabled_types(&self) -> &HashSet<PiiType> {
        &self.enabled_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with(types: &[&str]) -> DetectionConfig {
        DetectionConfig {
            enabled_types: types.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn engine_with(types: &[&str]) -> DetectionEngine {
        let registry = DetectorRegistry::with_builtins();
        DetectionEngine::new(&config_with(types), &registry).unwrap()
    }

    /// A backend that always fails, for degradation tests
    struct FailingDetector;

    impl ValueDetector for FailingDetector {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&self, _value: &str, _field_name: Option<&str>) -> Result<Vec<Detection>> {
            Err(ArgusError::Detection("backend exploded".to_string()))
        }

        fn is_available(&self) -> bool {
            true
        }

        fn supported_types(&self) -> &[PiiType] {
            &[]
        }
    }

    #[test]
    fn test_detect_email_in_field() {
        let engine = engine_with(&["EMAIL"]);
        let detections = engine.detect_in_field("email", &json!("john@example.com"));

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].pii_type, PiiType::Email);
    }

    #[test]
    fn test_empty_allow_list_yields_empty_results() {
        let engine = engine_with(&[]);
        let detections = engine.detect_in_field("email", &json!("john@example.com"));
        assert!(detections.is_empty());
    }

    #[test]
    fn test_unknown_enabled_type_is_config_error() {
        let registry = DetectorRegistry::with_builtins();
        let result = DetectionEngine::new(&config_with(&["FAVORITE_COLOR"]), &registry);
        assert!(matches!(result, Err(ArgusError::Configuration(_))));
    }

    #[test]
    fn test_unknown_provider_is_skipped_but_pattern_survives() {
        let registry = DetectorRegistry::with_builtins();
        let config = DetectionConfig {
            providers: vec!["nonexistent".to_string()],
            enabled_types: vec!["EMAIL".to_string()],
            ..Default::default()
        };

        // use_pattern defaults to true, so the pattern detector still loads
        let engine = DetectionEngine::new(&config, &registry).unwrap();
        let detections = engine.detect_in_field("email", &json!("a@b.com"));
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_no_usable_detectors_is_config_error() {
        let registry = DetectorRegistry::new();
        let config = config_with(&["EMAIL"]);

        let result = DetectionEngine::new(&config, &registry);
        assert!(matches!(result, Err(ArgusError::Configuration(_))));
    }

    #[test]
    fn test_failing_detector_degrades_gracefully() {
        let mut registry = DetectorRegistry::with_builtins();
        registry.register("failing", |_config| Ok(Arc::new(FailingDetector)));

        let config = DetectionConfig {
            providers: vec!["failing".to_string(), "pattern".to_string()],
            enabled_types: vec!["EMAIL".to_string()],
            ..Default::default()
        };

        let engine = DetectionEngine::new(&config, &registry).unwrap();
        let detections = engine.detect_in_field("email", &json!("a@b.com"));
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let engine = engine_with(&["BANK_ACCOUNT"]);
        let detections = engine.detect_in_field("account_number", &json!(12345678));

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].pii_type, PiiType::BankAccount);
        assert_eq!(detections[0].value, "12345678");
    }

    #[test]
    fn test_dedup_keeps_no_duplicate_category_value_pairs() {
        let engine = engine_with(&["EMAIL", "NAME", "ADDRESS"]);
        let detections = engine.detect_in_field("email", &json!("john@example.com"));

        let mut seen = HashSet::new();
        for det in &detections {
            assert!(
                seen.insert((det.pii_type, det.value.clone())),
                "duplicate (category, value) pair: {det:?}"
            );
        }
    }

    #[test]
    fn test_timestamp_field_yields_no_detections() {
        // An epoch value on a time-named field must come back empty
        let engine = engine_with(&["PHONE_NUMBER"]);
        let detections = engine.detect_in_field("event_time", &json!("1762340928"));
        assert!(detections.is_empty());
    }

    #[test]
    fn test_license_plate_field_yields_no_detections() {
        let engine = engine_with(&["DRIVER_LICENSE", "NAME", "ADDRESS"]);
        let detections = engine.detect_in_field("license_plate", &json!("ABC1234"));
        assert!(detections.is_empty());
    }

    #[test]
    fn test_card_number_resolves_to_credit_card_only() {
        let engine = engine_with(&["CREDIT_CARD", "DATE_OF_BIRTH", "PHONE_NUMBER", "BANK_ACCOUNT"]);
        let detections = engine.detect_in_field("card_number", &json!("4532015112830366"));

        assert!(!detections.is_empty());
        assert!(detections.iter().all(|d| d.pii_type == PiiType::CreditCard));
    }

    #[test]
    fn test_detect_in_message_flattens_nested_fields() {
        let engine = engine_with(&["EMAIL", "PHONE_NUMBER"]);
        let message = json!({
            "user": {
                "email": "a@b.com",
                "phone": "(555) 123-4567"
            },
            "order_total": 12.5
        });

        let field_detections = engine.detect_in_message(&message);
        assert!(field_detections.contains_key("user.email"));
        assert!(field_detections.contains_key("user.phone"));
        assert!(!field_detections.contains_key("order_total"));
    }

    #[test]
    fn test_has_schema_detectors_false_for_pattern_only() {
        let engine = engine_with(&["EMAIL"]);
        assert!(!engine.has_schema_detectors());
        assert!(engine
            .detect_in_schema(&["email".to_string()], &[])
            .is_empty());
    }
}
