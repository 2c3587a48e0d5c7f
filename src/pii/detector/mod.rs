//! Detector backend interfaces and registry
//!
//! Detector backends are pluggable: each scores a single field value and
//! returns raw [`Detection`]s. Backends that can additionally score a whole
//! schema in one batched call expose that through the narrower
//! [`SchemaDetector`] capability, surfaced via
//! [`ValueDetector::as_schema_detector`] rather than runtime type probing.

pub mod pattern;

use crate::config::DetectionConfig;
use crate::domain::{ArgusError, Result};
use crate::pii::types::{Detection, PiiType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A per-value PII detector backend
pub trait ValueDetector: Send + Sync {
    /// Stable provider name (e.g. "pattern")
    fn name(&self) -> &'static str;

    /// Detect PII in a single stringified field value
    ///
    /// # Errors
    ///
    /// Backend failures are reported as errors; the aggregation engine treats
    /// them as an empty contribution rather than propagating them.
    fn detect(&self, value: &str, field_name: Option<&str>) -> Result<Vec<Detection>>;

    /// Whether the backend is usable (dependencies reachable, credentials
    /// present). Unavailable backends are skipped at engine construction.
    fn is_available(&self) -> bool;

    /// Categories this backend can produce
    fn supported_types(&self) -> &[PiiType];

    /// Schema-wide batch capability, if the backend has one
    fn as_schema_detector(&self) -> Option<&dyn SchemaDetector> {
        None
    }
}

/// A detector backend that scores many field names/samples in one batched call
pub trait SchemaDetector: Send + Sync {
    /// Detect PII across a whole schema
    ///
    /// Returns detections grouped by field name.
    ///
    /// # Errors
    ///
    /// Backend failures are reported as errors; callers log and continue.
    fn detect_in_schema(
        &self,
        field_names: &[String],
        samples: &[Value],
    ) -> Result<HashMap<String, Vec<Detection>>>;
}

/// Constructor signature for detector providers
pub type DetectorCtor = fn(&DetectionConfig) -> Result<Arc<dyn ValueDetector>>;

/// Registry of detector providers
///
/// Constructed once at startup and passed by reference into the detection
/// engine. Tests build isolated registries instead of relying on ambient
/// global state.
pub struct DetectorRegistry {
    providers: HashMap<String, DetectorCtor>,
}

impl DetectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry with the built-in providers registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("pattern", |config| {
            Ok(Arc::new(pattern::PatternDetector::new(config)?))
        });
        registry
    }

    /// Register a provider constructor under a name
    ///
    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, name: impl Into<String>, ctor: DetectorCtor) {
        let name = name.into().to_lowercase();
        tracing::debug!(provider = %name, "Registered PII detector provider");
        self.providers.insert(name, ctor);
    }

    /// Create a detector instance for a provider name
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the registered providers when the
    /// name is unknown, or the constructor's error when it fails.
    pub fn create(
        &self,
        provider_name: &str,
        config: &DetectionConfig,
    ) -> Result<Arc<dyn ValueDetector>> {
        let provider_name = provider_name.to_lowercase();

        let ctor = self.providers.get(&provider_name).ok_or_else(|| {
            let mut available: Vec<&str> =
                self.providers.keys().map(String::as_str).collect();
            available.sort_unstable();
            ArgusError::Configuration(format!(
                "Unknown PII detector provider: {provider_name}. Available providers: {}",
                available.join(", ")
            ))
        })?;

        let detector = ctor(config)?;
        tracing::info!(provider = %provider_name, "Created PII detector");
        Ok(detector)
    }

    /// Names of the registered providers, sorted
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
