//! PII detection and classification
//!
//! The compute kernel of Argus: detector backends produce raw [`Detection`]s
//! per field value, the [`DetectionEngine`] aggregates and conflict-resolves
//! them, and the [`FieldClassifier`] reduces per-sample results into one
//! [`FieldClassification`] verdict per field path.
//!
//! Everything in this module is pure and synchronous: no I/O, no shared
//! mutable state. Invocations for different field paths or topics can run
//! concurrently without synchronization.

pub mod classifier;
pub mod detector;
pub mod engine;
pub mod resolver;
pub mod types;

pub use classifier::{FieldClassification, FieldClassifier};
pub use detector::{DetectorRegistry, SchemaDetector, ValueDetector};
pub use engine::DetectionEngine;
pub use resolver::ConflictResolver;
pub use types::{Detection, PiiType, RiskLevel};
