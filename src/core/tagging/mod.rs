//! Schema tagging
//!
//! Applies field classifications back to the Schema Registry as Avro `doc`
//! annotations and subject-level metadata.

pub mod tagger;

pub use tagger::{SchemaTagger, TaggingOutcome};
