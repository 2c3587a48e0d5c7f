//! Confluent Schema Registry adapter
//!
//! REST client plus the data models shared with the tagging pipeline.

pub mod client;
pub mod models;

pub use client::{RestRegistryClient, SchemaRegistry};
pub use models::{SchemaInfo, SubjectMetadata};
