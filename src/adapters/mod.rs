//! External integrations
//!
//! Adapters isolate the rest of the application from external systems.
//! Kafka stays behind the [`kafka::MessageSource`] trait; the Schema
//! Registry is reached through the [`registry::SchemaRegistry`] trait with a
//! REST implementation.

pub mod kafka;
pub mod registry;
