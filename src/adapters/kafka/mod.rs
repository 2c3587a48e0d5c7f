//! Kafka source abstraction
//!
//! This module defines the trait a Kafka adapter must implement for Argus to
//! sample topics. Connectivity, partition assignment, and consumer-group
//! mechanics live behind this seam; the scan pipeline only sees topic names
//! and sampled message payloads.

pub mod snapshot;

use crate::core::sampling::SamplingPlan;
use crate::domain::Result;
use async_trait::async_trait;

pub use snapshot::SnapshotSource;

/// One message captured from a topic partition
#[derive(Debug, Clone)]
pub struct SampledMessage {
    /// Topic the message was read from
    pub topic: String,
    /// Partition id
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Message key, if present
    pub key: Option<Vec<u8>>,
    /// Raw message payload
    pub payload: Vec<u8>,
}

impl SampledMessage {
    /// Create a sampled message with a payload and no key
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
        }
    }
}

/// Source of sampled Kafka messages
///
/// Implementations own connection handling and any per-partition read
/// windows; the provided [`SamplingPlan`] decides which messages of a window
/// are returned. Cancellation and timeouts are the implementation's
/// responsibility.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// List all topic names visible to the consumer
    async fn list_topics(&self) -> Result<Vec<String>>;

    /// Number of partitions for a topic
    async fn partition_count(&self, topic: &str) -> Result<usize>;

    /// Whether a topic currently holds no messages
    async fn is_topic_empty(&self, topic: &str) -> Result<bool>;

    /// Sample messages from a topic according to the plan
    ///
    /// `max_partitions` optionally caps how many partitions are scanned.
    async fn sample_topic(
        &self,
        topic: &str,
        plan: &SamplingPlan,
        max_partitions: Option<usize>,
    ) -> Result<Vec<SampledMessage>>;
}
