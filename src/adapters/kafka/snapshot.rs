//! Snapshot message source
//!
//! Reads topic snapshots from disk instead of a live cluster: a directory
//! with one `<topic>.jsonl` file per topic, one message payload per line.
//! Used for offline scans of captured data and as the reference
//! [`MessageSource`] implementation in tests.

use super::{MessageSource, SampledMessage};
use crate::core::sampling::SamplingPlan;
use crate::domain::{KafkaSourceError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Message source backed by JSONL snapshot files
pub struct SnapshotSource {
    directory: PathBuf,
}

impl SnapshotSource {
    /// Create a source over a snapshot directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(KafkaSourceError::ConnectionFailed(format!(
                "Snapshot directory not found: {}",
                directory.display()
            ))
            .into());
        }
        Ok(Self { directory })
    }

    fn topic_path(&self, topic: &str) -> PathBuf {
        self.directory.join(format!("{topic}.jsonl"))
    }

    fn read_lines(&self, topic: &str) -> Result<Vec<Vec<u8>>> {
        let path = self.topic_path(topic);
        if !path.exists() {
            return Err(KafkaSourceError::TopicNotFound(topic.to_string()).into());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| KafkaSourceError::ConsumeFailed(format!("{}: {e}", path.display())))?;

        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.as_bytes().to_vec())
            .collect())
    }
}

#[async_trait]
impl MessageSource for SnapshotSource {
    async fn list_topics(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            KafkaSourceError::MetadataFailed(format!("{}: {e}", self.directory.display()))
        })?;

        let mut topics = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| KafkaSourceError::MetadataFailed(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    topics.push(stem.to_string());
                }
            }
        }
        topics.sort_unstable();
        Ok(topics)
    }

    async fn partition_count(&self, topic: &str) -> Result<usize> {
        // A snapshot file is a single pre-merged partition
        if self.topic_path(topic).exists() {
            Ok(1)
        } else {
            Err(KafkaSourceError::TopicNotFound(topic.to_string()).into())
        }
    }

    async fn is_topic_empty(&self, topic: &str) -> Result<bool> {
        Ok(self.read_lines(topic)?.is_empty())
    }

    async fn sample_topic(
        &self,
        topic: &str,
        plan: &SamplingPlan,
        _max_partitions: Option<usize>,
    ) -> Result<Vec<SampledMessage>> {
        let lines = self.read_lines(topic)?;

        let messages: Vec<SampledMessage> = lines
            .into_iter()
            .enumerate()
            .map(|(offset, payload)| SampledMessage::new(topic, 0, offset as i64, payload))
            .collect();

        Ok(plan.select(&messages))
    }
}

/// Write a topic snapshot for tests and captures
pub fn write_snapshot(
    directory: &Path,
    topic: &str,
    payloads: &[serde_json::Value],
) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(format!("{topic}.jsonl"));

    let mut contents = String::new();
    for payload in payloads {
        contents.push_str(&payload.to_string());
        contents.push('\n');
    }
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(
            dir.path(),
            "orders",
            &[
                json!({"email": "a@b.com"}),
                json!({"email": "c@d.com"}),
                json!({"email": "e@f.com"}),
            ],
        )
        .unwrap();
        write_snapshot(dir.path(), "heartbeats", &[]).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_list_topics() {
        let dir = snapshot_dir();
        let source = SnapshotSource::new(dir.path()).unwrap();

        let topics = source.list_topics().await.unwrap();
        assert_eq!(topics, vec!["heartbeats".to_string(), "orders".to_string()]);
    }

    #[tokio::test]
    async fn test_is_topic_empty() {
        let dir = snapshot_dir();
        let source = SnapshotSource::new(dir.path()).unwrap();

        assert!(!source.is_topic_empty("orders").await.unwrap());
        assert!(source.is_topic_empty("heartbeats").await.unwrap());
    }

    #[tokio::test]
    async fn test_sample_topic_all() {
        let dir = snapshot_dir();
        let source = SnapshotSource::new(dir.path()).unwrap();

        let samples = source
            .sample_topic("orders", &SamplingPlan::All, None)
            .await
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].offset, 0);
        assert_eq!(samples[2].offset, 2);
    }

    #[tokio::test]
    async fn test_sample_topic_count_plan() {
        let dir = snapshot_dir();
        let source = SnapshotSource::new(dir.path()).unwrap();

        let samples = source
            .sample_topic("orders", &SamplingPlan::Count { count: 2 }, None)
            .await
            .unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_topic_errors() {
        let dir = snapshot_dir();
        let source = SnapshotSource::new(dir.path()).unwrap();

        assert!(source.is_topic_empty("missing").await.is_err());
        assert!(source.partition_count("missing").await.is_err());
    }

    #[test]
    fn test_missing_directory_errors() {
        assert!(SnapshotSource::new("/definitely/not/here").is_err());
    }
}
