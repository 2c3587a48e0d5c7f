//! Sampling plans
//!
//! Pure selection logic deciding which of a partition's in-memory messages
//! are analyzed. The Kafka adapter reads a window of messages per partition;
//! the plan picks a deterministic subset so repeated scans of the same window
//! see the same samples.

use crate::config::SamplingConfig;
use crate::domain::{ArgusError, Result};

/// How messages are selected from a partition window
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingPlan {
    /// Analyze every message (full analysis)
    All,
    /// Evenly-stepped selection targeting a fraction of the window
    Percentage {
        /// Fraction in (0, 1]
        percentage: f64,
        /// Upper bound on samples per partition
        max_per_partition: usize,
        /// Lower bound on samples per partition (when the window allows)
        min_per_partition: usize,
    },
    /// First N messages per partition
    Count { count: usize },
}

impl SamplingPlan {
    /// Build a plan from the sampling configuration
    ///
    /// Percentage values above 1.0 are interpreted as percent (5 means 5%).
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown strategy or a
    /// percentage outside (0, 1] after normalization.
    pub fn from_config(config: &SamplingConfig) -> Result<Self> {
        match config.strategy.as_str() {
            "all" => Ok(Self::All),
            "count" => Ok(Self::Count {
                count: config.sample_count,
            }),
            "percentage" => {
                let mut percentage = config.sample_percentage;
                if percentage > 1.0 {
                    percentage /= 100.0;
                }
                if percentage <= 0.0 || percentage > 1.0 {
                    return Err(ArgusError::Configuration(format!(
                        "sample_percentage must normalize into (0, 1], got {}",
                        config.sample_percentage
                    )));
                }
                Ok(Self::Percentage {
                    percentage,
                    max_per_partition: config.max_samples_per_partition,
                    min_per_partition: config.min_samples_per_partition,
                })
            }
            other => Err(ArgusError::Configuration(format!(
                "Unknown sampling strategy: {other}"
            ))),
        }
    }

    /// Select samples from one partition's message window
    ///
    /// Selection preserves window order and is deterministic for a fixed
    /// window.
    pub fn select<T: Clone>(&self, messages: &[T]) -> Vec<T> {
        match self {
            Self::All => messages.to_vec(),
            Self::Count { count } => messages.iter().take(*count).cloned().collect(),
            Self::Percentage {
                percentage,
                max_per_partition,
                min_per_partition,
            } => {
                if messages.is_empty() {
                    return Vec::new();
                }

                let target = ((messages.len() as f64) * percentage) as usize;
                let target = target
                    .min(*max_per_partition)
                    .max((*min_per_partition).min(messages.len()));
                if target == 0 {
                    return Vec::new();
                }

                let step = (messages.len() / target).max(1);
                messages
                    .iter()
                    .step_by(step)
                    .take(*max_per_partition)
                    .cloned()
                    .collect()
            }
        }
    }
}
