//! Field classification
//!
//! Reduces many per-sample detection lists for one field path into a single
//! threshold-gated verdict, or decides the field does not qualify.

use crate::config::DetectionConfig;
use crate::pii::types::{Detection, PiiType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Aggregated, threshold-gated verdict for one field path
///
/// Built once per field path per topic run and read-only afterward.
/// `pii_types` is non-empty by construction: the classifier returns `None`
/// instead of producing an empty-category classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldClassification {
    /// Dot/bracket-qualified field path
    pub field_path: String,
    /// Categories that cleared the confidence threshold
    pub pii_types: BTreeSet<PiiType>,
    /// Governance tags, deduplicated, "PII" first
    pub tags: Vec<String>,
    /// Mean of the surviving categories' mean confidences
    pub confidence: f64,
    /// Number of distinct samples with at least one detection
    pub detection_count: usize,
    /// Number of samples analyzed for the topic
    pub total_samples: usize,
    /// detection_count / total_samples, clamped to [0, 1]
    pub detection_rate: f64,
    /// Up to 10 distinct detected values, in first-seen order
    pub sample_values: Vec<String>,
}

/// Classifies fields from aggregated per-sample detection results
///
/// Pure and synchronous; safe to call concurrently for different field paths.
pub struct FieldClassifier {
    confidence_threshold: f64,
    min_detection_rate: f64,
    require_multiple_detections: bool,
}

impl FieldClassifier {
    /// Create a classifier from the detection configuration
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            min_detection_rate: config.min_detection_rate,
            require_multiple_detections: config.require_multiple_detections,
        }
    }

    /// Classify one field from its per-sample detection lists
    ///
    /// `detections_per_sample` holds one inner list per sample that produced
    /// detections for this field. Returns `None` when the field does not
    /// clear the gates:
    ///
    /// - no detections at all
    /// - fewer than two detecting samples (when `require_multiple_detections`)
    /// - detection rate below `min_detection_rate`
    /// - no category with mean confidence at or above `confidence_threshold`
    ///
    /// The detection rate divides distinct detecting samples by
    /// `total_samples` and clamps at 1.0, since multiple detectors may emit
    /// separate entries for the same sample. `total_samples == 0` yields a
    /// rate of 0.0 rather than dividing by zero.
    pub fn classify_field(
        &self,
        field_path: &str,
        detections_per_sample: &[Vec<Detection>],
        total_samples: usize,
    ) -> Option<FieldClassification> {
        if detections_per_sample.is_empty() {
            return None;
        }

        let mut all_detections: Vec<&Detection> = Vec::new();
        let mut samples_with_detections = 0usize;
        let mut sample_values: Vec<String> = Vec::new();

        for sample_detections in detections_per_sample {
            if !sample_detections.is_empty() {
                samples_with_detections += 1;
            }
            for detection in sample_detections {
                all_detections.push(detection);
                if !detection.value.is_empty()
                    && sample_values.len() < 10
                    && !sample_values.contains(&detection.value)
                {
                    sample_values.push(detection.value.clone());
                }
            }
        }

        if all_detections.is_empty() {
            return None;
        }

        let detection_count = samples_with_detections;
        let detection_rate = if total_samples > 0 {
            (samples_with_detections as f64 / total_samples as f64).min(1.0)
        } else {
            0.0
        };

        if self.require_multiple_detections && detection_count < 2 {
            return None;
        }

        if detection_rate < self.min_detection_rate {
            return None;
        }

        // Mean confidence per category, over all detections of that category
        // regardless of which sample produced them
        let mut confidences_by_type: BTreeMap<PiiType, Vec<f64>> = BTreeMap::new();
        for detection in &all_detections {
            confidences_by_type
                .entry(detection.pii_type)
                .or_default()
                .push(detection.confidence);
        }

        let mut valid_types = BTreeSet::new();
        let mut confidence_sum = 0.0;

        for (pii_type, confidences) in &confidences_by_type {
            let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
            if mean >= self.confidence_threshold {
                valid_types.insert(*pii_type);
                confidence_sum += mean;
            }
        }

        if valid_types.is_empty() {
            return None;
        }
        let confidence = confidence_sum / valid_types.len() as f64;

        // "PII" first, then each surviving category's tags, deduplicated
        // preserving first-seen order
        let mut tags: Vec<String> = vec!["PII".to_string()];
        for pii_type in &valid_types {
            for tag in pii_type.tags() {
                if !tags.iter().any(|t| t == tag) {
                    tags.push((*tag).to_string());
                }
            }
        }

        Some(FieldClassification {
            field_path: field_path.to_string(),
            pii_types: valid_types,
            tags,
            confidence,
            detection_count,
            total_samples,
            detection_rate,
            sample_values,
        })
    }

    /// Classify every field in a detection map
    ///
    /// Pure fan-out over [`Self::classify_field`]; fields that do not qualify
    /// are absent from the output.
    pub fn classify_fields(
        &self,
        field_detections: &HashMap<String, Vec<Vec<Detection>>>,
        total_samples: usize,
    ) -> HashMap<String, FieldClassification> {
        let mut classifications = HashMap::new();

        for (field_path, detections_per_sample) in field_detections {
            if let Some(classification) =
                self.classify_field(field_path, detections_per_sample, total_samples)
            {
                classifications.insert(field_path.clone(), classification);
            }
        }

        classifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> FieldClassifier {
        FieldClassifier::new(&DetectionConfig::default())
    }

    fn classifier_with(
        confidence_threshold: f64,
        min_detection_rate: f64,
        require_multiple_detections: bool,
    ) -> FieldClassifier {
        FieldClassifier::new(&DetectionConfig {
            confidence_threshold,
            min_detection_rate,
            require_multiple_detections,
            ..Default::default()
        })
    }

    fn email(confidence: f64, value: &str) -> Detection {
        Detection::new(PiiType::Email, confidence, value, "email")
    }

    fn email_samples() -> Vec<Vec<Detection>> {
        vec![
            vec![email(0.95, "a@b.com")],
            vec![email(0.92, "c@d.com")],
            vec![email(0.9, "e@f.com")],
            vec![email(0.88, "g@h.com")],
        ]
    }

    #[test]
    fn test_classify_qualifying_email_field() {
        let classification = classifier()
            .classify_field("user.email", &email_samples(), 10)
            .unwrap();

        assert_eq!(classification.field_path, "user.email");
        assert_eq!(classification.detection_count, 4);
        assert_eq!(classification.total_samples, 10);
        assert!((classification.detection_rate - 0.4).abs() < 1e-9);
        assert_eq!(
            classification.pii_types,
            BTreeSet::from([PiiType::Email])
        );
        assert!(classification.tags.contains(&"PII".to_string()));
        assert!(classification.tags.contains(&"PII-Email".to_string()));
        assert_eq!(classification.sample_values.len(), 4);
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(classifier().classify_field("field", &[], 10).is_none());
        assert!(classifier()
            .classify_field("field", &[vec![], vec![]], 10)
            .is_none());
    }

    #[test]
    fn test_single_sample_rejected_when_multiple_required() {
        let samples = vec![vec![email(0.99, "a@b.com")]];
        assert!(classifier().classify_field("user.email", &samples, 10).is_none());

        // Same input passes once the gate is relaxed (and the rate allows)
        let relaxed = classifier_with(0.7, 0.1, false);
        assert!(relaxed.classify_field("user.email", &samples, 10).is_some());
    }

    #[test]
    fn test_low_detection_rate_rejected() {
        // 2 of 100 samples is below the default 0.3 rate
        let samples = vec![
            vec![email(0.95, "a@b.com")],
            vec![email(0.95, "c@d.com")],
        ];
        assert!(classifier().classify_field("user.email", &samples, 100).is_none());
    }

    #[test]
    fn test_low_confidence_category_rejected() {
        let samples = vec![
            vec![email(0.4, "a@b.com")],
            vec![email(0.5, "c@d.com")],
        ];
        assert!(classifier().classify_field("user.email", &samples, 4).is_none());
    }

    #[test]
    fn test_detection_rate_clamped_at_one() {
        // More detecting samples than total_samples claims; the rate clamps
        let samples = vec![
            vec![email(0.9, "a@b.com"), email(0.9, "a@b.com")],
            vec![email(0.9, "c@d.com")],
            vec![email(0.9, "e@f.com")],
        ];
        let classification = classifier()
            .classify_field("user.email", &samples, 2)
            .unwrap();
        assert_eq!(classification.detection_rate, 1.0);
    }

    #[test]
    fn test_zero_total_samples_yields_zero_rate() {
        let samples = vec![
            vec![email(0.9, "a@b.com")],
            vec![email(0.9, "c@d.com")],
        ];
        // rate 0.0 fails the default gate
        assert!(classifier().classify_field("user.email", &samples, 0).is_none());

        // and passes only when the rate gate is 0
        let relaxed = classifier_with(0.7, 0.0, true);
        let classification = relaxed.classify_field("user.email", &samples, 0).unwrap();
        assert_eq!(classification.detection_rate, 0.0);
    }

    #[test]
    fn test_detection_count_is_distinct_samples_not_raw_detections() {
        // One sample with three detections still counts once
        let samples = vec![vec![
            email(0.9, "a@b.com"),
            email(0.9, "b@c.com"),
            email(0.9, "c@d.com"),
        ]];
        assert!(classifier().classify_field("user.email", &samples, 3).is_none());
    }

    #[test]
    fn test_mixed_categories_gate_independently() {
        let samples = vec![
            vec![
                email(0.9, "a@b.com"),
                Detection::new(PiiType::Name, 0.4, "John Smith", "name"),
            ],
            vec![
                email(0.92, "c@d.com"),
                Detection::new(PiiType::Name, 0.5, "Jane Doe", "name"),
            ],
        ];

        let classification = classifier()
            .classify_field("user.contact", &samples, 4)
            .unwrap();

        // EMAIL passes (mean 0.91), NAME fails (mean 0.45)
        assert_eq!(
            classification.pii_types,
            BTreeSet::from([PiiType::Email])
        );
        assert!((classification.confidence - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_overall_confidence_is_mean_of_category_means() {
        let samples = vec![
            vec![
                email(0.9, "a@b.com"),
                Detection::new(PiiType::PhoneNumber, 0.8, "5551234567", "phone"),
            ],
            vec![
                email(0.9, "c@d.com"),
                Detection::new(PiiType::PhoneNumber, 0.8, "5559876543", "phone"),
            ],
        ];

        let classification = classifier()
            .classify_field("user.contact", &samples, 2)
            .unwrap();

        assert_eq!(
            classification.pii_types,
            BTreeSet::from([PiiType::Email, PiiType::PhoneNumber])
        );
        assert!((classification.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_tags_deduplicated_with_pii_first() {
        let samples = vec![
            vec![
                email(0.9, "a@b.com"),
                Detection::new(PiiType::Password, 0.95, "hunter2pass", "password"),
            ],
            vec![
                email(0.9, "c@d.com"),
                Detection::new(PiiType::Password, 0.95, "hunter3pass", "password"),
            ],
        ];

        let classification = classifier()
            .classify_field("user.login", &samples, 2)
            .unwrap();

        assert_eq!(classification.tags[0], "PII");
        // The shared "PII" tag appears exactly once
        assert_eq!(
            classification.tags.iter().filter(|t| *t == "PII").count(),
            1
        );
        assert!(classification.tags.contains(&"PII-Email".to_string()));
        assert!(classification.tags.contains(&"PII-Password".to_string()));
        assert!(classification.tags.contains(&"SECRET".to_string()));
    }

    #[test]
    fn test_sample_values_limited_and_distinct() {
        let samples: Vec<Vec<Detection>> = (0..15)
            .map(|i| vec![email(0.9, &format!("user{i}@example.com"))])
            .collect();

        let classification = classifier()
            .classify_field("user.email", &samples, 15)
            .unwrap();
        assert_eq!(classification.sample_values.len(), 10);
        assert_eq!(classification.sample_values[0], "user0@example.com");

        // Duplicate values collapse
        let dup_samples = vec![
            vec![email(0.9, "same@example.com")],
            vec![email(0.9, "same@example.com")],
        ];
        let classification = classifier()
            .classify_field("user.email", &dup_samples, 2)
            .unwrap();
        assert_eq!(classification.sample_values, vec!["same@example.com"]);
    }

    #[test]
    fn test_raising_thresholds_never_adds_results() {
        let samples = email_samples();

        let lenient = classifier_with(0.7, 0.3, true);
        let strict_confidence = classifier_with(0.95, 0.3, true);
        let strict_rate = classifier_with(0.7, 0.5, true);

        assert!(lenient.classify_field("user.email", &samples, 10).is_some());
        assert!(strict_confidence
            .classify_field("user.email", &samples, 10)
            .is_none());
        assert!(strict_rate.classify_field("user.email", &samples, 10).is_none());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let samples = email_samples();
        let first = classifier().classify_field("user.email", &samples, 10);
        let second = classifier().classify_field("user.email", &samples, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_fields_keeps_only_qualifying_entries() {
        let mut field_detections: HashMap<String, Vec<Vec<Detection>>> = HashMap::new();
        field_detections.insert("user.email".to_string(), email_samples());
        field_detections.insert("order_note".to_string(), vec![vec![], vec![]]);

        let classifications = classifier().classify_fields(&field_detections, 10);
        assert_eq!(classifications.len(), 1);
        assert!(classifications.contains_key("user.email"));
    }
}
