//! Detection conflict resolution
//!
//! Detector backends score a single value in isolation, so one field value can
//! come back with several contradictory categories (a 16-digit card number
//! also matches the phone-number shape; a Unix timestamp matches both). This
//! module removes the candidates that field-name context, numeric validation,
//! or category priority mark as near-certain false positives.
//!
//! Every keep/discard decision is computed against the ORIGINAL candidate set
//! for the value, not against the survivors of earlier rules. Rules therefore
//! do not compound; re-ordering two detections in the input cannot change
//! which of them survive.

use crate::pii::types::{Detection, PiiType};
use regex::Regex;

/// Field-name substrings indicating a card/payment field
const CARD_CONTEXT: &[&str] = &["card", "credit", "cc", "payment"];

/// Field-name substrings indicating a date/age field
const DATE_CONTEXT: &[&str] = &["date", "birth", "dob", "age"];

/// Field-name substrings indicating an identifier field
const ID_CONTEXT: &[&str] = &[
    "id",
    "identifier",
    "vehicle_id",
    "customer_id",
    "user_id",
    "account_id",
    "order_id",
    "product_id",
    "transaction_id",
];

/// Field-name substrings indicating a time/timestamp field
const TIME_CONTEXT: &[&str] = &[
    "time",
    "timestamp",
    "created_at",
    "updated_at",
    "modified_at",
    "event_time",
    "logged_at",
    "occurred_at",
];

/// Field-name substrings indicating a vehicle registration plate field
const LICENSE_PLATE_CONTEXT: &[&str] = &[
    "license_plate",
    "licenseplate",
    "plate",
    "vehicle_plate",
    "registration_plate",
];

/// Category priority for same-value tie-breaking (higher wins).
/// Categories without an entry default to 0.
fn type_priority(pii_type: PiiType) -> u8 {
    match pii_type {
        PiiType::CreditCard => 100,
        PiiType::Ssn => 90,
        PiiType::PhoneNumber => 85,
        PiiType::Email => 85,
        PiiType::IpAddress => 80,
        PiiType::DriverLicense => 75,
        PiiType::Passport => 75,
        PiiType::Address => 70,
        PiiType::Name => 65,
        PiiType::DateOfBirth => 50,
        _ => 0,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Resolves conflicting PII detections for a single field value
///
/// Pure and deterministic: no I/O, no randomness. Safe to share across
/// threads; `resolve` only reads its arguments.
pub struct ConflictResolver {
    epoch_shape: Regex,
}

impl ConflictResolver {
    /// Create a resolver with its value-shape patterns compiled
    pub fn new() -> Self {
        // Unix epoch seconds (10 digits) or milliseconds (13 digits),
        // optionally with a fractional part
        let epoch_shape =
            Regex::new(r"^\d{10,13}(\.\d+)?$").expect("valid epoch-shape pattern");
        Self { epoch_shape }
    }

    /// Remove false-positive and contradictory detections for one field value
    ///
    /// `detections` must already be deduplicated by (category, value). The
    /// returned survivors keep their original relative order. Malformed or
    /// unexpected input degrades to keeping candidates, never to an error.
    ///
    /// Rules, in order (each evaluated against the original candidate set):
    /// 1. Timestamp guard: PHONE_NUMBER on a time-named field with an
    ///    epoch-shaped value
    /// 2. License-plate guard: DRIVER_LICENSE / NAME / ADDRESS on a
    ///    plate-named field
    /// 3. Numeric-ID guard: DATE_OF_BIRTH on an id-named field with an
    ///    all-digit value
    /// 4. Luhn precedence: a validated CREDIT_CARD candidate suppresses
    ///    DATE_OF_BIRTH / PHONE_NUMBER for the same raw value
    /// 5. Field-name context: card-named fields drop DATE_OF_BIRTH and
    ///    conflicted PHONE_NUMBER; date-named fields drop low-confidence
    ///    CREDIT_CARD
    /// 6. Priority tie-break for identical values across categories
    pub fn resolve(
        &self,
        detections: &[Detection],
        field_name: &str,
        value: &str,
    ) -> Vec<Detection> {
        let field_lower = field_name.to_lowercase();
        let has_card_context = contains_any(&field_lower, CARD_CONTEXT);
        let has_date_context = contains_any(&field_lower, DATE_CONTEXT);
        let has_id_context = contains_any(&field_lower, ID_CONTEXT);
        let has_time_context = contains_any(&field_lower, TIME_CONTEXT);
        let has_plate_context = contains_any(&field_lower, LICENSE_PLATE_CONTEXT);

        // A credit-card candidate from the validating pattern detector means
        // the value passed the Luhn checksum
        let luhn_validated_card = detections
            .iter()
            .any(|d| d.pii_type == PiiType::CreditCard && !d.matched_pattern.is_empty());

        let mut resolved = Vec::with_capacity(detections.len());

        for det in detections {
            // Rule 1: epoch timestamps match the phone-number shape
            if det.pii_type == PiiType::PhoneNumber
                && has_time_context
                && self.epoch_shape.is_match(value.trim())
            {
                tracing::debug!(
                    field = field_name,
                    value,
                    "Dropping PHONE_NUMBER detection (Unix timestamp shape)"
                );
                continue;
            }

            // Rule 2: a registration plate is a vehicle identifier, not a
            // driver license, name, or address
            if has_plate_context
                && matches!(
                    det.pii_type,
                    PiiType::DriverLicense | PiiType::Name | PiiType::Address
                )
            {
                tracing::debug!(
                    field = field_name,
                    value,
                    pii_type = %det.pii_type,
                    "Dropping detection (license plate field)"
                );
                continue;
            }

            // Rule 3: numeric identifiers are not dates of birth
            if det.pii_type == PiiType::DateOfBirth
                && has_id_context
                && (is_all_digits(value.trim()) || is_all_digits(det.value.trim()))
            {
                tracing::debug!(
                    field = field_name,
                    value,
                    "Dropping DATE_OF_BIRTH detection (numeric identifier)"
                );
                continue;
            }

            let mut keep = true;

            // Same-value CREDIT_CARD candidate, if any
            let card_for_value = detections
                .iter()
                .find(|d| d.pii_type == PiiType::CreditCard && d.value == det.value);

            // Rule 4: a Luhn-validated card wins over date/phone readings of
            // the identical digits
            if card_for_value.is_some() && luhn_validated_card {
                if det.pii_type == PiiType::DateOfBirth {
                    tracing::debug!(
                        value = %det.value,
                        "Dropping DATE_OF_BIRTH detection (Luhn-validated CREDIT_CARD)"
                    );
                    keep = false;
                } else if det.pii_type == PiiType::PhoneNumber {
                    tracing::debug!(
                        value = %det.value,
                        "Dropping PHONE_NUMBER detection (Luhn-validated CREDIT_CARD)"
                    );
                    keep = false;
                }
            }

            // Rule 5: field-name context
            if has_card_context {
                if det.pii_type == PiiType::DateOfBirth {
                    tracing::debug!(
                        field = field_name,
                        "Dropping DATE_OF_BIRTH detection (card-context field)"
                    );
                    keep = false;
                } else if det.pii_type == PiiType::PhoneNumber && card_for_value.is_some() {
                    tracing::debug!(
                        field = field_name,
                        "Dropping PHONE_NUMBER detection (card-context field with CREDIT_CARD)"
                    );
                    keep = false;
                }
            } else if has_date_context
                && det.pii_type == PiiType::CreditCard
                && det.confidence < 0.8
            {
                tracing::debug!(
                    field = field_name,
                    confidence = det.confidence,
                    "Dropping CREDIT_CARD detection (date-context field, low confidence)"
                );
                keep = false;
            }

            // Rule 6: same value read as multiple categories resolves to the
            // highest-priority category, unless this candidate is strictly
            // more confident
            if keep {
                let conflicting: Vec<&Detection> = detections
                    .iter()
                    .filter(|d| d.value == det.value && d.pii_type != det.pii_type)
                    .collect();

                if !conflicting.is_empty() {
                    let det_priority = type_priority(det.pii_type);
                    let max_priority = conflicting
                        .iter()
                        .map(|d| type_priority(d.pii_type))
                        .max()
                        .unwrap_or(0);

                    if max_priority > det_priority {
                        let winner = conflicting
                            .iter()
                            .find(|d| type_priority(d.pii_type) == max_priority);
                        if let Some(winner) = winner {
                            if winner.confidence >= det.confidence {
                                tracing::debug!(
                                    value = %det.value,
                                    loser = %det.pii_type,
                                    winner = %winner.pii_type,
                                    "Dropping detection (higher-priority category for same value)"
                                );
                                keep = false;
                            }
                        }
                    }
                }
            }

            if keep {
                resolved.push(det.clone());
            }
        }

        resolved
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(pii_type: PiiType, confidence: f64, value: &str) -> Detection {
        Detection::new(pii_type, confidence, value, "pattern")
    }

    #[test]
    fn test_timestamp_guard_drops_phone_on_time_field() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::PhoneNumber, 0.8, "1762340928")];

        let resolved = resolver.resolve(&detections, "event_time", "1762340928");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_timestamp_guard_allows_fractional_epoch() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::PhoneNumber, 0.8, "1762340928.947")];

        let resolved = resolver.resolve(&detections, "created_at", "1762340928.947");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_timestamp_guard_keeps_real_phone_numbers() {
        let resolver = ConflictResolver::new();
        // Formatted phone numbers are not epoch-shaped
        let detections = vec![det(PiiType::PhoneNumber, 0.95, "(555) 123-4567")];

        let resolved = resolver.resolve(&detections, "contact_time_preference", "(555) 123-4567");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_timestamp_guard_requires_time_context() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::PhoneNumber, 0.8, "1762340928")];

        let resolved = resolver.resolve(&detections, "phone", "1762340928");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_plate_guard_drops_license_name_and_address() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::DriverLicense, 0.8, "ABC1234"),
            det(PiiType::Name, 0.6, "ABC1234"),
            det(PiiType::Address, 0.6, "ABC1234"),
        ];

        let resolved = resolver.resolve(&detections, "license_plate", "ABC1234");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_plate_guard_keeps_other_categories() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::Ssn, 0.9, "123-45-6789")];

        let resolved = resolver.resolve(&detections, "plate", "123-45-6789");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_numeric_id_guard_drops_date_of_birth() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::DateOfBirth, 0.7, "6538")];

        let resolved = resolver.resolve(&detections, "vehicle_id", "6538");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_numeric_id_guard_keeps_real_dates() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::DateOfBirth, 0.9, "1990-04-12")];

        let resolved = resolver.resolve(&detections, "customer_id", "1990-04-12");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_luhn_precedence_drops_date_and_phone_for_same_value() {
        let resolver = ConflictResolver::new();
        let card = "4532015112830366";
        let detections = vec![
            det(PiiType::CreditCard, 0.95, card),
            det(PiiType::DateOfBirth, 0.5, card),
            det(PiiType::PhoneNumber, 0.7, card),
        ];

        let resolved = resolver.resolve(&detections, "payload", card);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pii_type, PiiType::CreditCard);
    }

    #[test]
    fn test_luhn_precedence_only_applies_to_matching_values() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::CreditCard, 0.95, "4532015112830366"),
            det(PiiType::DateOfBirth, 0.9, "1990-04-12"),
        ];

        let resolved = resolver.resolve(&detections, "payload", "mixed");
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_card_context_drops_date_of_birth_outright() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::DateOfBirth, 0.9, "4111111111111111")];

        let resolved = resolver.resolve(&detections, "card_number", "4111111111111111");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_card_context_drops_phone_only_with_card_candidate() {
        let resolver = ConflictResolver::new();

        // Phone alone on a card field survives
        let phone_only = vec![det(PiiType::PhoneNumber, 0.8, "4111111111111111")];
        let resolved = resolver.resolve(&phone_only, "cc_number", "4111111111111111");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pii_type, PiiType::PhoneNumber);

        // Phone next to a card detection does not
        let with_card = vec![
            det(PiiType::PhoneNumber, 0.99, "4111111111111111"),
            det(PiiType::CreditCard, 0.95, "4111111111111111"),
        ];
        let resolved = resolver.resolve(&with_card, "cc_number", "4111111111111111");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pii_type, PiiType::CreditCard);
    }

    #[test]
    fn test_date_context_drops_low_confidence_card() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::CreditCard, 0.5, "4111111111111112")];

        let resolved = resolver.resolve(&detections, "birth_date", "4111111111111112");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_date_context_keeps_high_confidence_card() {
        let resolver = ConflictResolver::new();
        let detections = vec![det(PiiType::CreditCard, 0.95, "4532015112830366")];

        let resolved = resolver.resolve(&detections, "birth_date", "4532015112830366");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_priority_tie_break_prefers_higher_priority() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::Ssn, 0.9, "123456789"),
            det(PiiType::BankAccount, 0.7, "123456789"),
        ];

        let resolved = resolver.resolve(&detections, "data", "123456789");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pii_type, PiiType::Ssn);
    }

    #[test]
    fn test_priority_tie_break_spares_more_confident_lower_priority() {
        let resolver = ConflictResolver::new();
        // Lower-priority NAME is strictly more confident than ADDRESS, so the
        // confidence condition protects it; ADDRESS still loses nothing since
        // it holds the higher priority
        let detections = vec![
            det(PiiType::Address, 0.6, "10 Main Street"),
            det(PiiType::Name, 0.9, "10 Main Street"),
        ];

        let resolved = resolver.resolve(&detections, "line", "10 Main Street");
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_priority_tie_break_equal_priorities_keep_both() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::PhoneNumber, 0.8, "5551234567"),
            det(PiiType::Email, 0.8, "5551234567"),
        ];

        let resolved = resolver.resolve(&detections, "contact", "5551234567");
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_decisions_do_not_compound() {
        let resolver = ConflictResolver::new();
        // The CREDIT_CARD candidate is dropped by the date-context rule, but
        // rule decisions are computed against the original set, so it still
        // outranks DATE_OF_BIRTH in the priority tie-break and suppresses it
        let card = "4111111111111112";
        let detections = vec![
            det(PiiType::CreditCard, 0.5, card),
            det(PiiType::DateOfBirth, 0.5, card),
        ];

        let resolved = resolver.resolve(&detections, "birth_date", card);
        assert!(
            resolved.is_empty(),
            "both candidates should be dropped: {resolved:?}"
        );
    }

    #[test]
    fn test_survivors_preserve_original_order() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::Email, 0.95, "a@b.com"),
            det(PiiType::Username, 0.85, "a.b"),
            det(PiiType::IpAddress, 0.9, "10.0.0.1"),
        ];

        let resolved = resolver.resolve(&detections, "misc", "payload");
        let types: Vec<PiiType> = resolved.iter().map(|d| d.pii_type).collect();
        assert_eq!(
            types,
            vec![PiiType::Email, PiiType::Username, PiiType::IpAddress]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let resolver = ConflictResolver::new();
        assert!(resolver.resolve(&[], "field", "value").is_empty());
    }

    #[test]
    fn test_deterministic_for_fixed_input() {
        let resolver = ConflictResolver::new();
        let detections = vec![
            det(PiiType::CreditCard, 0.95, "4532015112830366"),
            det(PiiType::DateOfBirth, 0.5, "4532015112830366"),
            det(PiiType::PhoneNumber, 0.7, "4532015112830366"),
        ];

        let first = resolver.resolve(&detections, "card_number", "4532015112830366");
        let second = resolver.resolve(&detections, "card_number", "4532015112830366");
        assert_eq!(first, second);
    }
}
