//! Schema inference for schemaless topics
//!
//! Topics without a registered schema still need a field inventory for
//! reporting. This module derives per-field type and nullability information
//! from the sampled JSON messages.

use crate::core::transform::flatten_message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Inferred metadata for one field path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredField {
    /// JSON type name (boolean, integer, number, string, array, object,
    /// unknown); mixed types fall back to string
    pub field_type: String,
    /// Whether any sample held null (or omitted the field entirely is not
    /// tracked; only explicit nulls count)
    pub nullable: bool,
    /// Number of non-null observations
    pub sample_count: usize,
    /// Total observations across samples
    pub total_count: usize,
}

/// Infers schema structure from JSON samples
pub struct SchemaInferrer {
    min_samples: usize,
}

impl SchemaInferrer {
    /// Create an inferrer that warns below `min_samples` observations
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    /// Infer a field inventory from parsed samples
    pub fn infer(&self, samples: &[Value]) -> BTreeMap<String, InferredField> {
        if samples.len() < self.min_samples {
            tracing::warn!(
                available = samples.len(),
                minimum = self.min_samples,
                "Fewer samples than recommended for schema inference"
            );
        }

        let mut values_by_field: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for sample in samples {
            for (field_path, value) in flatten_message(sample) {
                values_by_field.entry(field_path).or_default().push(value);
            }
        }

        values_by_field
            .into_iter()
            .map(|(field_path, values)| {
                let inferred = analyze_field(&values);
                (field_path, inferred)
            })
            .collect()
    }
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new(10)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

fn analyze_field(values: &[Value]) -> InferredField {
    let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    let nullable = non_null.len() < values.len();

    if non_null.is_empty() {
        return InferredField {
            field_type: "unknown".to_string(),
            nullable: true,
            sample_count: 0,
            total_count: values.len(),
        };
    }

    let mut types: Vec<&'static str> = Vec::new();
    for value in &non_null {
        let type_name = json_type_name(value);
        if !types.contains(&type_name) {
            types.push(type_name);
        }
    }

    // Mixed types default to string
    let field_type = if types.len() == 1 {
        types[0]
    } else if types.contains(&"string") {
        "string"
    } else {
        types[0]
    };

    InferredField {
        field_type: field_type.to_string(),
        nullable,
        sample_count: non_null.len(),
        total_count: values.len(),
    }
}
