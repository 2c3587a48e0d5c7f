//! Schema Registry data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A schema fetched from the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Subject the schema is registered under
    pub subject: String,
    /// Globally unique schema id
    pub schema_id: u32,
    /// Version of the schema under this subject
    pub version: u32,
    /// Schema type (AVRO, JSON, PROTOBUF)
    pub schema_type: String,
    /// The schema document as a JSON-encoded string
    pub schema: String,
}

/// Wire shape of the `GET /subjects/{subject}/versions/latest` response
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaVersionResponse {
    pub subject: String,
    pub id: u32,
    pub version: u32,
    /// Absent for AVRO on older registries
    #[serde(rename = "schemaType")]
    pub schema_type: Option<String>,
    pub schema: String,
}

impl From<SchemaVersionResponse> for SchemaInfo {
    fn from(response: SchemaVersionResponse) -> Self {
        Self {
            subject: response.subject,
            schema_id: response.id,
            version: response.version,
            schema_type: response.schema_type.unwrap_or_else(|| "AVRO".to_string()),
            schema: response.schema,
        }
    }
}

/// Request body for registering a schema version
#[derive(Debug, Serialize)]
pub(crate) struct RegisterSchemaRequest {
    pub schema: String,
    #[serde(rename = "schemaType")]
    pub schema_type: String,
}

/// Response body of a schema registration
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterSchemaResponse {
    pub id: u32,
}

/// Wire shape of the subject compatibility config
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CompatibilityConfig {
    #[serde(rename = "compatibilityLevel", skip_serializing_if = "Option::is_none")]
    pub compatibility_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
}

/// Subject-level metadata written after tagging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    /// Sorted union of all tags applied to the subject's fields
    pub tags: Vec<String>,
    /// Free-form properties (tagged field list, confidence, timestamp)
    pub properties: BTreeMap<String, String>,
}
