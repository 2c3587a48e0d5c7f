//! Confluent Schema Registry REST client

use super::models::{
    CompatibilityConfig, RegisterSchemaRequest, RegisterSchemaResponse, SchemaInfo,
    SchemaVersionResponse, SubjectMetadata,
};
use crate::config::RegistryConfig;
use crate::domain::{RegistryError, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;

/// Schema Registry operations used by the scan and tagging pipeline
///
/// Implemented by [`RestRegistryClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// List all registered subjects
    async fn get_subjects(&self) -> Result<Vec<String>>;

    /// Fetch the latest schema version for a subject
    ///
    /// Returns `Ok(None)` when the subject is not registered.
    async fn get_schema(&self, subject: &str) -> Result<Option<SchemaInfo>>;

    /// Register a new schema version, returning the schema id
    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: &str,
    ) -> Result<u32>;

    /// Get the subject-level compatibility setting, if one is set
    async fn get_compatibility(&self, subject: &str) -> Result<Option<String>>;

    /// Set the subject-level compatibility, returning whether it was applied
    async fn set_compatibility(&self, subject: &str, level: &str) -> Result<bool>;

    /// Remove the subject-level compatibility override
    async fn delete_subject_config(&self, subject: &str) -> Result<()>;

    /// Apply subject-level metadata tags (best-effort)
    ///
    /// Returns `false` when the registry does not expose the metadata
    /// endpoint; that is not an error.
    async fn update_schema_metadata(
        &self,
        subject: &str,
        metadata: &SubjectMetadata,
    ) -> Result<bool>;
}

/// REST implementation of [`SchemaRegistry`]
pub struct RestRegistryClient {
    http: reqwest::Client,
    base_url: String,
    basic_auth: Option<(String, String)>,
}

impl RestRegistryClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.url).map_err(|e| {
            RegistryError::ConnectionFailed(format!("Invalid registry URL '{}': {e}", config.url))
        })?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                RegistryError::ConnectionFailed(format!("Failed to build HTTP client: {e}"))
            })?;

        let basic_auth = if config.auth_type == "basic" {
            match (&config.username, &config.password) {
                (Some(username), Some(password)) => Some((
                    username.clone(),
                    password.expose_secret().as_ref().to_string(),
                )),
                _ => None,
            }
        } else {
            None
        };

        Ok(Self {
            http,
            base_url,
            basic_auth,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some((username, password)) = &self.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout(e.to_string())
            } else {
                RegistryError::ConnectionFailed(e.to_string())
            }
        })?;
        Ok(response)
    }

    /// Map a non-success response to a registry error
    async fn error_for(response: reqwest::Response) -> RegistryError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();

        match status {
            401 | 403 => RegistryError::AuthenticationFailed(message),
            400..=499 => RegistryError::ClientError { status, message },
            _ => RegistryError::ServerError { status, message },
        }
    }
}

#[async_trait]
impl SchemaRegistry for RestRegistryClient {
    async fn get_subjects(&self) -> Result<Vec<String>> {
        let response = self.send(self.request(reqwest::Method::GET, "/subjects")).await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await.into());
        }

        let subjects = response
            .json::<Vec<String>>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;
        Ok(subjects)
    }

    async fn get_schema(&self, subject: &str) -> Result<Option<SchemaInfo>> {
        let path = format!("/subjects/{subject}/versions/latest");
        let response = self.send(self.request(reqwest::Method::GET, &path)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response).await.into());
        }

        let version = response
            .json::<SchemaVersionResponse>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;
        Ok(Some(version.into()))
    }

    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: &str,
    ) -> Result<u32> {
        let path = format!("/subjects/{subject}/versions");
        let body = RegisterSchemaRequest {
            schema: schema.to_string(),
            schema_type: schema_type.to_string(),
        };

        let response = self
            .send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;

        if !response.status().is_success() {
            let error = Self::error_for(response).await;
            return Err(RegistryError::RegistrationFailed(error.to_string()).into());
        }

        let registered = response
            .json::<RegisterSchemaResponse>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        tracing::info!(subject, schema_id = registered.id, "Registered schema version");
        Ok(registered.id)
    }

    async fn get_compatibility(&self, subject: &str) -> Result<Option<String>> {
        let path = format!("/config/{subject}");
        let response = self.send(self.request(reqwest::Method::GET, &path)).await?;

        // 404 means no subject-level override is set
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response).await.into());
        }

        let config = response
            .json::<CompatibilityConfig>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;
        Ok(config.compatibility_level.or(config.compatibility))
    }

    async fn set_compatibility(&self, subject: &str, level: &str) -> Result<bool> {
        let path = format!("/config/{subject}");
        let body = CompatibilityConfig {
            compatibility_level: None,
            compatibility: Some(level.to_string()),
        };

        let response = self
            .send(self.request(reqwest::Method::PUT, &path).json(&body))
            .await?;

        if !response.status().is_success() {
            let error = Self::error_for(response).await;
            return Err(RegistryError::CompatibilityFailed(error.to_string()).into());
        }

        Ok(true)
    }

    async fn delete_subject_config(&self, subject: &str) -> Result<()> {
        let path = format!("/config/{subject}");
        let response = self.send(self.request(reqwest::Method::DELETE, &path)).await?;

        // Nothing to remove is fine
        if response.status() == reqwest::StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }

        Err(Self::error_for(response).await.into())
    }

    async fn update_schema_metadata(
        &self,
        subject: &str,
        metadata: &SubjectMetadata,
    ) -> Result<bool> {
        let path = format!("/subjects/{subject}/metadata");
        let response = self
            .send(self.request(reqwest::Method::PUT, &path).json(metadata))
            .await?;

        // Older registries don't expose the metadata endpoint
        if matches!(
            response.status(),
            reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::METHOD_NOT_ALLOWED
        ) {
            tracing::debug!(
                subject,
                "Schema Registry does not support subject metadata; skipping"
            );
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response).await.into());
        }

        Ok(true)
    }
}
