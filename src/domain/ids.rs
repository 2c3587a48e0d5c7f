//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for Kafka and Schema Registry
//! identifiers. Each type ensures type safety and validates basic format
//! compliance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kafka topic name newtype wrapper
///
/// # Examples
///
/// ```
/// use argus::domain::ids::TopicName;
/// use std::str::FromStr;
///
/// let topic = TopicName::from_str("customer-orders").unwrap();
/// assert_eq!(topic.as_str(), "customer-orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicName(String);

impl TopicName {
    /// Creates a new TopicName from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains characters Kafka
    /// does not accept in topic names.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Topic name cannot be empty".to_string());
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(format!(
                "Invalid topic name '{name}'. Allowed characters: a-z, A-Z, 0-9, '.', '_', '-'"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the topic name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Derive the Schema Registry value subject for this topic
    ///
    /// Confluent's default subject naming strategy appends `-value` to the
    /// topic name.
    pub fn value_subject(&self) -> SubjectName {
        SubjectName(format!("{}-value", self.0))
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TopicName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Schema Registry subject name newtype wrapper
///
/// # Examples
///
/// ```
/// use argus::domain::ids::SubjectName;
/// use std::str::FromStr;
///
/// let subject = SubjectName::from_str("customer-orders-value").unwrap();
/// assert_eq!(subject.as_str(), "customer-orders-value");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectName(String);

impl SubjectName {
    /// Creates a new SubjectName from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is empty.
    pub fn new(subject: impl Into<String>) -> Result<Self, String> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err("Subject name cannot be empty".to_string());
        }
        Ok(Self(subject))
    }

    /// Returns the subject name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SubjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
