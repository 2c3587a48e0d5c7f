//! Domain models and types for Argus.
//!
//! This module contains the core domain types shared across the application.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`TopicName`], [`SubjectName`])
//! - **Error types** ([`ArgusError`], [`KafkaSourceError`], [`RegistryError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Argus uses the newtype pattern for identifiers to prevent mixing topic and
//! subject names:
//!
//! ```rust
//! use argus::domain::{TopicName, SubjectName};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let topic = TopicName::new("customer-orders")?;
//! let subject = topic.value_subject();
//! assert_eq!(subject.as_str(), "customer-orders-value");
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ArgusError>`]:
//!
//! ```rust,no_run
//! use argus::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = argus::config::ArgusConfig::from_file("argus.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ArgusError, KafkaSourceError, RegistryError};
pub use ids::{SubjectName, TopicName};
pub use result::Result;
