//! Storage configuration error types.

use std::io;
use thiserror::Error;

use crate::backend::{Backend, StorageFactoryInfo};

/// Errors raised while building backend configurations or selecting factories.
///
/// Configuration errors always carry the fully qualified property name
/// (`component.key`) so operators can fix deployment files without reading code.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A required property was absent or empty
    #[error("Missing required property: {property}")]
    MissingProperty { property: String },

    /// A property value could not be converted to its declared type
    #[error("Invalid value for {property}: '{value}' ({reason})")]
    InvalidValue {
        property: String,
        value: String,
        reason: String,
    },

    /// A connection descriptor did not parse
    #[error("Invalid connection descriptor in {property}: {reason}")]
    InvalidConnectionUri { property: String, reason: String },

    /// A parsed connection descriptor lacks a credential field
    #[error("Connection descriptor in {property} has no {field}")]
    MissingCredential {
        property: String,
        field: &'static str,
    },

    /// A configuration file could not be parsed
    #[error("Config file error: {0}")]
    ConfigFile(String),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Factory descriptor routed to a creator serving another backend
    #[error("Factory creator for {expected} cannot build {actual}")]
    BackendMismatch { expected: Backend, actual: Backend },

    /// No creator is registered for the descriptor
    #[error("No storage factory registered for {0}")]
    UnregisteredFactory(StorageFactoryInfo),
}

/// Result type for configuration and factory operations.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub(crate) fn missing(property: impl Into<String>) -> Self {
        StorageError::MissingProperty {
            property: property.into(),
        }
    }

    /// Check if this is a configuration error (bad or missing settings).
    pub fn is_configuration(&self) -> bool {
        !self.is_wiring()
    }

    /// Check if this is a wiring error (programming or deployment mistake).
    pub fn is_wiring(&self) -> bool {
        matches!(
            self,
            StorageError::BackendMismatch { .. } | StorageError::UnregisteredFactory(_)
        )
    }

    /// The offending property name, if the error concerns a single property.
    pub fn property(&self) -> Option<&str> {
        match self {
            StorageError::MissingProperty { property }
            | StorageError::InvalidValue { property, .. }
            | StorageError::InvalidConnectionUri { property, .. }
            | StorageError::MissingCredential { property, .. } => Some(property),
            _ => None,
        }
    }
}
