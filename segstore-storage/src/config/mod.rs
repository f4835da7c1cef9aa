//! Validated backend configurations.
//!
//! Each backend reads its own component of a [`ConfigSetup`](crate::ConfigSetup)
//! and produces an immutable configuration value. Construction is
//! all-or-nothing: the first missing or malformed property fails the whole
//! build and is named in the error.

mod azure;
mod chunked;
mod extended_s3;
mod s3;

pub use azure::AzureStorageConfig;
pub use chunked::ChunkedStorageConfig;
pub use extended_s3::{ExtendedS3ClientConfig, ExtendedS3StorageConfig};
pub use s3::{CredentialSource, S3StorageConfig};

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::backend::Backend;
use crate::connection::Credentials;
use crate::error::Result;
use crate::properties::{Property, TypedProperties};
use crate::setup::ComponentConfig;

/// Separator object keys are built with.
pub const PATH_SEPARATOR: char = '/';

/// Append the path separator unless `prefix` already ends with it.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.ends_with(PATH_SEPARATOR) {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, PATH_SEPARATOR)
    }
}

/// Settings shared by every object-storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSettings {
    /// Key prefix, always separator-terminated
    pub path_prefix: String,
    /// Use `If-None-Match: *` on object creation
    pub use_conditional_none_match: bool,
    /// Objects up to this size are concatenated by read + append instead of multi-part copy
    pub small_object_threshold_bytes: u64,
}

impl ObjectSettings {
    pub(crate) fn read(
        properties: &TypedProperties,
        prefix: &Property<&'static str>,
        none_match: &Property<bool>,
        threshold: &Property<i64>,
    ) -> Result<Self> {
        Ok(Self {
            path_prefix: normalize_prefix(&properties.get_string(prefix)?),
            use_conditional_none_match: properties.get_bool(none_match)?,
            small_object_threshold_bytes: properties.get_non_negative(threshold)?,
        })
    }

    /// Object key for a segment.
    pub fn object_key(&self, segment_name: &str) -> String {
        format!("{}{}", self.path_prefix, segment_name)
    }
}

/// One resolved endpoint a storage adapter connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientEndpoint {
    pub endpoint: Url,
    pub credentials: Credentials,
    /// Bucket, or container for Azure
    pub bucket: String,
}

/// A backend configuration a storage factory can be bound to.
pub trait BackendConfig: ComponentConfig + fmt::Debug + Clone + Send + Sync + 'static {
    /// Backend served by this configuration.
    const BACKEND: Backend;

    /// Settings shared by every backend.
    fn settings(&self) -> &ObjectSettings;

    /// Resolve the endpoints to connect to, primary first.
    fn client_endpoints(&self) -> Result<Vec<ClientEndpoint>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("pravega"), "pravega/");
        assert_eq!(normalize_prefix("pravega/"), "pravega/");
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("a/b"), "a/b/");
    }

    #[test]
    fn test_object_key() {
        let settings = ObjectSettings {
            path_prefix: "segments/".to_string(),
            use_conditional_none_match: false,
            small_object_threshold_bytes: 0,
        };
        assert_eq!(settings.object_key("scope/stream/0.#epoch.0"), "segments/scope/stream/0.#epoch.0");
    }
}
