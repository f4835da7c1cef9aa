//! Replica derivation for the extended S3 backend.
//!
//! A replicated configuration carries two connection sources, primary and
//! alternate. Deriving replicas turns each source into an independent
//! [`ExtendedS3ClientConfig`]: the connection URI is parsed again, its
//! credentials extracted and its bucket bound. Everything else (prefix,
//! conditional writes, concat threshold) is shared.
//!
//! Derivation is recomputed on every call and fails as a whole: an unusable
//! alternate never degrades to primary-only operation.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::config::{ExtendedS3ClientConfig, ObjectSettings};
use crate::connection::ConnectionDescriptor;
use crate::error::{Result, StorageError};
use crate::properties::{Property, TypedProperties};

/// One endpoint of a replicated configuration, as configured.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaSource {
    uri_property: String,
    #[serde(skip)]
    uri: String,
    bucket_property: String,
    bucket: Option<String>,
}

impl ReplicaSource {
    /// Read a source; the URI must parse now, credentials and bucket are checked on derivation.
    pub(crate) fn read(
        properties: &TypedProperties,
        uri: &Property<&'static str>,
        bucket: &Property<&'static str>,
    ) -> Result<Self> {
        let uri_property = properties.full_name(uri);
        let raw_uri = properties.get_string(uri)?;
        ConnectionDescriptor::parse(&uri_property, &raw_uri)?;

        let bucket_value = properties.get_string(bucket)?;
        Ok(Self {
            uri_property,
            uri: raw_uri,
            bucket_property: properties.full_name(bucket),
            bucket: Some(bucket_value).filter(|b| !b.trim().is_empty()),
        })
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    fn derive(&self, settings: &ObjectSettings) -> Result<ExtendedS3ClientConfig> {
        let connection = ConnectionDescriptor::parse(&self.uri_property, &self.uri)?;
        let credentials = connection.credentials(&self.uri_property)?;
        let bucket = self
            .bucket
            .clone()
            .ok_or_else(|| StorageError::missing(self.bucket_property.clone()))?;
        debug!(
            endpoint = %connection.endpoint,
            bucket = %bucket,
            "Derived replica client configuration"
        );
        Ok(ExtendedS3ClientConfig::new(
            connection,
            credentials,
            bucket,
            settings.clone(),
        ))
    }
}

impl fmt::Debug for ReplicaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaSource")
            .field("uri_property", &self.uri_property)
            .field("uri", &"<redacted>")
            .field("bucket_property", &self.bucket_property)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Extended S3 configuration with replication enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicatedExtendedS3Config {
    pub primary: ReplicaSource,
    pub alternate: ReplicaSource,
    pub settings: ObjectSettings,
}

impl ReplicatedExtendedS3Config {
    pub(crate) fn new(primary: ReplicaSource, alternate: ReplicaSource, settings: ObjectSettings) -> Self {
        Self {
            primary,
            alternate,
            settings,
        }
    }

    /// Resolve both endpoints into independent client configurations.
    pub fn derive_replicas(&self) -> Result<ReplicaPair> {
        Ok(ReplicaPair {
            primary: self.primary.derive(&self.settings)?,
            alternate: self.alternate.derive(&self.settings)?,
        })
    }
}

/// Primary and alternate client configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaPair {
    pub primary: ExtendedS3ClientConfig,
    pub alternate: ExtendedS3ClientConfig,
}

#[cfg(test)]
mod tests {
    use crate::config::ExtendedS3StorageConfig;
    use crate::error::StorageError;
    use crate::setup::ConfigSetup;

    fn replicated(pairs: &[(&str, &str)]) -> ExtendedS3StorageConfig {
        let mut builder = ConfigSetup::builder().with("extendeds3", "replication.enabled", "true");
        for (key, value) in pairs {
            builder = builder.with("extendeds3", *key, *value);
        }
        builder.build().get_config().unwrap()
    }

    #[test]
    fn test_derive_replicas() {
        let config = replicated(&[
            ("connect.config.uri", "https://primary.local?identity=u1&secretKey=s1"),
            ("bucket", "b1"),
            ("alt.connect.config.uri", "https://alt.local?identity=u2&secretKey=s2"),
            ("alt.bucket", "b2"),
            ("prefix", "segments"),
            ("concat.smallObject.threshold.size", "2048"),
        ]);
        let pair = config.as_replicated().unwrap().derive_replicas().unwrap();

        assert_eq!(pair.primary.bucket, "b1");
        assert_eq!(pair.primary.credentials.identity(), "u1");
        assert_eq!(pair.primary.connection.endpoint.host_str(), Some("primary.local"));

        assert_eq!(pair.alternate.bucket, "b2");
        assert_eq!(pair.alternate.credentials.identity(), "u2");
        assert_eq!(pair.alternate.credentials.secret(), "s2");
        assert_eq!(pair.alternate.connection.endpoint.host_str(), Some("alt.local"));

        for client in [&pair.primary, &pair.alternate] {
            assert_eq!(client.settings.path_prefix, "segments/");
            assert_eq!(client.settings.small_object_threshold_bytes, 2048);
        }
    }

    #[test]
    fn test_derivation_is_recomputed() {
        let config = replicated(&[
            ("connect.config.uri", "https://primary.local?identity=u1&secretKey=s1"),
            ("bucket", "b1"),
            ("alt.connect.config.uri", "https://alt.local?identity=u2&secretKey=s2"),
            ("alt.bucket", "b2"),
        ]);
        let replicated = config.as_replicated().unwrap();
        assert_eq!(
            replicated.derive_replicas().unwrap(),
            replicated.derive_replicas().unwrap()
        );
    }

    #[test]
    fn test_missing_alternate_bucket_fails_whole_call() {
        let config = replicated(&[
            ("connect.config.uri", "https://primary.local?identity=u1&secretKey=s1"),
            ("bucket", "b1"),
            ("alt.connect.config.uri", "https://alt.local?identity=u2&secretKey=s2"),
        ]);
        let err = config.as_replicated().unwrap().derive_replicas().unwrap_err();
        assert!(matches!(err, StorageError::MissingProperty { .. }));
        assert_eq!(err.property(), Some("extendeds3.alt.bucket"));
        assert!(config.client_configs().is_err());
    }

    #[test]
    fn test_missing_primary_credentials() {
        let config = replicated(&[
            ("connect.config.uri", "https://primary.local"),
            ("bucket", "b1"),
            ("alt.connect.config.uri", "https://alt.local?identity=u2&secretKey=s2"),
            ("alt.bucket", "b2"),
        ]);
        let err = config.as_replicated().unwrap().derive_replicas().unwrap_err();
        assert!(matches!(
            err,
            StorageError::MissingCredential { field: "identity", .. }
        ));
        assert_eq!(err.property(), Some("extendeds3.connect.config.uri"));
    }

    #[test]
    fn test_alternate_uri_has_no_legacy_name() {
        let err = ConfigSetup::builder()
            .with("extendeds3", "replication.enabled", "true")
            .with("extendeds3", "configUri", "https://primary.local")
            .build()
            .get_config::<ExtendedS3StorageConfig>()
            .unwrap_err();
        assert_eq!(err.property(), Some("extendeds3.alt.connect.config.uri"));
    }
}
