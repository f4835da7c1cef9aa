//! ECS-compatible S3 ("extended S3") configuration.
//!
//! Without replication the configuration is a single resolved client
//! configuration. With `replication.enabled = true` it holds two connection
//! sources whose credentials and buckets are resolved by
//! [`ReplicatedExtendedS3Config::derive_replicas`].

use serde::Serialize;
use tracing::info;

use super::{BackendConfig, ClientEndpoint, ObjectSettings};
use crate::backend::Backend;
use crate::connection::{ConnectionDescriptor, Credentials};
use crate::error::Result;
use crate::properties::{Property, TypedProperties};
use crate::replica::{ReplicaSource, ReplicatedExtendedS3Config};
use crate::setup::ComponentConfig;

/// A fully resolved client configuration for one ECS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedS3ClientConfig {
    pub connection: ConnectionDescriptor,
    pub credentials: Credentials,
    pub bucket: String,
    pub settings: ObjectSettings,
}

impl ExtendedS3ClientConfig {
    pub fn new(
        connection: ConnectionDescriptor,
        credentials: Credentials,
        bucket: impl Into<String>,
        settings: ObjectSettings,
    ) -> Self {
        Self {
            connection,
            credentials,
            bucket: bucket.into(),
            settings,
        }
    }
}

/// Configuration of the extended S3 backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExtendedS3StorageConfig {
    /// Single endpoint, credentials and bucket resolved
    Direct(ExtendedS3ClientConfig),
    /// Primary and alternate endpoints, resolved on derivation
    Replicated(ReplicatedExtendedS3Config),
}

impl ExtendedS3StorageConfig {
    pub const REPLICATION_ENABLED: Property<bool> = Property::named("replication.enabled", false);
    pub const CONFIG_URI: Property<&'static str> =
        Property::with_legacy_name("connect.config.uri", "", "configUri");
    pub const BUCKET: Property<&'static str> = Property::named("bucket", "");
    pub const ALT_CONFIG_URI: Property<&'static str> = Property::named("alt.connect.config.uri", "");
    pub const ALT_BUCKET: Property<&'static str> = Property::named("alt.bucket", "");
    pub const PREFIX: Property<&'static str> = Property::named("prefix", "/");
    pub const USE_NONE_MATCH: Property<bool> =
        Property::with_legacy_name("noneMatch.enable", false, "useNoneMatch");
    pub const SMALL_OBJECT_THRESHOLD: Property<i64> = Property::with_legacy_name(
        "concat.smallObject.threshold.size",
        1024 * 1024,
        "smallObjectSizeLimitForConcat",
    );

    pub fn replication_enabled(&self) -> bool {
        matches!(self, ExtendedS3StorageConfig::Replicated(_))
    }

    /// The direct client configuration, if replication is off.
    pub fn as_direct(&self) -> Option<&ExtendedS3ClientConfig> {
        match self {
            ExtendedS3StorageConfig::Direct(config) => Some(config),
            ExtendedS3StorageConfig::Replicated(_) => None,
        }
    }

    /// The replicated configuration, if replication is on.
    pub fn as_replicated(&self) -> Option<&ReplicatedExtendedS3Config> {
        match self {
            ExtendedS3StorageConfig::Direct(_) => None,
            ExtendedS3StorageConfig::Replicated(config) => Some(config),
        }
    }

    /// Client configurations to open: one, or the derived primary and alternate.
    pub fn client_configs(&self) -> Result<Vec<ExtendedS3ClientConfig>> {
        match self {
            ExtendedS3StorageConfig::Direct(config) => Ok(vec![config.clone()]),
            ExtendedS3StorageConfig::Replicated(config) => {
                let pair = config.derive_replicas()?;
                Ok(vec![pair.primary, pair.alternate])
            }
        }
    }
}

impl ComponentConfig for ExtendedS3StorageConfig {
    const COMPONENT: &'static str = "extendeds3";

    fn from_properties(properties: &TypedProperties) -> Result<Self> {
        let replication_enabled = properties.get_bool(&Self::REPLICATION_ENABLED)?;

        let config = if replication_enabled {
            let primary = ReplicaSource::read(properties, &Self::CONFIG_URI, &Self::BUCKET)?;
            let alternate = ReplicaSource::read(properties, &Self::ALT_CONFIG_URI, &Self::ALT_BUCKET)?;
            let settings = read_settings(properties)?;
            ExtendedS3StorageConfig::Replicated(ReplicatedExtendedS3Config::new(
                primary, alternate, settings,
            ))
        } else {
            let uri_property = properties.full_name(&Self::CONFIG_URI);
            let connection =
                ConnectionDescriptor::parse(&uri_property, &properties.get_string(&Self::CONFIG_URI)?)?;
            let credentials = connection.credentials(&uri_property)?;
            let bucket = properties.get_required_string(&Self::BUCKET)?;
            let settings = read_settings(properties)?;
            ExtendedS3StorageConfig::Direct(ExtendedS3ClientConfig::new(
                connection,
                credentials,
                bucket,
                settings,
            ))
        };

        info!(
            backend = %Backend::ExtendedS3,
            replication = replication_enabled,
            prefix = %config.settings().path_prefix,
            "Extended S3 storage configured"
        );
        Ok(config)
    }
}

impl BackendConfig for ExtendedS3StorageConfig {
    const BACKEND: Backend = Backend::ExtendedS3;

    fn settings(&self) -> &ObjectSettings {
        match self {
            ExtendedS3StorageConfig::Direct(config) => &config.settings,
            ExtendedS3StorageConfig::Replicated(config) => &config.settings,
        }
    }

    fn client_endpoints(&self) -> Result<Vec<ClientEndpoint>> {
        Ok(self
            .client_configs()?
            .into_iter()
            .map(|client| ClientEndpoint {
                endpoint: client.connection.endpoint,
                credentials: client.credentials,
                bucket: client.bucket,
            })
            .collect())
    }
}

fn read_settings(properties: &TypedProperties) -> Result<ObjectSettings> {
    ObjectSettings::read(
        properties,
        &ExtendedS3StorageConfig::PREFIX,
        &ExtendedS3StorageConfig::USE_NONE_MATCH,
        &ExtendedS3StorageConfig::SMALL_OBJECT_THRESHOLD,
    )
}
