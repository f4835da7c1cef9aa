//! Generic S3 configuration.
//!
//! Credentials come either from the connection URI or from the explicit
//! `connect.config.access.key` / `connect.config.secret.key` pair. The URI wins
//! unless `connect.config.uri.override` is set; when the preferred source is
//! empty the other one is used.

use serde::Serialize;
use tracing::{info, warn};

use super::{BackendConfig, ClientEndpoint, ObjectSettings};
use crate::backend::Backend;
use crate::connection::{ConnectionDescriptor, Credentials};
use crate::error::{Result, StorageError};
use crate::properties::{Property, TypedProperties};
use crate::setup::ComponentConfig;

/// Where the resolved credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    Uri,
    Explicit,
}

/// Configuration of the generic S3 backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3StorageConfig {
    pub connection: ConnectionDescriptor,
    pub credentials: Credentials,
    pub credential_source: CredentialSource,
    pub should_override_uri: bool,
    pub bucket: String,
    pub settings: ObjectSettings,
}

impl S3StorageConfig {
    pub const OVERRIDE_CONFIG_URI: Property<bool> = Property::named("connect.config.uri.override", false);
    pub const CONFIG_URI: Property<&'static str> =
        Property::with_legacy_name("connect.config.uri", "", "configUri");
    pub const ACCESS_KEY: Property<&'static str> = Property::named("connect.config.access.key", "");
    pub const SECRET_KEY: Property<&'static str> = Property::named("connect.config.secret.key", "");
    pub const BUCKET: Property<&'static str> = Property::named("bucket", "");
    pub const PREFIX: Property<&'static str> = Property::named("prefix", "/");
    pub const USE_NONE_MATCH: Property<bool> =
        Property::with_legacy_name("noneMatch.enable", false, "useNoneMatch");
    pub const SMALL_OBJECT_THRESHOLD: Property<i64> = Property::with_legacy_name(
        "concat.smallObject.threshold.size",
        5 * 1024 * 1024,
        "smallObjectSizeLimitForConcat",
    );
}

impl ComponentConfig for S3StorageConfig {
    const COMPONENT: &'static str = "s3";

    fn from_properties(properties: &TypedProperties) -> Result<Self> {
        let should_override_uri = properties.get_bool(&Self::OVERRIDE_CONFIG_URI)?;
        let uri_property = properties.full_name(&Self::CONFIG_URI);
        let connection =
            ConnectionDescriptor::parse(&uri_property, &properties.get_string(&Self::CONFIG_URI)?)?;

        let access_key = properties.get_string(&Self::ACCESS_KEY)?;
        let secret_key = properties.get_string(&Self::SECRET_KEY)?;
        let explicit = (!access_key.is_empty() && !secret_key.is_empty())
            .then(|| Credentials::new(access_key.clone(), secret_key.clone()));
        let embedded = connection.credentials(&uri_property);

        let (credentials, credential_source) = if should_override_uri {
            if explicit.is_some() && embedded.is_ok() {
                warn!(
                    property = %uri_property,
                    "Explicit credentials override credentials embedded in the connection URI"
                );
            }
            match (explicit, embedded.ok()) {
                (Some(creds), _) => (creds, CredentialSource::Explicit),
                (None, Some(creds)) => (creds, CredentialSource::Uri),
                (None, None) => {
                    let (missing, field) = if access_key.is_empty() {
                        (&Self::ACCESS_KEY, "access key")
                    } else {
                        (&Self::SECRET_KEY, "secret key")
                    };
                    return Err(StorageError::MissingCredential {
                        property: properties.full_name(missing),
                        field,
                    });
                }
            }
        } else {
            match (embedded, explicit) {
                (Ok(creds), _) => (creds, CredentialSource::Uri),
                (Err(_), Some(creds)) => (creds, CredentialSource::Explicit),
                (Err(e), None) => return Err(e),
            }
        };

        let bucket = properties.get_required_string(&Self::BUCKET)?;
        let settings = ObjectSettings::read(
            properties,
            &Self::PREFIX,
            &Self::USE_NONE_MATCH,
            &Self::SMALL_OBJECT_THRESHOLD,
        )?;

        info!(
            backend = %Backend::S3,
            endpoint = %connection.endpoint,
            credentials = ?credential_source,
            "S3 storage configured"
        );
        Ok(Self {
            connection,
            credentials,
            credential_source,
            should_override_uri,
            bucket,
            settings,
        })
    }
}

impl BackendConfig for S3StorageConfig {
    const BACKEND: Backend = Backend::S3;

    fn settings(&self) -> &ObjectSettings {
        &self.settings
    }

    fn client_endpoints(&self) -> Result<Vec<ClientEndpoint>> {
        Ok(vec![ClientEndpoint {
            endpoint: self.connection.endpoint.clone(),
            credentials: self.credentials.clone(),
            bucket: self.bucket.clone(),
        }])
    }
}
