//! Azure Blob configuration.

use serde::Serialize;
use tracing::info;

use super::{BackendConfig, ClientEndpoint, ObjectSettings};
use crate::backend::Backend;
use crate::connection::AzureConnection;
use crate::error::{Result, StorageError};
use crate::properties::{Property, TypedProperties};
use crate::setup::ComponentConfig;

/// Configuration of the Azure Blob backend.
///
/// The storage account name and key from the connection string act as
/// identity and secret; the container plays the role of the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AzureStorageConfig {
    pub connection: AzureConnection,
    pub container: String,
    pub settings: ObjectSettings,
}

impl AzureStorageConfig {
    pub const CONNECTION_STRING: Property<&'static str> = Property::named("connection.string", "");
    pub const ENDPOINT: Property<&'static str> = Property::named("endpoint", "");
    pub const CONTAINER: Property<&'static str> = Property::named("container", "");
    pub const PREFIX: Property<&'static str> = Property::named("prefix", "/");
    pub const USE_NONE_MATCH: Property<bool> =
        Property::with_legacy_name("noneMatch.enable", false, "useNoneMatch");
    pub const SMALL_OBJECT_THRESHOLD: Property<i64> = Property::with_legacy_name(
        "concat.smallObject.threshold.size",
        1024 * 1024,
        "smallObjectSizeLimitForConcat",
    );
}

impl ComponentConfig for AzureStorageConfig {
    const COMPONENT: &'static str = "azure";

    fn from_properties(properties: &TypedProperties) -> Result<Self> {
        let connection_property = properties.full_name(&Self::CONNECTION_STRING);
        let connection_string = properties.get_string(&Self::CONNECTION_STRING)?;
        if connection_string.trim().is_empty() {
            return Err(StorageError::missing(connection_property));
        }
        let endpoint = properties.get_string(&Self::ENDPOINT)?;
        let connection =
            AzureConnection::parse(&connection_property, &connection_string, Some(&endpoint))?;

        let container = properties.get_required_string(&Self::CONTAINER)?;
        let settings = ObjectSettings::read(
            properties,
            &Self::PREFIX,
            &Self::USE_NONE_MATCH,
            &Self::SMALL_OBJECT_THRESHOLD,
        )?;

        info!(
            backend = %Backend::Azure,
            endpoint = %connection.blob_endpoint,
            container = %container,
            "Azure storage configured"
        );
        Ok(Self {
            connection,
            container,
            settings,
        })
    }
}

impl BackendConfig for AzureStorageConfig {
    const BACKEND: Backend = Backend::Azure;

    fn settings(&self) -> &ObjectSettings {
        &self.settings
    }

    fn client_endpoints(&self) -> Result<Vec<ClientEndpoint>> {
        Ok(vec![ClientEndpoint {
            endpoint: self.connection.blob_endpoint.clone(),
            credentials: self.connection.credentials.clone(),
            bucket: self.container.clone(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::ConfigSetup;

    const CONNECTION: &str = "DefaultEndpointsProtocol=http;AccountName=devstoreaccount1;\
        AccountKey=a2V5;BlobEndpoint=http://127.0.0.1:10000/devstoreaccount1";

    #[test]
    fn test_azure_config() {
        let setup = ConfigSetup::builder()
            .with("azure", "connection.string", CONNECTION)
            .with("azure", "container", "segments")
            .with("azure", "prefix", "tier2")
            .build();
        let config: AzureStorageConfig = setup.get_config().unwrap();
        assert_eq!(config.container, "segments");
        assert_eq!(config.connection.credentials.identity(), "devstoreaccount1");
        assert_eq!(config.connection.blob_endpoint.port(), Some(10000));
        assert_eq!(config.settings.path_prefix, "tier2/");
        assert_eq!(config.settings.small_object_threshold_bytes, 1024 * 1024);
    }

    #[test]
    fn test_endpoint_property_overrides_connection_string() {
        let setup = ConfigSetup::builder()
            .with("azure", "connection.string", CONNECTION)
            .with("azure", "endpoint", "http://azurite:10000/devstoreaccount1")
            .with("azure", "container", "segments")
            .build();
        let config: AzureStorageConfig = setup.get_config().unwrap();
        assert_eq!(config.connection.blob_endpoint.host_str(), Some("azurite"));
    }

    #[test]
    fn test_missing_container() {
        let setup = ConfigSetup::builder()
            .with("azure", "connection.string", CONNECTION)
            .build();
        let err = setup.get_config::<AzureStorageConfig>().unwrap_err();
        assert_eq!(err.property(), Some("azure.container"));
    }

    #[test]
    fn test_missing_connection_string() {
        let setup = ConfigSetup::builder().with("azure", "container", "c").build();
        let err = setup.get_config::<AzureStorageConfig>().unwrap_err();
        assert!(matches!(err, StorageError::MissingProperty { .. }));
        assert_eq!(err.property(), Some("azure.connection.string"));
    }
}
