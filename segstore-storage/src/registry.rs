//! Registry of storage factory creators.
//!
//! The segment store resolves the configured (backend, layout) pair against
//! the registry once at startup.

use tokio::runtime::Handle;
use tracing::debug;

use crate::backend::StorageFactoryInfo;
use crate::error::{Result, StorageError};
use crate::factory::{
    AzureStorageFactoryCreator, ExtendedS3StorageFactoryCreator, S3StorageFactoryCreator,
    StorageFactory, StorageFactoryCreator,
};
use crate::setup::ConfigSetup;

/// Creators indexed by the factories they declare.
#[derive(Default)]
pub struct StorageFactoryRegistry {
    creators: Vec<Box<dyn StorageFactoryCreator>>,
}

impl StorageFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a creator for every built-in backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ExtendedS3StorageFactoryCreator::new());
        registry.register(S3StorageFactoryCreator::new());
        registry.register(AzureStorageFactoryCreator::new());
        registry
    }

    /// Add a creator. A later creator for the same backend shadows earlier ones.
    pub fn register(&mut self, creator: impl StorageFactoryCreator + 'static) {
        debug!(backend = %creator.backend(), "Registering storage factory creator");
        self.creators.insert(0, Box::new(creator));
    }

    /// Every supported (backend, layout) pair, in registration order.
    pub fn supported(&self) -> Vec<StorageFactoryInfo> {
        let mut infos: Vec<StorageFactoryInfo> = Vec::new();
        for creator in self.creators.iter().rev() {
            for info in creator.storage_factories() {
                if !infos.contains(&info) {
                    infos.push(info);
                }
            }
        }
        infos
    }

    /// Build the factory described by `info`.
    pub fn create(
        &self,
        info: &StorageFactoryInfo,
        setup: &ConfigSetup,
        executor: Handle,
    ) -> Result<Box<dyn StorageFactory>> {
        let creator = self
            .creators
            .iter()
            .find(|creator| creator.storage_factories().contains(info))
            .ok_or(StorageError::UnregisteredFactory(*info))?;
        creator.create_factory(info, setup, executor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, LayoutType};

    #[test]
    fn test_defaults_support_every_pair() {
        let registry = StorageFactoryRegistry::with_defaults();
        assert_eq!(registry.supported(), StorageFactoryInfo::all().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_unregistered_factory() {
        let mut registry = StorageFactoryRegistry::new();
        registry.register(AzureStorageFactoryCreator::new());

        let info = StorageFactoryInfo::new(Backend::S3, LayoutType::Rolling);
        let err = registry
            .create(&info, &ConfigSetup::default(), Handle::current())
            .unwrap_err();
        assert!(err.is_wiring());
        assert!(matches!(err, StorageError::UnregisteredFactory(i) if i == info));
    }

    #[tokio::test]
    async fn test_create_routes_to_backend() {
        let setup = ConfigSetup::builder()
            .with("s3", "connect.config.uri", "http://minio:9000")
            .with("s3", "connect.config.access.key", "minio")
            .with("s3", "connect.config.secret.key", "minio123")
            .with("s3", "bucket", "segments")
            .build();
        let registry = StorageFactoryRegistry::with_defaults();
        let info = StorageFactoryInfo::new(Backend::S3, LayoutType::Chunked);

        let factory = registry.create(&info, &setup, Handle::current()).unwrap();
        assert_eq!(factory.info(), info);
        assert!(factory.chunked_config().is_some());
        assert_eq!(factory.endpoints()[0].credentials.identity(), "minio");
    }
}
