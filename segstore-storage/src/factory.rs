//! Storage factory selection.
//!
//! A [`StorageFactoryCreator`] serves one backend and builds a factory for
//! either layout:
//!
//! * [`LayoutType::Chunked`] factories are bound to the chunked engine
//!   settings ([`ChunkedStorageConfig`]) and the backend configuration.
//! * [`LayoutType::Rolling`] factories are bound to the backend configuration
//!   only; the rolling layout predates threshold-based chunking.
//!
//! Building a factory validates configuration and resolves the backend's
//! client endpoints (replicas included) but performs no I/O.

use std::fmt;
use std::marker::PhantomData;

use tokio::runtime::Handle;
use tracing::{info, instrument};

use crate::backend::{Backend, LayoutType, StorageFactoryInfo};
use crate::config::{
    AzureStorageConfig, BackendConfig, ChunkedStorageConfig, ClientEndpoint, ExtendedS3StorageConfig,
    ObjectSettings, S3StorageConfig,
};
use crate::error::{Result, StorageError};
use crate::handle::SegmentHandle;
use crate::setup::ConfigSetup;

/// A configured storage factory handed to the segment store.
///
/// Implementations own everything a storage adapter needs: the validated
/// configuration, resolved endpoints and the executor to run on.
pub trait StorageFactory: Send + Sync + fmt::Debug {
    /// Backend and layout this factory serves.
    fn info(&self) -> StorageFactoryInfo;

    /// Settings shared by every backend.
    fn settings(&self) -> &ObjectSettings;

    /// Endpoints to connect to, primary first.
    fn endpoints(&self) -> &[ClientEndpoint];

    /// Chunked engine settings; `None` for rolling factories.
    fn chunked_config(&self) -> Option<&ChunkedStorageConfig>;

    /// Executor storage work is scheduled on.
    fn executor(&self) -> &Handle;

    /// Object key a segment is stored under.
    fn object_key(&self, handle: &SegmentHandle) -> String {
        self.settings().object_key(handle.segment_name())
    }
}

/// Factory for the chunked layout.
pub struct ChunkedStorageFactory<C: BackendConfig> {
    chunked: ChunkedStorageConfig,
    config: C,
    endpoints: Vec<ClientEndpoint>,
    executor: Handle,
}

impl<C: BackendConfig> ChunkedStorageFactory<C> {
    pub fn new(chunked: ChunkedStorageConfig, config: C, executor: Handle) -> Result<Self> {
        let endpoints = config.client_endpoints()?;
        Ok(Self {
            chunked,
            config,
            endpoints,
            executor,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<C: BackendConfig> fmt::Debug for ChunkedStorageFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedStorageFactory")
            .field("backend", &C::BACKEND)
            .field("chunked", &self.chunked)
            .field("config", &self.config)
            .finish()
    }
}

impl<C: BackendConfig> StorageFactory for ChunkedStorageFactory<C> {
    fn info(&self) -> StorageFactoryInfo {
        StorageFactoryInfo::new(C::BACKEND, LayoutType::Chunked)
    }

    fn settings(&self) -> &ObjectSettings {
        self.config.settings()
    }

    fn endpoints(&self) -> &[ClientEndpoint] {
        &self.endpoints
    }

    fn chunked_config(&self) -> Option<&ChunkedStorageConfig> {
        Some(&self.chunked)
    }

    fn executor(&self) -> &Handle {
        &self.executor
    }
}

/// Factory for the rolling layout.
pub struct RollingStorageFactory<C: BackendConfig> {
    config: C,
    endpoints: Vec<ClientEndpoint>,
    executor: Handle,
}

impl<C: BackendConfig> RollingStorageFactory<C> {
    pub fn new(config: C, executor: Handle) -> Result<Self> {
        let endpoints = config.client_endpoints()?;
        Ok(Self {
            config,
            endpoints,
            executor,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<C: BackendConfig> fmt::Debug for RollingStorageFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingStorageFactory")
            .field("backend", &C::BACKEND)
            .field("config", &self.config)
            .finish()
    }
}

impl<C: BackendConfig> StorageFactory for RollingStorageFactory<C> {
    fn info(&self) -> StorageFactoryInfo {
        StorageFactoryInfo::new(C::BACKEND, LayoutType::Rolling)
    }

    fn settings(&self) -> &ObjectSettings {
        self.config.settings()
    }

    fn endpoints(&self) -> &[ClientEndpoint] {
        &self.endpoints
    }

    fn chunked_config(&self) -> Option<&ChunkedStorageConfig> {
        None
    }

    fn executor(&self) -> &Handle {
        &self.executor
    }
}

/// Builds storage factories for one backend.
pub trait StorageFactoryCreator: Send + Sync {
    /// Backend this creator serves.
    fn backend(&self) -> Backend;

    /// (backend, layout) pairs this creator supports.
    fn storage_factories(&self) -> Vec<StorageFactoryInfo> {
        LayoutType::ALL
            .into_iter()
            .map(|layout| StorageFactoryInfo::new(self.backend(), layout))
            .collect()
    }

    /// Build the factory described by `info` from `setup`.
    ///
    /// Fails with [`StorageError::BackendMismatch`] if `info` names another backend.
    fn create_factory(
        &self,
        info: &StorageFactoryInfo,
        setup: &ConfigSetup,
        executor: Handle,
    ) -> Result<Box<dyn StorageFactory>>;
}

/// Creator for the backend configured by `C`.
pub struct BackendFactoryCreator<C> {
    _config: PhantomData<fn() -> C>,
}

impl<C: BackendConfig> BackendFactoryCreator<C> {
    pub fn new() -> Self {
        Self {
            _config: PhantomData,
        }
    }
}

impl<C: BackendConfig> Default for BackendFactoryCreator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BackendConfig> StorageFactoryCreator for BackendFactoryCreator<C> {
    fn backend(&self) -> Backend {
        C::BACKEND
    }

    #[instrument(skip(self, setup, executor), fields(factory = %info))]
    fn create_factory(
        &self,
        info: &StorageFactoryInfo,
        setup: &ConfigSetup,
        executor: Handle,
    ) -> Result<Box<dyn StorageFactory>> {
        if info.backend != C::BACKEND {
            return Err(StorageError::BackendMismatch {
                expected: C::BACKEND,
                actual: info.backend,
            });
        }

        let factory: Box<dyn StorageFactory> = match info.layout {
            LayoutType::Chunked => Box::new(ChunkedStorageFactory::new(
                setup.get_config::<ChunkedStorageConfig>()?,
                setup.get_config::<C>()?,
                executor,
            )?),
            LayoutType::Rolling => Box::new(RollingStorageFactory::new(
                setup.get_config::<C>()?,
                executor,
            )?),
        };

        info!(
            endpoints = factory.endpoints().len(),
            prefix = %factory.settings().path_prefix,
            "Storage factory created"
        );
        Ok(factory)
    }
}

pub type ExtendedS3StorageFactoryCreator = BackendFactoryCreator<ExtendedS3StorageConfig>;
pub type S3StorageFactoryCreator = BackendFactoryCreator<S3StorageConfig>;
pub type AzureStorageFactoryCreator = BackendFactoryCreator<AzureStorageConfig>;

/// Build the factory for any (backend, layout) pair.
pub fn create_factory(
    info: StorageFactoryInfo,
    setup: &ConfigSetup,
    executor: Handle,
) -> Result<Box<dyn StorageFactory>> {
    match info.backend {
        Backend::ExtendedS3 => ExtendedS3StorageFactoryCreator::new().create_factory(&info, setup, executor),
        Backend::S3 => S3StorageFactoryCreator::new().create_factory(&info, setup, executor),
        Backend::Azure => AzureStorageFactoryCreator::new().create_factory(&info, setup, executor),
    }
}
