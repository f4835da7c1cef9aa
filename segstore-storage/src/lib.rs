//! Storage backend configuration and factory selection for the segment store.
//!
//! This crate turns flat component properties into validated, immutable
//! backend configurations and picks the storage factory that matches the
//! deployment's (backend, layout) pair. It performs no object-storage I/O.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  ConfigSetup  (builder / TOML file / env overrides) │
//! └──────────────────────────┬──────────────────────────┘
//!                            │ TypedProperties per component
//!          ┌─────────────────┼─────────────────┐
//!          ▼                 ▼                 ▼
//!   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//!   │ extendeds3  │   │     s3      │   │    azure    │
//!   │ (replicas)  │   │             │   │             │
//!   └──────┬──────┘   └──────┬──────┘   └──────┬──────┘
//!          └─────────────────┼─────────────────┘
//!                            ▼
//!              ┌───────────────────────────┐
//!              │  StorageFactoryRegistry   │ ← (backend, layout)
//!              └─────────────┬─────────────┘
//!                  ┌─────────┴─────────┐
//!                  ▼                   ▼
//!            ┌──────────┐        ┌──────────┐
//!            │ Chunked  │        │ Rolling  │
//!            └──────────┘        └──────────┘
//! ```
//!
//! # Property names
//!
//! Properties are addressed as `component.key`:
//!
//! ```text
//! extendeds3.connect.config.uri   = https://ecs:9021?identity=u&secretKey=s
//! extendeds3.bucket               = segments
//! s3.connect.config.uri.override  = true
//! azure.connection.string         = AccountName=acct;AccountKey=...
//! storage.max.indexed.segments    = 1024
//! ```
//!
//! Older deployments may still use legacy key names (`configUri`,
//! `useNoneMatch`, `smallObjectSizeLimitForConcat`); they are read when the
//! current name is absent.
//!
//! # Quick Start
//!
//! ```no_run
//! use segstore_storage::{ConfigSetup, StorageFactoryInfo, StorageFactoryRegistry};
//!
//! # fn example(executor: tokio::runtime::Handle) -> segstore_storage::Result<()> {
//! let setup = ConfigSetup::load("segstore.toml")?.apply_env_overrides();
//! let info: StorageFactoryInfo = "EXTENDEDS3/CHUNKED_STORAGE".parse().unwrap();
//!
//! let factory = StorageFactoryRegistry::with_defaults().create(&info, &setup, executor)?;
//! for endpoint in factory.endpoints() {
//!     println!("{} -> {}", endpoint.endpoint, endpoint.bucket);
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod config;
mod connection;
mod error;
mod factory;
mod handle;
mod properties;
mod registry;
mod replica;
mod setup;

pub use backend::{Backend, LayoutType, StorageFactoryInfo};
pub use config::{
    normalize_prefix, AzureStorageConfig, BackendConfig, ChunkedStorageConfig, ClientEndpoint,
    CredentialSource, ExtendedS3ClientConfig, ExtendedS3StorageConfig, ObjectSettings,
    S3StorageConfig, PATH_SEPARATOR,
};
pub use connection::{AzureConnection, ConnectionDescriptor, Credentials, HostGroup};
pub use error::{Result, StorageError};
pub use factory::{
    create_factory, AzureStorageFactoryCreator, BackendFactoryCreator, ChunkedStorageFactory,
    ExtendedS3StorageFactoryCreator, RollingStorageFactory, S3StorageFactoryCreator,
    StorageFactory, StorageFactoryCreator,
};
pub use handle::SegmentHandle;
pub use properties::{Property, PropertyValue, TypedProperties};
pub use registry::StorageFactoryRegistry;
pub use replica::{ReplicaPair, ReplicaSource, ReplicatedExtendedS3Config};
pub use setup::{ComponentConfig, ConfigSetup, ConfigSetupBuilder, ENV_PREFIX};
