use std::path::Path;

use anyhow::{Context, Result};
use segstore_storage::{
    AzureStorageConfig, Backend, ConfigSetup, ExtendedS3StorageConfig, LayoutType,
    S3StorageConfig, StorageFactoryInfo, StorageFactoryRegistry,
};
use serde_json::Value;
use tokio::runtime::Handle;

/// Build the backend configuration (and optionally its factory) and print a summary
pub fn run_validate(
    config_path: &Path,
    backend: Backend,
    layout: Option<LayoutType>,
    executor: Handle,
) -> Result<()> {
    let setup = super::load_setup(config_path)?;

    let summary = backend_summary(&setup, backend)
        .with_context(|| format!("Invalid {} configuration in {:?}", backend, config_path))?;

    println!("Backend: {} (component '{}')", backend, backend.component());
    println!("--------------------------------------------------------------------------------");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let Some(layout) = layout else {
        println!();
        println!("Configuration OK");
        return Ok(());
    };

    let info = StorageFactoryInfo::new(backend, layout);
    let factory = StorageFactoryRegistry::with_defaults()
        .create(&info, &setup, executor)
        .with_context(|| format!("Failed to create storage factory {}", info))?;

    println!();
    println!("Factory: {}", factory.info());
    println!("  Path prefix:        {}", factory.settings().path_prefix);
    println!(
        "  Conditional writes: {}",
        factory.settings().use_conditional_none_match
    );
    println!(
        "  Small objects:      <= {} bytes",
        factory.settings().small_object_threshold_bytes
    );
    for (i, endpoint) in factory.endpoints().iter().enumerate() {
        let role = if i == 0 { "primary" } else { "alternate" };
        println!(
            "  Endpoint ({}): {} bucket={} identity={}",
            role,
            endpoint.endpoint,
            endpoint.bucket,
            endpoint.credentials.identity()
        );
    }
    if let Some(chunked) = factory.chunked_config() {
        println!("  Chunked engine:");
        println!("{}", serde_json::to_string_pretty(chunked)?);
    }
    println!();
    println!("Configuration OK");
    Ok(())
}

/// Secret-free JSON view of the backend configuration
fn backend_summary(setup: &ConfigSetup, backend: Backend) -> Result<Value> {
    let value = match backend {
        Backend::ExtendedS3 => serde_json::to_value(setup.get_config::<ExtendedS3StorageConfig>()?)?,
        Backend::S3 => serde_json::to_value(setup.get_config::<S3StorageConfig>()?)?,
        Backend::Azure => serde_json::to_value(setup.get_config::<AzureStorageConfig>()?)?,
    };
    Ok(value)
}
