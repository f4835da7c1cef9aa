use std::path::Path;

use anyhow::{Context, Result};
use segstore_storage::{ExtendedS3ClientConfig, ExtendedS3StorageConfig};

/// Derive and print the extended S3 replica pair
pub fn run_replicas(config_path: &Path) -> Result<()> {
    let setup = super::load_setup(config_path)?;
    let config: ExtendedS3StorageConfig = setup
        .get_config()
        .with_context(|| format!("Invalid extendeds3 configuration in {:?}", config_path))?;

    let Some(replicated) = config.as_replicated() else {
        anyhow::bail!(
            "Replication is disabled in {:?}. Set extendeds3.replication.enabled = true.",
            config_path
        );
    };

    let pair = replicated
        .derive_replicas()
        .context("Failed to derive replicas")?;

    print_replica("Primary", &pair.primary);
    println!();
    print_replica("Alternate", &pair.alternate);
    Ok(())
}

fn print_replica(role: &str, client: &ExtendedS3ClientConfig) {
    println!("{}", role);
    println!("--------------------------------------------------------------------------------");
    println!("  Endpoint:    {}", client.connection.endpoint);
    println!("  Hosts:       {}", client.connection.hosts().join(", "));
    println!("  Identity:    {}", client.credentials.identity());
    println!("  Bucket:      {}", client.bucket);
    if let Some(namespace) = client.connection.namespace() {
        println!("  Namespace:   {}", namespace);
    }
    println!("  Path prefix: {}", client.settings.path_prefix);
}
