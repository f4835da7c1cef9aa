pub mod factories;
pub mod replicas;
pub mod validate;

pub use factories::run_factories;
pub use replicas::run_replicas;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use segstore_storage::ConfigSetup;

/// Load a configuration file and apply environment overrides.
pub(crate) fn load_setup(path: &Path) -> Result<ConfigSetup> {
    let setup = ConfigSetup::load(path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;
    tracing::debug!(path = ?path, "Applying environment overrides");
    Ok(setup.apply_env_overrides())
}
