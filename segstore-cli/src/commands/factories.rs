use anyhow::Result;
use segstore_storage::StorageFactoryRegistry;

/// Print every (backend, layout) pair the built-in creators support
pub fn run_factories() -> Result<()> {
    let registry = StorageFactoryRegistry::with_defaults();

    println!("{:<12} {:<18} {}", "BACKEND", "LAYOUT", "COMPONENT");
    for info in registry.supported() {
        println!(
            "{:<12} {:<18} {}",
            info.backend.name(),
            info.layout.name(),
            info.backend.component()
        );
    }
    Ok(())
}
