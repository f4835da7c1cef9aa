//! Chunked storage-engine settings handed to chunked-layout factories.

use serde::Serialize;

use crate::error::{Result, StorageError};
use crate::properties::{Property, TypedProperties};
use crate::setup::ComponentConfig;

/// Settings of the chunked segment storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkedStorageConfig {
    /// Chunks smaller than this are never concatenated natively
    pub min_size_limit_for_concat: u64,
    /// Upper bound for native concatenation
    pub max_size_limit_for_concat: u64,
    pub appends_enabled: bool,
    pub lazy_commit_enabled: bool,
    pub inline_defrag_enabled: bool,
    pub max_indexed_segments: u64,
}

impl ChunkedStorageConfig {
    pub const MIN_SIZE_LIMIT_FOR_CONCAT: Property<i64> = Property::named("concat.size.limit.min", 0);
    pub const MAX_SIZE_LIMIT_FOR_CONCAT: Property<i64> =
        Property::named("concat.size.limit.max", i64::MAX);
    pub const APPENDS_ENABLED: Property<bool> = Property::named("appends.enable", true);
    pub const LAZY_COMMIT_ENABLED: Property<bool> = Property::named("commit.lazy.enable", true);
    pub const INLINE_DEFRAG_ENABLED: Property<bool> = Property::named("defrag.inline.enable", true);
    pub const MAX_INDEXED_SEGMENTS: Property<i64> = Property::named("max.indexed.segments", 1024);
}

impl Default for ChunkedStorageConfig {
    fn default() -> Self {
        Self {
            min_size_limit_for_concat: 0,
            max_size_limit_for_concat: i64::MAX as u64,
            appends_enabled: true,
            lazy_commit_enabled: true,
            inline_defrag_enabled: true,
            max_indexed_segments: 1024,
        }
    }
}

impl ComponentConfig for ChunkedStorageConfig {
    const COMPONENT: &'static str = "storage";

    fn from_properties(properties: &TypedProperties) -> Result<Self> {
        let min = properties.get_non_negative(&Self::MIN_SIZE_LIMIT_FOR_CONCAT)?;
        let max = properties.get_non_negative(&Self::MAX_SIZE_LIMIT_FOR_CONCAT)?;
        if min > max {
            return Err(StorageError::InvalidValue {
                property: properties.full_name(&Self::MIN_SIZE_LIMIT_FOR_CONCAT),
                value: min.to_string(),
                reason: format!(
                    "exceeds {} ({})",
                    properties.full_name(&Self::MAX_SIZE_LIMIT_FOR_CONCAT),
                    max
                ),
            });
        }

        Ok(Self {
            min_size_limit_for_concat: min,
            max_size_limit_for_concat: max,
            appends_enabled: properties.get_bool(&Self::APPENDS_ENABLED)?,
            lazy_commit_enabled: properties.get_bool(&Self::LAZY_COMMIT_ENABLED)?,
            inline_defrag_enabled: properties.get_bool(&Self::INLINE_DEFRAG_ENABLED)?,
            max_indexed_segments: properties.get_non_negative(&Self::MAX_INDEXED_SEGMENTS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::ConfigSetup;

    #[test]
    fn test_defaults() {
        let config: ChunkedStorageConfig = ConfigSetup::default().get_config().unwrap();
        assert_eq!(config, ChunkedStorageConfig::default());
    }

    #[test]
    fn test_overrides() {
        let setup = ConfigSetup::builder()
            .with("storage", "appends.enable", "false")
            .with("storage", "concat.size.limit.min", "1024")
            .with("storage", "concat.size.limit.max", "4096")
            .build();
        let config: ChunkedStorageConfig = setup.get_config().unwrap();
        assert!(!config.appends_enabled);
        assert_eq!(config.min_size_limit_for_concat, 1024);
        assert_eq!(config.max_size_limit_for_concat, 4096);
    }

    #[test]
    fn test_min_above_max() {
        let setup = ConfigSetup::builder()
            .with("storage", "concat.size.limit.min", "10")
            .with("storage", "concat.size.limit.max", "5")
            .build();
        let err = setup.get_config::<ChunkedStorageConfig>().unwrap_err();
        assert_eq!(err.property(), Some("storage.concat.size.limit.min"));
    }
}
