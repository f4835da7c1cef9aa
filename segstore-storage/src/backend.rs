//! Backend and layout identifiers used to route factory requests.
//!
//! A [`StorageFactoryInfo`] pairs a [`Backend`] with a [`LayoutType`]. Both are
//! closed enums, so every (backend, layout) combination is known at compile time.
//!
//! ```
//! use segstore_storage::{Backend, LayoutType, StorageFactoryInfo};
//!
//! let info: StorageFactoryInfo = "EXTENDEDS3/chunked".parse().unwrap();
//! assert_eq!(info.backend, Backend::ExtendedS3);
//! assert_eq!(info.layout, LayoutType::Chunked);
//! assert_eq!(info.to_string(), "EXTENDEDS3/CHUNKED_STORAGE");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object-storage provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Backend {
    /// ECS-compatible S3 with append and replication support
    #[serde(rename = "EXTENDEDS3")]
    ExtendedS3,
    /// Generic S3 endpoint
    S3,
    /// Azure Blob storage (append blobs)
    Azure,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::ExtendedS3, Backend::S3, Backend::Azure];

    /// Registry name of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::ExtendedS3 => "EXTENDEDS3",
            Backend::S3 => "S3",
            Backend::Azure => "AZURE",
        }
    }

    /// Configuration component the backend reads its properties from.
    pub fn component(&self) -> &'static str {
        match self {
            Backend::ExtendedS3 => "extendeds3",
            Backend::S3 => "s3",
            Backend::Azure => "azure",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXTENDEDS3" | "ECS" => Ok(Backend::ExtendedS3),
            "S3" => Ok(Backend::S3),
            "AZURE" => Ok(Backend::Azure),
            other => Err(format!(
                "Unknown storage backend: '{}'. Valid options: EXTENDEDS3, S3, AZURE",
                other
            )),
        }
    }
}

/// Storage-engine strategy for mapping segments onto backend objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayoutType {
    /// Segments made of discrete, size-bounded chunks
    #[serde(rename = "CHUNKED_STORAGE")]
    Chunked,
    /// Segments made of rolling append-only objects
    #[serde(rename = "ROLLING_STORAGE")]
    Rolling,
}

impl LayoutType {
    pub const ALL: [LayoutType; 2] = [LayoutType::Chunked, LayoutType::Rolling];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutType::Chunked => "CHUNKED_STORAGE",
            LayoutType::Rolling => "ROLLING_STORAGE",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CHUNKED_STORAGE" | "CHUNKED" => Ok(LayoutType::Chunked),
            "ROLLING_STORAGE" | "ROLLING" => Ok(LayoutType::Rolling),
            other => Err(format!(
                "Unknown layout type: '{}'. Valid options: chunked, rolling",
                other
            )),
        }
    }
}

/// Descriptor used to select a storage factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageFactoryInfo {
    pub backend: Backend,
    pub layout: LayoutType,
}

impl StorageFactoryInfo {
    pub const fn new(backend: Backend, layout: LayoutType) -> Self {
        Self { backend, layout }
    }

    /// Every supported (backend, layout) pair.
    pub fn all() -> impl Iterator<Item = StorageFactoryInfo> {
        Backend::ALL.into_iter().flat_map(|backend| {
            LayoutType::ALL
                .into_iter()
                .map(move |layout| StorageFactoryInfo::new(backend, layout))
        })
    }
}

impl fmt::Display for StorageFactoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend, self.layout)
    }
}

impl FromStr for StorageFactoryInfo {
    type Err = String;

    /// Parse `BACKEND/LAYOUT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (backend, layout) = s
            .split_once('/')
            .ok_or_else(|| format!("Expected BACKEND/LAYOUT, got '{}'", s))?;
        Ok(Self::new(backend.parse()?, layout.parse()?))
    }
}
