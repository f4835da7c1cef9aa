//! Segment handles.
//!
//! Every storage adapter hands out a [`SegmentHandle`] when a segment is opened
//! and accepts it back on each operation. The handle's mode is fixed at
//! creation; opening the other mode means creating a new handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A segment name together with the holder's access mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentHandle {
    segment_name: String,
    read_only: bool,
}

impl SegmentHandle {
    /// Handle that may only read.
    pub fn for_read(segment_name: impl Into<String>) -> Self {
        Self {
            segment_name: segment_name.into(),
            read_only: true,
        }
    }

    /// Handle that may read and write.
    pub fn for_write(segment_name: impl Into<String>) -> Self {
        Self {
            segment_name: segment_name.into(),
            read_only: false,
        }
    }

    pub fn segment_name(&self) -> &str {
        &self.segment_name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl fmt::Display for SegmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.read_only { "r" } else { "rw" };
        write!(f, "{} ({})", self.segment_name, mode)
    }
}
