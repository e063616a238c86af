//! Entry records describing addressable payloads

use std::fmt;

/// Identity of a container for the lifetime of a [`crate::Vfs`].
///
/// Ids are never reused, so a stale id held by a caller simply stops
/// resolving once its container is unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u32);

impl ContainerId {
    /// Wrap a raw id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata for one entry of a container.
///
/// Records are owned by their container and shared with the lump indexes
/// through `Arc`; an index never outlives the container it catalogues
/// because unloading prunes the container's records first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Owning container
    pub container: ContainerId,
    /// Position within the owning container
    pub local_index: usize,
    /// Lump name, at most eight characters for WAD lumps
    pub name: String,
    /// Path the entry is addressed by
    pub path: String,
    /// Uncompressed size
    pub size: usize,
    /// Stored size; equal to `size` when not compressed
    pub compressed_size: usize,
    /// Whether the stored payload must be decoded before use
    pub compressed: bool,
    /// Offset of the payload within the container's stream
    pub base_offset: u64,
    /// Modification time in seconds since the Unix epoch
    pub last_modified: i64,
    /// CRC-32 of the uncompressed data when the container records one
    pub crc32: Option<u32>,
}

impl EntryInfo {
    /// Check if the stored payload is compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Check if the entry is zero-length
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
