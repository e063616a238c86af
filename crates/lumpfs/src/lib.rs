//! Virtual file system for Doom-engine resource containers.
//!
//! This crate layers WAD, Zip/PK3 and loose lump files into one namespace
//! that game code reads through lump names, virtual paths and flat logical
//! lump numbers:
//!
//! - **Containers**: [`container::WadFile`], [`container::ZipFile`] and
//!   [`container::GenericFile`] behind one [`Container`] interface
//! - **Lump Index**: ordered catalogue where later mounts shadow earlier ones
//! - **Lump Cache**: per-container buffers with ordered [`CacheTag`] lifetimes
//! - **Logical addressing**: [`LumpNum`] spans a primary and an auxiliary index
//! - **Mount manager**: the [`Vfs`] context tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use lumpfs::{CacheTag, Vfs, VfsConfig};
//!
//! # fn example() -> lumpfs::Result<()> {
//! let mut vfs = Vfs::new(VfsConfig::new("/usr/share/games/doom"));
//! vfs.add_file("doom.wad", false)?;
//! vfs.end_startup();
//! vfs.add_file("mods/patch.wad", false)?;
//!
//! if let Some(lump) = vfs.check_lump_num_for_name("PLAYPAL", true) {
//!     let palette = vfs.cache_lump(lump, CacheTag::Static)?;
//!     println!("palette is {} bytes", palette.len());
//! }
//!
//! vfs.reset();
//! vfs.shutdown();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_wrap)]

use lumpfs_formats::wad::WadError;
use lumpfs_formats::zip::ZipError;
use thiserror::Error;

// Per-container lump buffers
pub mod cache;

// Configuration
pub mod config;

// Container variants
pub mod container;

// Entry records
pub mod entry;

// File handles
pub mod handle;

// Lump index
pub mod index;

// Logical lump addressing
pub mod lumpnum;

// Path mappings
pub mod mapping;

// Virtual path helpers and file identity
pub mod path;

// Size qualifier mini-syntax
pub mod qualifier;

// Mount manager
mod vfs;

pub use cache::{CacheTag, LumpCache};
pub use config::VfsConfig;
pub use container::{Container, ContainerKind, MountedFile};
pub use entry::{ContainerId, EntryInfo};
pub use handle::{FileHandle, IoStats, OpenMode};
pub use index::LumpIndex;
pub use lumpnum::{AUXILIARY_BASE, LumpNum};
pub use vfs::Vfs;

/// Result type for VFS operations.
pub type Result<T> = std::result::Result<T, VfsError>;

/// Errors that can occur during VFS operations.
///
/// Lookup misses, duplicate mounts and refused unloads are not errors; they
/// are reported through `Option`/`bool` return values.
#[derive(Debug, Error)]
pub enum VfsError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAD directory is inconsistent.
    #[error("Malformed WAD: {0}")]
    Wad(#[from] WadError),

    /// Zip directory is inconsistent or an entry failed to decode.
    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    /// Fewer bytes were available than the entry promised.
    #[error("Short read from {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Path of the backing file
        path: String,
        /// Bytes requested
        expected: usize,
        /// Bytes actually read
        actual: usize,
    },

    /// Destination buffer cannot hold the requested range.
    #[error("Buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes in the requested range, clamped to the entry
        needed: usize,
        /// Length of the destination buffer
        available: usize,
    },

    /// Logical lump number does not address a lump.
    #[error("Invalid lump number: {0}")]
    InvalidLumpNum(LumpNum),

    /// Local lump index is out of range for its container.
    #[error("Invalid lump index {index} in {container}")]
    InvalidLumpIndex {
        /// Container path
        container: String,
        /// Requested index
        index: usize,
    },

    /// Entry uses a compression method that cannot be decoded.
    #[error("Unsupported compression method {method} for {path}")]
    UnsupportedCompression {
        /// Entry path
        path: String,
        /// Raw method id
        method: u16,
    },

    /// Mode string could not be parsed.
    #[error("Invalid open mode: {0:?}")]
    InvalidMode(String),

    /// Auxiliary index could not be opened.
    #[error("Cannot open auxiliary: {0}")]
    AuxiliaryOpen(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VfsError {
    /// Check whether the error means stored data did not match what its
    /// container promised (truncated or corrupt payloads).
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Self::ShortRead { .. } => true,
            Self::Zip(err) => matches!(err, ZipError::CrcMismatch { .. } | ZipError::Deflate(_)),
            _ => false,
        }
    }

    /// Check whether the error means a recognized archive has an
    /// inconsistent directory.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Wad(err) => !err.is_format_mismatch(),
            Self::Zip(err) => !err.is_format_mismatch() && !self.is_integrity_error(),
            _ => false,
        }
    }
}

/// Version information for the VFS.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension given to lump paths that have none.
pub const LUMP_EXTENSION: &str = "lmp";

/// Name of the lump carrying lump-directory mappings.
pub const LUMP_DIRECTORY_LUMP: &str = "DD_DIREC";
