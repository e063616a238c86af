//! Container types that own a set of entries.
//!
//! Three variants exist:
//! - `WadFile`: an `IWAD`/`PWAD` lump directory
//! - `ZipFile`: a Zip/PK3 archive with stored and deflated entries
//! - `GenericFile`: any other file, exposed as a single entry
//!
//! Each implements the [`Container`] trait; [`MountedFile`] is the closed
//! sum the mount manager stores. [`interpret`] picks the variant for an open
//! handle by sniffing its contents.

use crate::cache::{CacheTag, LumpCache};
use crate::entry::{ContainerId, EntryInfo};
use crate::handle::{FileHandle, IoStats, SharedHandle};
use crate::path::{self, FileId};
use crate::{Result, VfsError};
use lumpfs_formats::wad::is_wad;
use lumpfs_formats::zip::is_zip;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub mod generic;
pub mod wad;
pub mod zip;

pub use generic::GenericFile;
pub use wad::WadFile;
pub use zip::ZipFile;

/// Variant of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// WAD lump directory
    Wad,
    /// Zip/PK3 archive
    Zip,
    /// Single-entry adaptor
    Generic,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wad => f.write_str("WAD"),
            Self::Zip => f.write_str("Zip"),
            Self::Generic => f.write_str("file"),
        }
    }
}

/// Attributes assigned to a container when it is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Container id
    pub id: ContainerId,
    /// Absolute virtual path
    pub path: String,
    /// Position in the mount sequence
    pub load_order: u32,
    /// Mounted before the end of startup
    pub startup: bool,
    /// Not an original game asset
    pub custom: bool,
    /// Identity registered for duplicate detection
    pub file_id: Option<FileId>,
    /// Modification time of the file, Unix seconds
    pub last_modified: i64,
}

/// State shared by every container variant
#[derive(Debug)]
pub struct ContainerCore {
    info: MountInfo,
    handle: SharedHandle,
    entries: Vec<Arc<EntryInfo>>,
    cache: LumpCache,
}

impl ContainerCore {
    pub(crate) fn new(info: MountInfo, handle: FileHandle, entries: Vec<EntryInfo>) -> Self {
        let cache = LumpCache::new(entries.len());
        Self {
            info,
            handle: handle.into_shared(),
            entries: entries.into_iter().map(Arc::new).collect(),
            cache,
        }
    }

    /// Container id
    pub fn id(&self) -> ContainerId {
        self.info.id
    }

    /// Absolute virtual path
    pub fn path(&self) -> &str {
        &self.info.path
    }

    /// Position in the mount sequence; higher means mounted later
    pub fn load_order(&self) -> u32 {
        self.info.load_order
    }

    /// Mounted before the end of startup
    pub fn is_startup(&self) -> bool {
        self.info.startup
    }

    /// Not an original game asset
    pub fn is_custom(&self) -> bool {
        self.info.custom
    }

    pub(crate) fn set_custom(&mut self, custom: bool) {
        self.info.custom = custom;
    }

    /// Identity registered for duplicate detection
    pub fn file_id(&self) -> Option<FileId> {
        self.info.file_id
    }

    /// Modification time of the file, Unix seconds
    pub fn last_modified(&self) -> i64 {
        self.info.last_modified
    }

    /// Handle the container reads from
    pub fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    /// Entry records in directory order
    pub fn entries(&self) -> &[Arc<EntryInfo>] {
        &self.entries
    }

    /// Lump cache
    pub fn cache(&self) -> &LumpCache {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut LumpCache {
        &mut self.cache
    }
}

/// Interface every container variant provides.
///
/// Variants supply the directory-specific parts: how a whole entry is
/// loaded and how a byte range is read without the cache. Everything else
/// is shared.
pub trait Container {
    /// Shared container state
    fn core(&self) -> &ContainerCore;

    /// Shared container state, mutable
    fn core_mut(&mut self) -> &mut ContainerCore;

    /// Variant of this container
    fn kind(&self) -> ContainerKind;

    /// Read and decode a whole entry from the backing stream
    fn load_lump(&self, index: usize) -> Result<Vec<u8>>;

    /// Fill `buf` from `start` within an entry, bypassing the cache.
    ///
    /// Callers guarantee the range lies inside the entry.
    fn read_uncached(&self, index: usize, buf: &mut [u8], start: usize) -> Result<()>;

    /// Container id
    fn id(&self) -> ContainerId {
        self.core().id()
    }

    /// Absolute virtual path
    fn path(&self) -> &str {
        self.core().path()
    }

    /// Number of entries
    fn lump_count(&self) -> usize {
        self.core().entries().len()
    }

    /// Entry record by local index
    fn lump_info(&self, index: usize) -> Result<&Arc<EntryInfo>> {
        self.core()
            .entries()
            .get(index)
            .ok_or_else(|| VfsError::InvalidLumpIndex {
                container: self.path().to_string(),
                index,
            })
    }

    /// Read part of an entry into `buf`.
    ///
    /// The range is clamped to the entry; a `buf` shorter than the clamped
    /// range is an error. With `try_cache` a cached copy is used when
    /// present; otherwise the backing stream is read directly and the cache
    /// is left alone. Returns the number of bytes copied.
    fn read_lump_section(
        &self,
        index: usize,
        buf: &mut [u8],
        start: usize,
        length: usize,
        try_cache: bool,
    ) -> Result<usize> {
        let entry = self.lump_info(index)?;
        if start >= entry.size {
            return Ok(0);
        }

        let length = length.min(entry.size - start);
        if buf.len() < length {
            return Err(VfsError::BufferTooSmall {
                needed: length,
                available: buf.len(),
            });
        }
        let buf = &mut buf[..length];

        if try_cache {
            if let Some(data) = self.core().cache().get(index) {
                buf.copy_from_slice(&data[start..start + length]);
                return Ok(length);
            }
        }

        self.read_uncached(index, buf, start)?;
        Ok(length)
    }

    /// Read a whole entry into `buf`
    fn read_lump(&self, index: usize, buf: &mut [u8]) -> Result<usize> {
        let size = self.lump_info(index)?.size;
        self.read_lump_section(index, buf, 0, size, true)
    }

    /// Cache a whole entry and return the shared buffer.
    ///
    /// An entry that is already cached only gets its tag updated.
    fn cache_lump(&mut self, index: usize, tag: CacheTag) -> Result<Arc<[u8]>> {
        let entry = Arc::clone(self.lump_info(index)?);

        let cache = self.core_mut().cache_mut();
        if let Some(data) = cache.get(index) {
            cache.change_tag(index, tag);
            return Ok(data);
        }

        let data = self.load_lump(index)?;
        debug!(
            "Caching lump {} ({} bytes) from {} as {}",
            entry.name,
            data.len(),
            self.path(),
            tag
        );

        let path = self.path().to_string();
        self.core_mut()
            .cache_mut()
            .insert(index, data, tag)
            .ok_or(VfsError::InvalidLumpIndex {
                container: path,
                index,
            })
    }

    /// Change the tag of a cached entry; no-op if not cached
    fn change_lump_cache_tag(&mut self, index: usize, tag: CacheTag) -> bool {
        self.core_mut().cache_mut().change_tag(index, tag)
    }

    /// Release a cached entry
    fn unlock_lump(&mut self, index: usize) -> bool {
        self.clear_cached_lump(index)
    }

    /// Release a cached entry
    fn clear_cached_lump(&mut self, index: usize) -> bool {
        self.core_mut().cache_mut().remove(index)
    }

    /// Release every cached entry
    fn clear_lump_cache(&mut self) -> usize {
        self.core_mut().cache_mut().clear()
    }

    /// Release cached entries tagged `up_to` or shorter-lived
    fn purge_lump_cache(&mut self, up_to: CacheTag) -> usize {
        self.core_mut().cache_mut().purge(up_to)
    }

    /// Check if an entry is cached
    fn is_lump_cached(&self, index: usize) -> bool {
        self.core().cache().contains(index)
    }

    /// Read counters of the backing handle
    fn io_stats(&self) -> IoStats {
        self.core().handle().lock().io_stats()
    }
}

/// A mounted container of any variant
#[derive(Debug)]
pub enum MountedFile {
    /// WAD lump directory
    Wad(WadFile),
    /// Zip/PK3 archive
    Zip(ZipFile),
    /// Single-entry adaptor
    Generic(GenericFile),
}

impl MountedFile {
    /// Check if the container is a base game WAD
    pub fn is_iwad(&self) -> bool {
        matches!(self, Self::Wad(wad) if wad.is_iwad())
    }

    /// The WAD variant, if this is one
    pub fn as_wad(&self) -> Option<&WadFile> {
        match self {
            Self::Wad(wad) => Some(wad),
            _ => None,
        }
    }

    /// The Zip variant, if this is one
    pub fn as_zip(&self) -> Option<&ZipFile> {
        match self {
            Self::Zip(zip) => Some(zip),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Container {
        match self {
            Self::Wad(wad) => wad,
            Self::Zip(zip) => zip,
            Self::Generic(generic) => generic,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Container {
        match self {
            Self::Wad(wad) => wad,
            Self::Zip(zip) => zip,
            Self::Generic(generic) => generic,
        }
    }
}

impl Container for MountedFile {
    fn core(&self) -> &ContainerCore {
        self.inner().core()
    }

    fn core_mut(&mut self) -> &mut ContainerCore {
        self.inner_mut().core_mut()
    }

    fn kind(&self) -> ContainerKind {
        self.inner().kind()
    }

    fn load_lump(&self, index: usize) -> Result<Vec<u8>> {
        self.inner().load_lump(index)
    }

    fn read_uncached(&self, index: usize, buf: &mut [u8], start: usize) -> Result<()> {
        self.inner().read_uncached(index, buf, start)
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Wad,
    Zip,
}

/// Pick and open the container variant for a handle.
///
/// The path's extension decides which recognizer runs first; the other
/// runs if it fails. A file neither recognizer accepts is mounted as a
/// single-entry [`GenericFile`]. A recognized archive whose directory is
/// inconsistent is an error and nothing is returned.
pub fn interpret(mut handle: FileHandle, info: MountInfo, base: &str) -> Result<MountedFile> {
    let extension = path::extension(&info.path).map(str::to_ascii_lowercase);
    let order = match extension.as_deref() {
        Some("pk3" | "zip" | "pke") => [Format::Zip, Format::Wad],
        _ => [Format::Wad, Format::Zip],
    };

    for format in order {
        let recognized = match format {
            Format::Wad => is_wad(&mut handle),
            Format::Zip => is_zip(&mut handle),
        };
        if !recognized {
            continue;
        }

        debug!("Interpreting {} as {:?}", info.path, format);
        return Ok(match format {
            Format::Wad => MountedFile::Wad(WadFile::open(handle, info)?),
            Format::Zip => MountedFile::Zip(ZipFile::open(handle, info, base)?),
        });
    }

    debug!("{} is not an archive, mounting as a single lump", info.path);
    Ok(MountedFile::Generic(GenericFile::open(handle, info)))
}
