//! WAD container

use super::{Container, ContainerCore, ContainerKind, MountInfo};
use crate::Result;
use crate::entry::EntryInfo;
use crate::handle::FileHandle;
use crate::path;
use lumpfs_formats::wad::{WadDirectory, WadKind};
use tracing::debug;

/// A mounted `IWAD` or `PWAD`.
///
/// Lumps are never compressed; every entry reads straight from its offset.
#[derive(Debug)]
pub struct WadFile {
    core: ContainerCore,
    kind: WadKind,
}

impl WadFile {
    /// Parse the directory and take ownership of the handle.
    ///
    /// Every entry inherits the container's modification time and is
    /// addressed as `NAME.lmp`.
    pub fn open(mut handle: FileHandle, info: MountInfo) -> Result<Self> {
        let directory = WadDirectory::parse(&mut handle)?;

        let entries = directory
            .entries
            .iter()
            .enumerate()
            .map(|(local_index, record)| {
                let name = record.name();
                EntryInfo {
                    container: info.id,
                    local_index,
                    path: path::lump_path_for(&name),
                    name,
                    size: record.len() as usize,
                    compressed_size: record.len() as usize,
                    compressed: false,
                    base_offset: record.offset(),
                    last_modified: info.last_modified,
                    crc32: None,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Read {} directory: {} lumps in {}",
            directory.kind,
            entries.len(),
            info.path
        );

        Ok(Self {
            core: ContainerCore::new(info, handle, entries),
            kind: directory.kind,
        })
    }

    /// `IWAD` or `PWAD`
    pub fn wad_kind(&self) -> WadKind {
        self.kind
    }

    /// Check if this is base game data
    pub fn is_iwad(&self) -> bool {
        self.kind.is_iwad()
    }
}

impl Container for WadFile {
    fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore {
        &mut self.core
    }

    fn kind(&self) -> ContainerKind {
        ContainerKind::Wad
    }

    fn load_lump(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self.lump_info(index)?;
        self.core
            .handle()
            .lock()
            .read_vec_at(entry.base_offset, entry.size)
    }

    fn read_uncached(&self, index: usize, buf: &mut [u8], start: usize) -> Result<()> {
        let entry = self.lump_info(index)?;
        self.core
            .handle()
            .lock()
            .read_exact_at(entry.base_offset + start as u64, buf)
    }
}
