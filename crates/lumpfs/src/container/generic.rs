//! Single-entry adaptor for files that are not archives

use super::{Container, ContainerCore, ContainerKind, MountInfo};
use crate::Result;
use crate::entry::EntryInfo;
use crate::handle::FileHandle;
use crate::path;

/// Any file mounted as exactly one lump.
///
/// The lump is named after the file (`/music/d_runnin.mus` becomes
/// `D_RUNNIN`) and spans the whole file.
#[derive(Debug)]
pub struct GenericFile {
    core: ContainerCore,
}

impl GenericFile {
    /// Wrap a handle as a one-entry container
    pub fn open(handle: FileHandle, info: MountInfo) -> Self {
        let name = path::lump_name_for(&info.path);
        let size = handle.len() as usize;
        let entry = EntryInfo {
            container: info.id,
            local_index: 0,
            path: path::lump_path_for(&name),
            name,
            size,
            compressed_size: size,
            compressed: false,
            base_offset: 0,
            last_modified: info.last_modified,
            crc32: None,
        };

        Self {
            core: ContainerCore::new(info, handle, vec![entry]),
        }
    }
}

impl Container for GenericFile {
    fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore {
        &mut self.core
    }

    fn kind(&self) -> ContainerKind {
        ContainerKind::Generic
    }

    fn load_lump(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self.lump_info(index)?;
        self.core.handle().lock().read_vec_at(0, entry.size)
    }

    fn read_uncached(&self, index: usize, buf: &mut [u8], start: usize) -> Result<()> {
        self.lump_info(index)?;
        self.core.handle().lock().read_exact_at(start as u64, buf)
    }
}
