//! Zip/PK3 container

use super::{Container, ContainerCore, ContainerKind, MountInfo};
use crate::entry::EntryInfo;
use crate::handle::FileHandle;
use crate::path;
use crate::{Result, VfsError};
use lumpfs_formats::zip::{CompressionMethod, ZipDirectory, ZipEntry, ZipError};
use tracing::{debug, warn};

/// A mounted Zip/PK3 archive.
///
/// Entry paths are rooted at the VFS base path, so `textures/wall.png` in
/// the archive answers to `<base>/textures/wall.png`. Encrypted entries and
/// entries using methods other than stored or deflate are left out.
#[derive(Debug)]
pub struct ZipFile {
    core: ContainerCore,
    records: Vec<ZipEntry>,
    skipped: usize,
}

impl ZipFile {
    /// Parse the central directory and take ownership of the handle
    pub fn open(mut handle: FileHandle, info: MountInfo, base: &str) -> Result<Self> {
        let directory = ZipDirectory::parse(&mut handle)?;

        let mut records = Vec::with_capacity(directory.len());
        let mut skipped = 0;
        for record in directory.entries {
            if record.encrypted {
                warn!("Skipping encrypted entry {} in {}", record.path, info.path);
                skipped += 1;
                continue;
            }
            if let CompressionMethod::Unsupported(method) = record.method {
                warn!(
                    "Skipping {} in {}: unsupported compression method {}",
                    record.path, info.path, method
                );
                skipped += 1;
                continue;
            }
            records.push(record);
        }

        let entries = records
            .iter()
            .enumerate()
            .map(|(local_index, record)| EntryInfo {
                container: info.id,
                local_index,
                name: path::lump_name_for(&record.path),
                path: path::make_absolute(&record.path, base),
                size: record.size as usize,
                compressed_size: record.compressed_size as usize,
                compressed: record.is_compressed(),
                base_offset: record.data_offset,
                last_modified: record.last_modified,
                crc32: Some(record.crc32),
            })
            .collect::<Vec<_>>();

        debug!(
            "Read Zip directory: {} entries ({} skipped) in {}",
            entries.len(),
            skipped,
            info.path
        );

        Ok(Self {
            core: ContainerCore::new(info, handle, entries),
            records,
            skipped,
        })
    }

    /// Number of entries left out at mount time
    pub fn skipped_entries(&self) -> usize {
        self.skipped
    }

    /// Path of an entry inside the archive
    pub fn archive_path(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(|record| record.path.as_str())
    }

    fn record(&self, index: usize) -> Result<&ZipEntry> {
        self.records
            .get(index)
            .ok_or_else(|| VfsError::InvalidLumpIndex {
                container: self.core.path().to_string(),
                index,
            })
    }
}

impl Container for ZipFile {
    fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore {
        &mut self.core
    }

    fn kind(&self) -> ContainerKind {
        ContainerKind::Zip
    }

    /// Read the stored payload, inflate it if deflated and check its CRC
    fn load_lump(&self, index: usize) -> Result<Vec<u8>> {
        let record = self.record(index)?;
        let payload = self
            .core
            .handle()
            .lock()
            .read_vec_at(record.data_offset, record.compressed_size as usize)?;

        record.decode(&payload).map_err(|e| match e {
            ZipError::UnsupportedMethod { path, method } => {
                VfsError::UnsupportedCompression { path, method }
            }
            other => other.into(),
        })
    }

    fn read_uncached(&self, index: usize, buf: &mut [u8], start: usize) -> Result<()> {
        let record = self.record(index)?;

        if record.method == CompressionMethod::Stored {
            return self
                .core
                .handle()
                .lock()
                .read_exact_at(record.data_offset + start as u64, buf);
        }

        // Deflate streams have no random access; inflate the whole entry
        let data = self.load_lump(index)?;
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }
}
