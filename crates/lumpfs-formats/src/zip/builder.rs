//! Zip archive builder
//!
//! Writes each entry as local header plus payload, then the central directory
//! and the end record. Sizes and CRCs are known up front so no data
//! descriptors are emitted.

use crate::deflate::{DEFAULT_LEVEL, deflate_raw};
use crate::zip::directory::{CompressionMethod, crc32};
use crate::zip::dos_time::unix_to_dos;
use crate::zip::error::{ZipError, ZipResult};
use crate::zip::records::{
    CentralDirectoryHeader, EndOfCentralDirectory, FLAG_UTF8, LocalFileHeader, VERSION_NEEDED,
};
use binrw::BinWrite;
use binrw::io::Cursor;
use std::io::{Seek, Write};

/// 1996-01-01, a date the original game data commonly carries
const DEFAULT_MODIFIED: i64 = 820_454_400;

#[derive(Debug, Clone)]
struct PendingEntry {
    name: Vec<u8>,
    method: CompressionMethod,
    crc32: u32,
    size: u32,
    payload: Vec<u8>,
    modified: i64,
}

/// Builder for Zip archives
#[derive(Debug, Clone)]
pub struct ZipBuilder {
    entries: Vec<PendingEntry>,
    comment: Vec<u8>,
    modified: i64,
    level: u32,
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            comment: Vec::new(),
            modified: DEFAULT_MODIFIED,
            level: DEFAULT_LEVEL,
        }
    }

    /// Set the deflate level for subsequently added entries
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the modification time (Unix seconds) stamped on subsequently
    /// added entries
    pub fn set_modified(&mut self, timestamp: i64) -> &mut Self {
        self.modified = timestamp;
        self
    }

    /// Set the archive comment
    pub fn set_comment(&mut self, comment: Vec<u8>) -> &mut Self {
        self.comment = comment;
        self
    }

    /// Add an entry stored without compression
    pub fn add_stored(&mut self, path: &str, data: impl Into<Vec<u8>>) -> ZipResult<&mut Self> {
        let data = data.into();
        let crc32 = crc32(&data);
        self.push(path, CompressionMethod::Stored, crc32, data.len(), data)
    }

    /// Add an entry compressed with raw deflate
    pub fn add_deflated(&mut self, path: &str, data: impl Into<Vec<u8>>) -> ZipResult<&mut Self> {
        let data = data.into();
        let crc32 = crc32(&data);
        let payload = deflate_raw(&data, self.level)?;
        self.push(path, CompressionMethod::Deflated, crc32, data.len(), payload)
    }

    /// Add a directory entry; the name gets a trailing slash if missing
    pub fn add_directory(&mut self, path: &str) -> ZipResult<&mut Self> {
        let path = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        self.push(&path, CompressionMethod::Stored, 0, 0, Vec::new())
    }

    /// Add an entry with a raw method id and a pre-encoded payload.
    ///
    /// Used to produce archives this crate cannot decode, such as entries
    /// using other compression methods.
    pub fn add_raw(
        &mut self,
        path: &str,
        method: u16,
        crc32: u32,
        size: usize,
        payload: Vec<u8>,
    ) -> ZipResult<&mut Self> {
        self.push(path, CompressionMethod::from_id(method), crc32, size, payload)
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(
        &mut self,
        path: &str,
        method: CompressionMethod,
        crc32: u32,
        size: usize,
        payload: Vec<u8>,
    ) -> ZipResult<&mut Self> {
        if path.is_empty() || path.len() > usize::from(u16::MAX) {
            return Err(ZipError::InvalidName(path.to_string()));
        }

        let size = u32::try_from(size).map_err(|_| ZipError::TooLarge(format!("{path}: {size} bytes")))?;
        u32::try_from(payload.len())
            .map_err(|_| ZipError::TooLarge(format!("{path}: {} bytes", payload.len())))?;

        self.entries.push(PendingEntry {
            name: path.as_bytes().to_vec(),
            method,
            crc32,
            size,
            payload,
            modified: self.modified,
        });
        Ok(self)
    }

    /// Write the archive to a stream
    pub fn build<W: Write + Seek>(&self, writer: &mut W) -> ZipResult<()> {
        let total_entries = u16::try_from(self.entries.len())
            .map_err(|_| ZipError::TooManyEntries(self.entries.len()))?;
        let comment_len = u16::try_from(self.comment.len())
            .map_err(|_| ZipError::TooLarge(format!("comment of {} bytes", self.comment.len())))?;

        let mut central = Vec::with_capacity(self.entries.len());
        let mut offset = 0u64;

        for entry in &self.entries {
            let (mod_time, mod_date) = unix_to_dos(entry.modified);
            let local = LocalFileHeader {
                version_needed: VERSION_NEEDED,
                flags: FLAG_UTF8,
                method: entry.method.id(),
                mod_time,
                mod_date,
                crc32: entry.crc32,
                compressed_size: entry.payload.len() as u32,
                uncompressed_size: entry.size,
                name_len: entry.name.len() as u16,
                extra_len: 0,
                name: entry.name.clone(),
                extra: Vec::new(),
            };

            central.push(CentralDirectoryHeader {
                version_made_by: VERSION_NEEDED,
                version_needed: VERSION_NEEDED,
                flags: FLAG_UTF8,
                method: local.method,
                mod_time,
                mod_date,
                crc32: entry.crc32,
                compressed_size: local.compressed_size,
                uncompressed_size: entry.size,
                name_len: local.name_len,
                extra_len: 0,
                comment_len: 0,
                disk_start: 0,
                internal_attributes: 0,
                external_attributes: 0,
                local_header_offset: to_u32(offset)?,
                name: entry.name.clone(),
                extra: Vec::new(),
                comment: Vec::new(),
            });

            local.write(writer)?;
            writer.write_all(&entry.payload)?;
            offset += local.encoded_len() + entry.payload.len() as u64;
        }

        let central_directory_offset = to_u32(offset)?;
        let mut central_directory_size = 0u64;
        for header in &central {
            header.write(writer)?;
            central_directory_size += header.encoded_len();
        }

        EndOfCentralDirectory {
            disk_number: 0,
            central_directory_disk: 0,
            disk_entries: total_entries,
            total_entries,
            central_directory_size: to_u32(central_directory_size)?,
            central_directory_offset,
            comment_len,
            comment: self.comment.clone(),
        }
        .write(writer)?;

        Ok(())
    }

    /// Build the archive into a byte vector
    pub fn to_vec(&self) -> ZipResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.build(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

fn to_u32(value: u64) -> ZipResult<u32> {
    u32::try_from(value).map_err(|_| ZipError::TooLarge(format!("offset {value}")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::zip::ZipDirectory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_archive() {
        let bytes = ZipBuilder::new().to_vec().unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[0..4], b"PK\x05\x06");

        let directory = ZipDirectory::parse(&mut Cursor::new(bytes)).unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_modified_time_is_recorded() {
        let mut builder = ZipBuilder::new();
        builder.set_modified(946_684_800);
        builder.add_stored("y2k.txt", b"ok".to_vec()).unwrap();

        let directory =
            ZipDirectory::parse(&mut Cursor::new(builder.to_vec().unwrap())).unwrap();
        assert_eq!(directory.entries[0].last_modified, 946_684_800);
    }

    #[test]
    fn test_stored_level_zero_deflate() {
        let mut builder = ZipBuilder::new().with_level(0);
        builder.add_deflated("raw.bin", vec![1, 2, 3, 4]).unwrap();
        let bytes = builder.to_vec().unwrap();

        let mut cursor = Cursor::new(bytes);
        let directory = ZipDirectory::parse(&mut cursor).unwrap();
        let entry = &directory.entries[0];
        assert_eq!(entry.method, CompressionMethod::Deflated);
        assert_eq!(entry.extract(&mut cursor).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unsupported_method_is_listed() {
        let mut builder = ZipBuilder::new();
        builder.add_raw("music.mus", 12, 0, 10, vec![0; 6]).unwrap();
        let bytes = builder.to_vec().unwrap();

        let mut cursor = Cursor::new(bytes);
        let directory = ZipDirectory::parse(&mut cursor).unwrap();
        let entry = &directory.entries[0];
        assert_eq!(entry.method, CompressionMethod::Unsupported(12));
        assert!(!entry.is_readable());
        assert!(matches!(
            entry.extract(&mut cursor),
            Err(ZipError::UnsupportedMethod { method: 12, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(matches!(
            ZipBuilder::new().add_stored("", vec![1]),
            Err(ZipError::InvalidName(_))
        ));
    }
}
