//! Fixed Zip record layouts
//!
//! Only the records needed to enumerate stored and deflated entries are
//! modelled. Zip64 extensions are not.

use binrw::{BinRead, BinWrite};

/// Local file header signature (`PK\x03\x04`)
pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Central directory file header signature (`PK\x01\x02`)
pub const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;

/// End of central directory signature (`PK\x05\x06`)
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// Fixed part of a local file header, signature included
pub const LOCAL_FILE_HEADER_SIZE: u64 = 30;

/// Fixed part of a central directory header, signature included
pub const CENTRAL_DIRECTORY_HEADER_SIZE: u64 = 46;

/// Fixed part of the end of central directory record, signature included
pub const END_OF_CENTRAL_DIRECTORY_SIZE: u64 = 22;

/// Longest archive comment the end record can carry
pub const MAX_COMMENT_LENGTH: u64 = 0xFFFF;

/// General purpose flag bit 0: entry is encrypted
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// General purpose flag bit 11: name is UTF-8
pub const FLAG_UTF8: u16 = 0x0800;

/// Version needed to extract stored/deflated entries (2.0)
pub const VERSION_NEEDED: u16 = 20;

/// Local file header preceding each entry's data
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = 0x0403_4b50_u32)]
pub struct LocalFileHeader {
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose flags
    pub flags: u16,
    /// Compression method
    pub method: u16,
    /// DOS modification time
    pub mod_time: u16,
    /// DOS modification date
    pub mod_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub name_len: u16,
    /// Extra field length
    pub extra_len: u16,
    /// File name bytes
    #[br(count = name_len)]
    pub name: Vec<u8>,
    /// Extra field bytes
    #[br(count = extra_len)]
    pub extra: Vec<u8>,
}

impl LocalFileHeader {
    /// Total size of the header, variable fields included
    pub fn encoded_len(&self) -> u64 {
        LOCAL_FILE_HEADER_SIZE + u64::from(self.name_len) + u64::from(self.extra_len)
    }
}

/// Central directory record describing one entry
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = 0x0201_4b50_u32)]
pub struct CentralDirectoryHeader {
    /// Version made by
    pub version_made_by: u16,
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose flags
    pub flags: u16,
    /// Compression method
    pub method: u16,
    /// DOS modification time
    pub mod_time: u16,
    /// DOS modification date
    pub mod_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub name_len: u16,
    /// Extra field length
    pub extra_len: u16,
    /// Comment length
    pub comment_len: u16,
    /// Disk number where the entry starts
    pub disk_start: u16,
    /// Internal file attributes
    pub internal_attributes: u16,
    /// External file attributes
    pub external_attributes: u32,
    /// Offset of the local file header
    pub local_header_offset: u32,
    /// File name bytes
    #[br(count = name_len)]
    pub name: Vec<u8>,
    /// Extra field bytes
    #[br(count = extra_len)]
    pub extra: Vec<u8>,
    /// Entry comment bytes
    #[br(count = comment_len)]
    pub comment: Vec<u8>,
}

impl CentralDirectoryHeader {
    /// Check if the entry is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Check if the entry names a directory rather than a file
    pub fn is_directory(&self) -> bool {
        self.name.last() == Some(&b'/')
    }

    /// Total size of the record, variable fields included
    pub fn encoded_len(&self) -> u64 {
        CENTRAL_DIRECTORY_HEADER_SIZE
            + u64::from(self.name_len)
            + u64::from(self.extra_len)
            + u64::from(self.comment_len)
    }
}

/// End of central directory record
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = 0x0605_4b50_u32)]
pub struct EndOfCentralDirectory {
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where the central directory starts
    pub central_directory_disk: u16,
    /// Central directory records on this disk
    pub disk_entries: u16,
    /// Total central directory records
    pub total_entries: u16,
    /// Size of the central directory in bytes
    pub central_directory_size: u32,
    /// Offset of the central directory
    pub central_directory_offset: u32,
    /// Archive comment length
    pub comment_len: u16,
    /// Archive comment bytes
    #[br(count = comment_len)]
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    /// Check if the archive claims to span more than one disk
    pub fn is_multi_disk(&self) -> bool {
        self.disk_number != 0
            || self.central_directory_disk != 0
            || self.disk_entries != self.total_entries
    }
}
