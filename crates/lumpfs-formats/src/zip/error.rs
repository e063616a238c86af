//! Error types for Zip operations

use crate::deflate::DeflateError;
use thiserror::Error;

/// Zip operation result type
pub type ZipResult<T> = Result<T, ZipError>;

/// Errors produced while reading or building Zip archives
#[derive(Debug, Error)]
pub enum ZipError {
    /// No end of central directory record in the archive tail
    #[error("End of central directory record not found")]
    EndOfCentralDirectoryNotFound,

    /// The archive spans more than one disk
    #[error("Multi-disk archives are not supported")]
    MultiDisk,

    /// A record does not start with the expected signature
    #[error("Invalid signature at offset {offset}: expected {expected:#010x}")]
    InvalidSignature {
        /// Offset of the record
        offset: u64,
        /// Signature that should be there
        expected: u32,
    },

    /// The central directory does not fit inside the archive
    #[error(
        "Central directory out of bounds: offset {offset}, size {size}, file size {file_size} bytes"
    )]
    CentralDirectoryOutOfBounds {
        /// Offset from the end record
        offset: u64,
        /// Size from the end record
        size: u64,
        /// Size of the whole file
        file_size: u64,
    },

    /// An entry's data runs past the end of the archive
    #[error("Entry {path} out of bounds: data at {offset}, {size} bytes, file size {file_size}")]
    EntryOutOfBounds {
        /// Entry path
        path: String,
        /// Offset of the entry data
        offset: u64,
        /// Compressed size
        size: u64,
        /// Size of the whole file
        file_size: u64,
    },

    /// Compression method other than stored or deflate
    #[error("Unsupported compression method {method} for {path}")]
    UnsupportedMethod {
        /// Entry path
        path: String,
        /// Raw method id
        method: u16,
    },

    /// Decoded data does not match the recorded CRC-32
    #[error("CRC mismatch for {path}: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch {
        /// Entry path
        path: String,
        /// CRC from the central directory
        expected: u32,
        /// CRC of the decoded data
        actual: u32,
    },

    /// Entry is encrypted
    #[error("Entry is encrypted: {0}")]
    Encrypted(String),

    /// Data too large for the 32-bit fields of the format
    #[error("Zip too large: {0}")]
    TooLarge(String),

    /// More entries than the 16-bit entry count can hold
    #[error("Too many entries: {0}")]
    TooManyEntries(usize),

    /// Entry name is empty or otherwise unusable
    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),

    /// Compressed payload could not be processed
    #[error("Deflate error: {0}")]
    Deflate(#[from] DeflateError),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZipError {
    /// Check whether the error means the file is not a Zip archive at all
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::EndOfCentralDirectoryNotFound)
    }
}
