//! Zip/PK3 archive support
//!
//! Only what a resource loader needs: the end of central directory record,
//! the central directory, local headers for payload offsets, and the stored
//! and raw-deflate methods. Zip64 and encryption are not supported; encrypted
//! entries and entries using other methods are listed but cannot be decoded.

mod builder;
mod directory;
mod dos_time;
mod error;
mod records;

pub use builder::ZipBuilder;
pub use directory::{CompressionMethod, ZipDirectory, ZipEntry, crc32, is_zip};
pub use dos_time::{dos_to_unix, unix_to_dos};
pub use error::{ZipError, ZipResult};
pub use records::{
    CENTRAL_DIRECTORY_SIGNATURE, CentralDirectoryHeader, END_OF_CENTRAL_DIRECTORY_SIGNATURE,
    EndOfCentralDirectory, LOCAL_FILE_HEADER_SIGNATURE, LocalFileHeader,
};
