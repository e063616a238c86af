//! Error types for WAD operations

use thiserror::Error;

/// WAD operation result type
pub type WadResult<T> = Result<T, WadError>;

/// Errors produced while reading or building WAD files
#[derive(Debug, Error)]
pub enum WadError {
    /// Header magic is neither `IWAD` nor `PWAD`
    #[error("Invalid WAD magic: {0:02x?}")]
    InvalidMagic([u8; 4]),

    /// Header declares a negative lump count
    #[error("Invalid lump count: {0}")]
    InvalidLumpCount(i32),

    /// Directory block does not fit inside the file
    #[error(
        "Directory out of bounds: offset {offset}, {count} entries, file size {file_size} bytes"
    )]
    DirectoryOutOfBounds {
        /// Directory offset from the header
        offset: i64,
        /// Lump count from the header
        count: i32,
        /// Size of the whole file
        file_size: u64,
    },

    /// A directory record points outside the file
    #[error(
        "Lump {index} ({name}) out of bounds: offset {offset}, size {size}, file size {file_size} bytes"
    )]
    LumpOutOfBounds {
        /// Position of the record in the directory
        index: usize,
        /// Decoded lump name
        name: String,
        /// Record file offset
        offset: i64,
        /// Record size
        size: i64,
        /// Size of the whole file
        file_size: u64,
    },

    /// Lump name cannot be stored in the 8-byte name field
    #[error("Invalid lump name: {0:?}")]
    InvalidName(String),

    /// Too much data for the signed 32-bit fields of the format
    #[error("WAD too large: {0}")]
    TooLarge(String),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WadError {
    /// Check whether the error means the file is not a WAD at all, as opposed
    /// to a WAD with a damaged directory
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::InvalidMagic(_))
    }
}
