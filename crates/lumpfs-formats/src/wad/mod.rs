//! WAD archive support
//!
//! A WAD is a 12-byte header followed by lump data and a flat directory of
//! 16-byte records. Names are at most eight characters and carry no
//! extension; lumps with the same name may appear more than once.

mod builder;
mod directory;
mod error;
mod header;

pub use builder::WadBuilder;
pub use directory::{
    LUMP_NAME_LENGTH, WAD_DIRECTORY_ENTRY_SIZE, WadDirectory, WadDirectoryEntry,
    decode_lump_name, encode_lump_name, is_wad,
};
pub use error::{WadError, WadResult};
pub use header::{IWAD_MAGIC, PWAD_MAGIC, WAD_HEADER_SIZE, WadHeader, WadKind};
