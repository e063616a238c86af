//! WAD header parsing and building

use crate::wad::error::{WadError, WadResult};
use binrw::{BinRead, BinWrite};

/// Size of the WAD header in bytes
pub const WAD_HEADER_SIZE: u64 = 12;

/// Magic for a base game data file
pub const IWAD_MAGIC: [u8; 4] = *b"IWAD";

/// Magic for a patch file
pub const PWAD_MAGIC: [u8; 4] = *b"PWAD";

/// Type of the WAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WadKind {
    /// Full standalone game data
    Iwad,
    /// Patch WAD, a small mod
    Pwad,
}

impl WadKind {
    /// Identify a WAD kind from its 4-byte magic
    pub fn from_magic(magic: &[u8; 4]) -> Option<Self> {
        match *magic {
            IWAD_MAGIC => Some(Self::Iwad),
            PWAD_MAGIC => Some(Self::Pwad),
            _ => None,
        }
    }

    /// The 4-byte magic written for this kind
    pub const fn magic(self) -> [u8; 4] {
        match self {
            Self::Iwad => IWAD_MAGIC,
            Self::Pwad => PWAD_MAGIC,
        }
    }

    /// Check if this is base game data
    pub const fn is_iwad(self) -> bool {
        matches!(self, Self::Iwad)
    }
}

impl std::fmt::Display for WadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iwad => f.write_str("IWAD"),
            Self::Pwad => f.write_str("PWAD"),
        }
    }
}

/// WAD file header
///
/// - Magic (4 bytes, `IWAD` or `PWAD`)
/// - Lump count (signed 32-bit, little-endian)
/// - Directory offset (signed 32-bit, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WadHeader {
    /// Magic signature
    pub magic: [u8; 4],

    /// Number of entries in the directory
    pub lump_count: i32,

    /// Byte offset of the directory
    pub directory_offset: i32,
}

impl WadHeader {
    /// Create a header for the given kind
    pub fn new(kind: WadKind, lump_count: i32, directory_offset: i32) -> Self {
        Self {
            magic: kind.magic(),
            lump_count,
            directory_offset,
        }
    }

    /// Decode the WAD kind from the magic
    pub fn kind(&self) -> WadResult<WadKind> {
        WadKind::from_magic(&self.magic).ok_or(WadError::InvalidMagic(self.magic))
    }

    /// Byte length of the directory block
    pub fn directory_len(&self) -> u64 {
        u64::from(self.lump_count.max(0).unsigned_abs()) * super::WAD_DIRECTORY_ENTRY_SIZE
    }

    /// Validate the header against the size of the file it came from
    pub fn validate(&self, file_size: u64) -> WadResult<()> {
        self.kind()?;

        if self.lump_count < 0 {
            return Err(WadError::InvalidLumpCount(self.lump_count));
        }

        let out_of_bounds = || WadError::DirectoryOutOfBounds {
            offset: i64::from(self.directory_offset),
            count: self.lump_count,
            file_size,
        };

        // An empty WAD may leave the directory offset pointing anywhere
        if self.lump_count == 0 {
            return Ok(());
        }

        let offset = u64::try_from(self.directory_offset).map_err(|_| out_of_bounds())?;
        if offset < WAD_HEADER_SIZE || offset + self.directory_len() > file_size {
            return Err(out_of_bounds());
        }

        Ok(())
    }
}
