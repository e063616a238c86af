//! WAD file builder
//!
//! Lays files out the way most editors do: header, lump data in insertion
//! order, then the directory at the end.

use crate::wad::directory::{WAD_DIRECTORY_ENTRY_SIZE, WadDirectoryEntry, encode_lump_name};
use crate::wad::error::{WadError, WadResult};
use crate::wad::header::{WAD_HEADER_SIZE, WadHeader, WadKind};
use binrw::BinWrite;
use binrw::io::Cursor;
use std::io::{Seek, Write};

/// Builder for WAD files
#[derive(Debug, Clone)]
pub struct WadBuilder {
    kind: WadKind,
    lumps: Vec<([u8; 8], Vec<u8>)>,
}

impl WadBuilder {
    /// Create an empty builder
    pub fn new(kind: WadKind) -> Self {
        Self {
            kind,
            lumps: Vec::new(),
        }
    }

    /// Append a lump. Duplicate names are allowed; readers resolve them to
    /// the last occurrence.
    pub fn add_lump(&mut self, name: &str, data: impl Into<Vec<u8>>) -> WadResult<&mut Self> {
        let raw_name = encode_lump_name(name)?;
        self.lumps.push((raw_name, data.into()));
        Ok(self)
    }

    /// Append a zero-length marker lump such as `F_START`
    pub fn add_marker(&mut self, name: &str) -> WadResult<&mut Self> {
        self.add_lump(name, Vec::new())
    }

    /// Number of lumps added so far
    pub fn len(&self) -> usize {
        self.lumps.len()
    }

    /// Check if no lumps were added
    pub fn is_empty(&self) -> bool {
        self.lumps.is_empty()
    }

    /// Write the WAD to a stream
    pub fn build<W: Write + Seek>(&self, writer: &mut W) -> WadResult<()> {
        let lump_count = i32::try_from(self.lumps.len())
            .map_err(|_| WadError::TooLarge(format!("{} lumps", self.lumps.len())))?;

        let mut entries = Vec::with_capacity(self.lumps.len());
        let mut offset = WAD_HEADER_SIZE;
        for (raw_name, data) in &self.lumps {
            entries.push(WadDirectoryEntry {
                file_pos: to_i32(offset)?,
                size: to_i32(data.len() as u64)?,
                raw_name: *raw_name,
            });
            offset += data.len() as u64;
        }

        let directory_offset = to_i32(offset)?;
        // The directory must also fit in the addressable range
        to_i32(offset + WAD_DIRECTORY_ENTRY_SIZE * self.lumps.len() as u64)?;

        WadHeader::new(self.kind, lump_count, directory_offset).write(writer)?;
        for (_, data) in &self.lumps {
            writer.write_all(data)?;
        }
        for entry in &entries {
            entry.write(writer)?;
        }

        Ok(())
    }

    /// Build the WAD into a byte vector
    pub fn to_vec(&self) -> WadResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.build(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

fn to_i32(value: u64) -> WadResult<i32> {
    i32::try_from(value).map_err(|_| WadError::TooLarge(format!("offset {value}")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wad::WadDirectory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_wad() {
        let bytes = WadBuilder::new(WadKind::Pwad).to_vec().unwrap();
        assert_eq!(bytes.len() as u64, WAD_HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"PWAD");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[12, 0, 0, 0]);

        let directory = WadDirectory::parse(&mut Cursor::new(bytes)).unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_layout() {
        let mut builder = WadBuilder::new(WadKind::Iwad);
        builder
            .add_lump("A", vec![0xAA; 3])
            .unwrap()
            .add_marker("S_START")
            .unwrap()
            .add_lump("B", vec![0xBB; 5])
            .unwrap();
        assert_eq!(builder.len(), 3);

        let bytes = builder.to_vec().unwrap();
        assert_eq!(bytes.len(), 12 + 3 + 5 + 3 * 16);

        let directory = WadDirectory::parse(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(directory.header.directory_offset, 20);
        assert_eq!(directory.entries[0].file_pos, 12);
        assert_eq!(directory.entries[1].file_pos, 15);
        assert_eq!(directory.entries[1].size, 0);
        assert_eq!(directory.entries[2].file_pos, 15);
        assert_eq!(directory.entries[2].size, 5);
    }

    #[test]
    fn test_rejects_bad_name() {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        assert!(matches!(
            builder.add_lump("NINECHARS", vec![]),
            Err(WadError::InvalidName(_))
        ));
        assert!(builder.is_empty());
    }
}
