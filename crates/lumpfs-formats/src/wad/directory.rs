//! WAD directory parsing
//!
//! The directory is a contiguous block of 16-byte records located at the
//! offset named in the header. Each record carries the lump's file offset,
//! its size and an 8-byte name field that is zero padded but not necessarily
//! NUL terminated.

use crate::wad::error::{WadError, WadResult};
use crate::wad::header::{WAD_HEADER_SIZE, WadHeader, WadKind};
use binrw::{BinRead, BinWrite};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Size of one directory record in bytes
pub const WAD_DIRECTORY_ENTRY_SIZE: u64 = 16;

/// Length of the fixed lump name field
pub const LUMP_NAME_LENGTH: usize = 8;

/// Decode an 8-byte lump name field.
///
/// Every byte is masked with `0x7F` to strip the legacy high-bit marking and
/// the name ends at the first NUL or after eight bytes.
pub fn decode_lump_name(raw: &[u8; LUMP_NAME_LENGTH]) -> String {
    raw.iter()
        .map(|b| b & 0x7F)
        .take_while(|&b| b != 0)
        .map(char::from)
        .collect()
}

/// Encode a lump name into the fixed 8-byte field, zero padded.
pub fn encode_lump_name(name: &str) -> WadResult<[u8; LUMP_NAME_LENGTH]> {
    if name.len() > LUMP_NAME_LENGTH || !name.is_ascii() || name.contains('\0') {
        return Err(WadError::InvalidName(name.to_string()));
    }

    let mut raw = [0u8; LUMP_NAME_LENGTH];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    Ok(raw)
}

/// One directory record
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WadDirectoryEntry {
    /// Byte offset of the lump data
    pub file_pos: i32,

    /// Lump size in bytes
    pub size: i32,

    /// Raw name field
    pub raw_name: [u8; LUMP_NAME_LENGTH],
}

impl WadDirectoryEntry {
    /// Create a record for a named lump
    pub fn new(name: &str, file_pos: i32, size: i32) -> WadResult<Self> {
        Ok(Self {
            file_pos,
            size,
            raw_name: encode_lump_name(name)?,
        })
    }

    /// Decoded lump name
    pub fn name(&self) -> String {
        decode_lump_name(&self.raw_name)
    }

    /// Byte offset as an unsigned value (validated records only)
    pub fn offset(&self) -> u64 {
        u64::from(self.file_pos.max(0).unsigned_abs())
    }

    /// Size as an unsigned value (validated records only)
    pub fn len(&self) -> u64 {
        u64::from(self.size.max(0).unsigned_abs())
    }

    /// Check if the lump is zero-length (typically a marker)
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn validate(&self, index: usize, file_size: u64) -> WadResult<()> {
        let in_bounds = self.file_pos >= 0
            && self.size >= 0
            && self.offset() + self.len() <= file_size;

        if in_bounds {
            Ok(())
        } else {
            Err(WadError::LumpOutOfBounds {
                index,
                name: self.name(),
                offset: i64::from(self.file_pos),
                size: i64::from(self.size),
                file_size,
            })
        }
    }
}

/// A parsed WAD directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadDirectory {
    /// File header
    pub header: WadHeader,
    /// Decoded WAD kind
    pub kind: WadKind,
    /// Directory records in file order
    pub entries: Vec<WadDirectoryEntry>,
}

impl WadDirectory {
    /// Parse the header and directory from a seekable stream.
    ///
    /// Every record is checked against the stream length; a record that runs
    /// past the end makes the whole directory invalid.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> WadResult<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = WadHeader::read(reader)?;
        let kind = header.kind()?;
        header.validate(file_size)?;

        let count = header.lump_count as usize;
        let mut entries = Vec::with_capacity(count);
        if count == 0 {
            return Ok(Self {
                header,
                kind,
                entries,
            });
        }

        // The directory is read in one block, then decoded record by record
        reader.seek(SeekFrom::Start(u64::from(header.directory_offset.unsigned_abs())))?;
        let mut block = vec![0u8; header.directory_len() as usize];
        reader.read_exact(&mut block)?;

        let mut cursor = Cursor::new(block);
        for index in 0..count {
            let entry = WadDirectoryEntry::read(&mut cursor)?;
            entry.validate(index, file_size)?;
            entries.push(entry);
        }

        Ok(Self {
            header,
            kind,
            entries,
        })
    }

    /// Number of lumps
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the directory is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the last lump with the given name (case-insensitive).
    ///
    /// Later lumps override earlier ones, so the search runs backwards.
    pub fn find_last(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.name().eq_ignore_ascii_case(name))
    }
}

/// Check whether a stream holds a WAD.
///
/// Reads the 12-byte header at offset 0 and accepts it when the magic is
/// exactly `IWAD` or `PWAD`. The stream position is restored whether or not
/// the probe succeeds.
pub fn is_wad<R: Read + Seek>(reader: &mut R) -> bool {
    let Ok(position) = reader.stream_position() else {
        return false;
    };

    let mut header = [0u8; WAD_HEADER_SIZE as usize];
    let probe = reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_exact(&mut header));

    let restored = reader.seek(SeekFrom::Start(position)).is_ok();

    probe.is_ok()
        && restored
        && WadKind::from_magic(&[header[0], header[1], header[2], header[3]]).is_some()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wad::WadBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_high_bit_name() {
        let raw = [0xC4, 0xC5, 0xC6, 0xC1, 0xCC, 0xC6, 0x00, 0x00];
        assert_eq!(decode_lump_name(&raw), "DEALFY");
    }

    #[test]
    fn test_decode_full_width_name() {
        assert_eq!(decode_lump_name(b"SIDEDEFS"), "SIDEDEFS");
        assert_eq!(decode_lump_name(b"E1M1\0\0\0\0"), "E1M1");
        // Garbage after the terminator is ignored
        assert_eq!(decode_lump_name(b"AB\0CDEFG"), "AB");
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(&encode_lump_name("PLAYPAL").unwrap(), b"PLAYPAL\0");
        assert!(encode_lump_name("TOOLONGNAME").is_err());
        assert!(encode_lump_name("NÖPE").is_err());
    }

    #[test]
    fn test_parse_built_wad() {
        let mut builder = WadBuilder::new(WadKind::Iwad);
        builder.add_lump("E1M1", vec![1u8; 1024]).unwrap();
        builder.add_lump("PLAYPAL", vec![2u8; 768]).unwrap();
        builder.add_lump("F_START", Vec::new()).unwrap();
        let bytes = builder.to_vec().unwrap();

        let directory = WadDirectory::parse(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(directory.kind, WadKind::Iwad);
        assert_eq!(directory.len(), 3);

        let names: Vec<String> = directory.entries.iter().map(WadDirectoryEntry::name).collect();
        assert_eq!(names, vec!["E1M1", "PLAYPAL", "F_START"]);
        assert_eq!(directory.entries[0].len(), 1024);
        assert_eq!(directory.entries[1].len(), 768);
        assert!(directory.entries[2].is_empty());

        let e1m1 = &directory.entries[0];
        let start = e1m1.offset() as usize;
        assert!(bytes[start..start + 1024].iter().all(|&b| b == 1));
    }

    #[test]
    fn test_parse_rejects_lump_past_end() {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        builder.add_lump("DEMO1", vec![0u8; 32]).unwrap();
        let mut bytes = builder.to_vec().unwrap();

        // Directory sits after the data; bump the first record's size
        let dir_offset = i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        bytes[dir_offset + 4..dir_offset + 8].copy_from_slice(&4096i32.to_le_bytes());

        let err = WadDirectory::parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, WadError::LumpOutOfBounds { index: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_truncated_directory() {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        builder.add_lump("A", vec![0u8; 4]).unwrap();
        builder.add_lump("B", vec![0u8; 4]).unwrap();
        let mut bytes = builder.to_vec().unwrap();
        bytes.truncate(bytes.len() - 8);

        let err = WadDirectory::parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, WadError::DirectoryOutOfBounds { .. }));
    }

    #[test]
    fn test_is_wad_restores_position() {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        builder.add_lump("THINGS", vec![0u8; 10]).unwrap();
        let mut cursor = Cursor::new(builder.to_vec().unwrap());
        cursor.seek(SeekFrom::Start(5)).unwrap();

        assert!(is_wad(&mut cursor));
        assert_eq!(cursor.stream_position().unwrap(), 5);

        let mut not_wad = Cursor::new(b"PK\x03\x04 not a wad at all".to_vec());
        not_wad.seek(SeekFrom::Start(3)).unwrap();
        assert!(!is_wad(&mut not_wad));
        assert_eq!(not_wad.stream_position().unwrap(), 3);

        let mut too_short = Cursor::new(b"IWAD".to_vec());
        assert!(!is_wad(&mut too_short));
        assert_eq!(too_short.stream_position().unwrap(), 0);
    }

    #[test]
    fn test_find_last_prefers_later_lumps() {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        builder.add_lump("TEXTURE1", vec![1]).unwrap();
        builder.add_lump("PNAMES", vec![2]).unwrap();
        builder.add_lump("texture1", vec![3]).unwrap();
        let directory =
            WadDirectory::parse(&mut Cursor::new(builder.to_vec().unwrap())).unwrap();

        assert_eq!(directory.find_last("TEXTURE1"), Some(2));
        assert_eq!(directory.find_last("PNAMES"), Some(1));
        assert_eq!(directory.find_last("COLORMAP"), None);
    }
}
