//! Zip central directory parsing

use crate::deflate::inflate_raw;
use crate::zip::dos_time::dos_to_unix;
use crate::zip::error::{ZipError, ZipResult};
use crate::zip::records::{
    CENTRAL_DIRECTORY_SIGNATURE, CentralDirectoryHeader, END_OF_CENTRAL_DIRECTORY_SIGNATURE,
    END_OF_CENTRAL_DIRECTORY_SIZE, EndOfCentralDirectory, LOCAL_FILE_HEADER_SIGNATURE,
    LOCAL_FILE_HEADER_SIZE, LocalFileHeader, MAX_COMMENT_LENGTH,
};
use binrw::BinRead;
use flate2::Crc;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Compression method of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Method 0, data stored as is
    Stored,
    /// Method 8, raw deflate
    Deflated,
    /// Any other method id
    Unsupported(u16),
}

impl CompressionMethod {
    /// Decode a method id
    pub fn from_id(id: u16) -> Self {
        match id {
            0 => Self::Stored,
            8 => Self::Deflated,
            other => Self::Unsupported(other),
        }
    }

    /// Method id as written to the archive
    pub fn id(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflated => 8,
            Self::Unsupported(id) => id,
        }
    }

    /// Check if entries with this method can be decoded
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// One file entry of a Zip archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// Entry path with forward slashes
    pub path: String,
    /// Compression method
    pub method: CompressionMethod,
    /// Whether the entry is encrypted
    pub encrypted: bool,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Size of the stored payload
    pub compressed_size: u64,
    /// Uncompressed size
    pub size: u64,
    /// Offset of the local file header
    pub local_header_offset: u64,
    /// Offset of the payload, past the local header
    pub data_offset: u64,
    /// Modification time in seconds since the Unix epoch
    pub last_modified: i64,
}

impl ZipEntry {
    /// Check if the payload is compressed.
    ///
    /// Follows the method alone; a deflated payload may be exactly as long
    /// as its uncompressed data.
    pub fn is_compressed(&self) -> bool {
        self.method != CompressionMethod::Stored
    }

    /// Check if the payload can be decoded by this crate
    pub fn is_readable(&self) -> bool {
        !self.encrypted && self.method.is_supported()
    }

    /// Decode a payload read from `data_offset`, verifying size and CRC.
    pub fn decode(&self, payload: &[u8]) -> ZipResult<Vec<u8>> {
        if self.encrypted {
            return Err(ZipError::Encrypted(self.path.clone()));
        }

        let size = usize::try_from(self.size)
            .map_err(|_| ZipError::TooLarge(format!("{} bytes", self.size)))?;

        let data = match self.method {
            CompressionMethod::Stored => {
                if payload.len() != size {
                    return Err(crate::deflate::DeflateError::SizeMismatch {
                        expected: size,
                        actual: payload.len(),
                    }
                    .into());
                }
                payload.to_vec()
            }
            CompressionMethod::Deflated => inflate_raw(payload, size)?,
            CompressionMethod::Unsupported(method) => {
                return Err(ZipError::UnsupportedMethod {
                    path: self.path.clone(),
                    method,
                });
            }
        };

        self.verify(&data)?;
        Ok(data)
    }

    /// Check decoded data against the recorded CRC-32
    pub fn verify(&self, data: &[u8]) -> ZipResult<()> {
        let actual = crc32(data);
        if actual == self.crc32 {
            Ok(())
        } else {
            Err(ZipError::CrcMismatch {
                path: self.path.clone(),
                expected: self.crc32,
                actual,
            })
        }
    }

    /// Read and decode the whole entry from the archive stream
    pub fn extract<R: Read + Seek>(&self, reader: &mut R) -> ZipResult<Vec<u8>> {
        let len = usize::try_from(self.compressed_size)
            .map_err(|_| ZipError::TooLarge(format!("{} bytes", self.compressed_size)))?;
        let mut payload = vec![0u8; len];
        reader.seek(SeekFrom::Start(self.data_offset))?;
        reader.read_exact(&mut payload)?;
        self.decode(&payload)
    }
}

/// A parsed Zip central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipDirectory {
    /// End of central directory record
    pub end: EndOfCentralDirectory,
    /// File entries in central directory order, directory entries excluded
    pub entries: Vec<ZipEntry>,
}

impl ZipDirectory {
    /// Parse the central directory of an archive.
    ///
    /// Each entry's local header is read as well so the payload offset is
    /// known exactly; every payload is checked against the stream length.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> ZipResult<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        let (end_offset, end) = find_end_of_central_directory(reader, file_size)?;

        if end.is_multi_disk() {
            return Err(ZipError::MultiDisk);
        }

        let cd_offset = u64::from(end.central_directory_offset);
        let cd_size = u64::from(end.central_directory_size);
        if cd_offset + cd_size > end_offset {
            return Err(ZipError::CentralDirectoryOutOfBounds {
                offset: cd_offset,
                size: cd_size,
                file_size,
            });
        }

        reader.seek(SeekFrom::Start(cd_offset))?;
        let mut block = vec![0u8; cd_size as usize];
        reader.read_exact(&mut block)?;
        let mut cursor = Cursor::new(block);

        let mut entries = Vec::with_capacity(usize::from(end.total_entries));
        for _ in 0..end.total_entries {
            let record_offset = cd_offset + cursor.position();
            let header = CentralDirectoryHeader::read(&mut cursor).map_err(|e| {
                signature_error(e, record_offset, CENTRAL_DIRECTORY_SIGNATURE)
            })?;

            let path = decode_entry_name(&header.name);
            if header.is_directory() || path.is_empty() {
                continue;
            }

            let local_offset = u64::from(header.local_header_offset);
            let compressed_size = u64::from(header.compressed_size);
            let out_of_bounds = |offset| ZipError::EntryOutOfBounds {
                path: path.clone(),
                offset,
                size: compressed_size,
                file_size,
            };

            if local_offset + LOCAL_FILE_HEADER_SIZE > file_size {
                return Err(out_of_bounds(local_offset));
            }

            reader.seek(SeekFrom::Start(local_offset))?;
            let local = LocalFileHeader::read(reader)
                .map_err(|e| signature_error(e, local_offset, LOCAL_FILE_HEADER_SIGNATURE))?;

            let data_offset = local_offset + local.encoded_len();
            if data_offset + compressed_size > file_size {
                return Err(out_of_bounds(data_offset));
            }

            entries.push(ZipEntry {
                path,
                method: CompressionMethod::from_id(header.method),
                encrypted: header.is_encrypted(),
                crc32: header.crc32,
                compressed_size,
                size: u64::from(header.uncompressed_size),
                local_header_offset: local_offset,
                data_offset,
                last_modified: dos_to_unix(header.mod_time, header.mod_date),
            });
        }

        Ok(Self { end, entries })
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the archive holds no file entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by path (case-insensitive)
    pub fn find(&self, path: &str) -> Option<&ZipEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.path.eq_ignore_ascii_case(path))
    }
}

/// Check whether a stream holds a Zip archive.
///
/// Accepts a local file header signature at offset 0, or an end of central
/// directory signature there (an empty archive). The stream position is
/// restored whether or not the probe succeeds.
pub fn is_zip<R: Read + Seek>(reader: &mut R) -> bool {
    let Ok(position) = reader.stream_position() else {
        return false;
    };

    let mut signature = [0u8; 4];
    let probe = reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_exact(&mut signature));

    let restored = reader.seek(SeekFrom::Start(position)).is_ok();

    let signature = u32::from_le_bytes(signature);
    probe.is_ok()
        && restored
        && (signature == LOCAL_FILE_HEADER_SIGNATURE
            || signature == END_OF_CENTRAL_DIRECTORY_SIGNATURE)
}

/// CRC-32 (IEEE) of a byte slice
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

/// Scan the archive tail backwards for the end of central directory record.
///
/// Returns the record's offset along with the record itself.
fn find_end_of_central_directory<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
) -> ZipResult<(u64, EndOfCentralDirectory)> {
    if file_size < END_OF_CENTRAL_DIRECTORY_SIZE {
        return Err(ZipError::EndOfCentralDirectoryNotFound);
    }

    let tail_len = file_size.min(END_OF_CENTRAL_DIRECTORY_SIZE + MAX_COMMENT_LENGTH);
    let tail_start = file_size - tail_len;
    let mut tail = vec![0u8; tail_len as usize];
    reader.seek(SeekFrom::Start(tail_start))?;
    reader.read_exact(&mut tail)?;

    let signature = END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes();
    let fixed = END_OF_CENTRAL_DIRECTORY_SIZE as usize;

    for pos in (0..=tail.len() - fixed).rev() {
        if tail[pos..pos + 4] != signature {
            continue;
        }

        // A signature whose comment would run past the end is a false hit
        let comment_len = usize::from(u16::from_le_bytes([tail[pos + 20], tail[pos + 21]]));
        if pos + fixed + comment_len > tail.len() {
            continue;
        }

        let end = EndOfCentralDirectory::read(&mut Cursor::new(&tail[pos..]))?;
        return Ok((tail_start + pos as u64, end));
    }

    Err(ZipError::EndOfCentralDirectoryNotFound)
}

fn decode_entry_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_string()
}

fn signature_error(error: binrw::Error, offset: u64, expected: u32) -> ZipError {
    match error {
        binrw::Error::BadMagic { .. } => ZipError::InvalidSignature { offset, expected },
        other => other.into(),
    }
}
