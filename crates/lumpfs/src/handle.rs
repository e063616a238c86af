//! File handles
//!
//! A [`FileHandle`] reads from one of three backings: a real OS file, an
//! in-memory buffer holding a fully read lump, or a window onto another
//! handle. The delegate form lets a mounted container also be opened as a
//! plain file, and lets an uncompressed lump be read in place without
//! buffering it.

use crate::{Result, VfsError};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Handle shared between a container and the delegates opened onto it
pub type SharedHandle = Arc<Mutex<FileHandle>>;

/// Read counters kept by every handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    /// Number of read calls that reached the backing store
    pub read_calls: u64,
    /// Total bytes returned by those calls
    pub bytes_read: u64,
}

enum Backing {
    Os {
        file: File,
        base_offset: u64,
        length: u64,
    },
    Buffer {
        data: Arc<[u8]>,
    },
    Delegate {
        target: SharedHandle,
        base_offset: u64,
        length: u64,
    },
}

/// A readable, seekable view of a file or lump
pub struct FileHandle {
    backing: Backing,
    path: String,
    position: u64,
    stats: IoStats,
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.backing {
            Backing::Os { .. } => "os",
            Backing::Buffer { .. } => "buffer",
            Backing::Delegate { .. } => "delegate",
        };
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("kind", &kind)
            .field("len", &self.len())
            .field("position", &self.position)
            .finish()
    }
}

impl FileHandle {
    /// Open a real file for reading
    pub fn open_file(native: &Path, path: impl Into<String>) -> io::Result<Self> {
        let file = File::open(native)?;
        let length = file.metadata()?.len();
        Ok(Self::new(
            Backing::Os {
                file,
                base_offset: 0,
                length,
            },
            path.into(),
        ))
    }

    /// Wrap an in-memory buffer
    pub fn from_buffer(data: Arc<[u8]>, path: impl Into<String>) -> Self {
        Self::new(Backing::Buffer { data }, path.into())
    }

    /// Open a window of `length` bytes at `base_offset` onto another handle
    pub fn delegate(
        target: SharedHandle,
        base_offset: u64,
        length: u64,
        path: impl Into<String>,
    ) -> Self {
        Self::new(
            Backing::Delegate {
                target,
                base_offset,
                length,
            },
            path.into(),
        )
    }

    fn new(backing: Backing, path: String) -> Self {
        Self {
            backing,
            path,
            position: 0,
            stats: IoStats::default(),
        }
    }

    /// Virtual path the handle was opened for
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Length of the readable window in bytes
    pub fn len(&self) -> u64 {
        match &self.backing {
            Backing::Os { length, .. } | Backing::Delegate { length, .. } => *length,
            Backing::Buffer { data } => data.len() as u64,
        }
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current read position within the window
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Check if the contents are held in memory
    pub fn is_buffered(&self) -> bool {
        matches!(self.backing, Backing::Buffer { .. })
    }

    /// Check if the handle is a window onto another handle
    pub fn is_delegate(&self) -> bool {
        matches!(self.backing, Backing::Delegate { .. })
    }

    /// Read counters for this handle
    pub fn io_stats(&self) -> IoStats {
        self.stats
    }

    /// Move the handle behind a shared lock
    pub fn into_shared(self) -> SharedHandle {
        Arc::new(Mutex::new(self))
    }

    /// Fill `buf` from `offset`.
    ///
    /// Running out of data before `buf` is full is an integrity error, never
    /// a silent truncation.
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if filled < buf.len() {
            return Err(VfsError::ShortRead {
                path: self.path.clone(),
                expected: buf.len(),
                actual: filled,
            });
        }
        Ok(())
    }

    /// Read `len` bytes from `offset` into a new buffer
    pub fn read_vec_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut data = vec![0u8; len];
        self.read_exact_at(offset, &mut data)?;
        Ok(data)
    }

    /// Read the whole window into a new buffer
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let len = usize::try_from(self.len())
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "file too large"))?;
        self.read_vec_at(0, len)
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len().saturating_sub(self.position);
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        if want == 0 {
            return Ok(0);
        }

        let position = self.position;
        let read = match &mut self.backing {
            Backing::Os {
                file, base_offset, ..
            } => {
                file.seek(SeekFrom::Start(*base_offset + position))?;
                file.read(&mut buf[..want])?
            }
            Backing::Buffer { data } => {
                let start = position as usize;
                buf[..want].copy_from_slice(&data[start..start + want]);
                want
            }
            Backing::Delegate {
                target,
                base_offset,
                ..
            } => {
                let mut target = target.lock();
                target.seek(SeekFrom::Start(*base_offset + position))?;
                target.read(&mut buf[..want])?
            }
        };

        self.position += read as u64;
        self.stats.read_calls += 1;
        self.stats.bytes_read += read as u64;
        Ok(read)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative position",
            ));
        };

        self.position = target;
        Ok(target)
    }
}

/// Flags parsed from an `fopen`-style mode string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    /// Only consider real files, never lumps (`f`)
    pub real_file_only: bool,
    /// Do not buffer lump contents (`x`)
    pub no_buffer: bool,
}

impl OpenMode {
    /// Plain read mode, `"rb"`
    pub const READ: Self = Self {
        real_file_only: false,
        no_buffer: false,
    };

    /// Parse a mode string.
    ///
    /// `r` is required. `b` and `t` are accepted and ignored since archives
    /// are always binary. `f` restricts the lookup to real files and `x`
    /// asks for an unbuffered handle.
    pub fn parse(mode: &str) -> Result<Self> {
        let mut parsed = Self::READ;
        let mut read = false;

        for flag in mode.chars() {
            match flag {
                'r' => read = true,
                'b' | 't' => {}
                'f' => parsed.real_file_only = true,
                'x' => parsed.no_buffer = true,
                _ => return Err(VfsError::InvalidMode(mode.to_string())),
            }
        }

        if !read {
            return Err(VfsError::InvalidMode(mode.to_string()));
        }
        Ok(parsed)
    }

    /// Restrict to real files
    #[must_use]
    pub const fn real_file_only(mut self) -> Self {
        self.real_file_only = true;
        self
    }

    /// Ask for an unbuffered handle
    #[must_use]
    pub const fn unbuffered(mut self) -> Self {
        self.no_buffer = true;
        self
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self::READ
    }
}

impl FromStr for OpenMode {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
