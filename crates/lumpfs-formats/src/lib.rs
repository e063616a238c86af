//! Container format parsers and builders for the lumpfs virtual file system
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // WAD directory fields are signed on disk
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! This crate provides symmetric (parser and builder) implementations for the
//! archive formats a Doom-engine resource loader has to understand.
//!
//! # Supported Formats
//!
//! - **WAD**: id Software's `IWAD`/`PWAD` lump directory format
//! - **Zip/PK3**: Zip archives with stored and raw-deflate entries
//! - **Deflate**: raw (headerless) deflate codec used by Zip payloads
//!
//! # Design Principles
//!
//! - **Field-by-field decoding**: every on-disk record is read through a
//!   little-endian `binrw` cursor, never by reinterpreting packed memory
//! - **Position safety**: recognizers never disturb the stream position
//! - **Bounds validation**: directories are checked against the file size
//!   before anything is handed to callers
//! - **Round-Trip Guarantee**: `parse(build(lumps))` yields the same lumps
//!
//! # Example
//!
//! ```rust
//! use lumpfs_formats::wad::{WadBuilder, WadDirectory, WadKind};
//! use std::io::Cursor;
//!
//! let mut builder = WadBuilder::new(WadKind::Pwad);
//! builder.add_lump("E1M1", vec![0u8; 64])?;
//! let bytes = builder.to_vec()?;
//!
//! let directory = WadDirectory::parse(&mut Cursor::new(bytes))?;
//! assert_eq!(directory.entries[0].name(), "E1M1");
//! # Ok::<(), lumpfs_formats::wad::WadError>(())
//! ```

#![warn(missing_docs)]

/// Raw deflate codec used for Zip entry payloads
pub mod deflate;
/// WAD (`IWAD`/`PWAD`) header, directory, recognizer and builder
pub mod wad;
/// Zip archive records, directory, recognizer and builder
pub mod zip;

/// Version information for the formats crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
