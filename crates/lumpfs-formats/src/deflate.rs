//! Raw deflate compression and decompression
//!
//! Zip entries using method 8 store a raw deflate stream with no zlib
//! header or trailer. The uncompressed size is always known up front from the
//! central directory, so inflation is bounded by it.

use flate2::Compression;
use flate2::read::{DeflateDecoder, DeflateEncoder};
use std::io::Read;
use thiserror::Error;

/// Compression level used when no explicit level is requested.
pub const DEFAULT_LEVEL: u32 = 6;

/// Maximum compression level accepted by [`deflate_raw`].
pub const MAX_LEVEL: u32 = 9;

/// Deflate operation result type
pub type DeflateResult<T> = Result<T, DeflateError>;

/// Errors produced by the raw deflate codec
#[derive(Debug, Error)]
pub enum DeflateError {
    /// The compressed stream could not be decoded
    #[error("Inflate failed: {0}")]
    Inflate(std::io::Error),

    /// The encoder failed
    #[error("Deflate failed: {0}")]
    Deflate(std::io::Error),

    /// The stream decoded to a different length than declared
    #[error("Inflated size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size declared by the container
        expected: usize,
        /// Size actually produced (capped at `expected + 1`)
        actual: usize,
    },
}

/// Inflate a raw deflate stream whose uncompressed size is known.
///
/// Decoding stops one byte past `expected_size`, so a stream that claims to be
/// smaller than it really is cannot balloon memory.
pub fn inflate_raw(data: &[u8], expected_size: usize) -> DeflateResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut inflated = Vec::with_capacity(expected_size);

    (&mut decoder)
        .take(expected_size as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(DeflateError::Inflate)?;

    if inflated.len() != expected_size {
        return Err(DeflateError::SizeMismatch {
            expected: expected_size,
            actual: inflated.len(),
        });
    }

    Ok(inflated)
}

/// Compress `data` into a raw deflate stream at the given level (0-9).
pub fn deflate_raw(data: &[u8], level: u32) -> DeflateResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(data, Compression::new(level.min(MAX_LEVEL)));
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(DeflateError::Deflate)?;
    Ok(compressed)
}
