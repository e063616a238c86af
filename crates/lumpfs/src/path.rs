//! Virtual path helpers and file identity
//!
//! Virtual paths always use forward slashes. An absolute path starts with
//! `/` or a drive prefix such as `C:/`; everything else is resolved against
//! the configured base path. Lookups are case-insensitive.

use crate::LUMP_EXTENSION;
use lumpfs_formats::wad::LUMP_NAME_LENGTH;
use std::fmt;
use std::path::Path;

/// Normalize a virtual path.
///
/// Backslashes become forward slashes, repeated separators collapse, `.`
/// segments are dropped and `..` removes the previous segment. A trailing
/// separator is dropped except on a root.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let (prefix, rest) = split_root(&path);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if prefix.is_empty() {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut normalized = prefix.to_string();
    normalized.push_str(&segments.join("/"));
    normalized
}

/// Check if a path is absolute
pub fn is_absolute(path: &str) -> bool {
    let path = path.replace('\\', "/");
    !split_root(&path).0.is_empty()
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn make_absolute(path: &str, base: &str) -> String {
    if is_absolute(path) || base.is_empty() {
        normalize(path)
    } else {
        normalize(&format!("{base}/{path}"))
    }
}

/// Case-folded, normalized key used for path comparisons
pub fn lookup_key(path: &str) -> String {
    normalize(path).to_ascii_lowercase()
}

/// Final path segment
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Extension of the final path segment, without the dot.
///
/// A leading dot (`.hidden`) does not start an extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(&name[dot + 1..]),
    }
}

/// Final path segment without its extension
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Lump name for a file: the upper-cased stem, cut to eight characters
pub fn lump_name_for(path: &str) -> String {
    file_stem(path)
        .chars()
        .take(LUMP_NAME_LENGTH)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Addressable path of a lump name (`E1M1` becomes `E1M1.lmp`)
pub fn lump_path_for(name: &str) -> String {
    format!("{name}.{LUMP_EXTENSION}")
}

/// Convert a native path to a virtual one
pub fn from_native(path: &Path) -> String {
    normalize(&path.to_string_lossy())
}

fn split_root(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.get(2) == Some(&b'/') {
            return path.split_at(3);
        }
        return path.split_at(2);
    }
    if path.starts_with('/') {
        return path.split_at(1);
    }
    ("", path)
}

/// Identity of a mounted file, used to refuse loading the same file twice.
///
/// An MD5 digest over the upper-cased, normalized absolute path. Real files
/// are canonicalized first so links to one file share an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId([u8; 16]);

impl FileId {
    /// Identity of an absolute virtual path
    pub fn from_path(path: &str) -> Self {
        let key = normalize(path).to_ascii_uppercase();
        Self(md5::compute(key.as_bytes()).0)
    }

    /// Identity of a real file, following links where possible
    pub fn from_real_path(path: &Path) -> Self {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self::from_path(&from_native(&canonical))
    }

    /// Raw digest bytes
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
