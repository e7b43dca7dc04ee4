//! Content hashing for raw documents.
//!
//! The content hash is the SHA-256 digest of the document bytes, rendered as
//! 64 lowercase hex characters. It is half of the `(source, content_hash)`
//! dedup key and is compared across processes and machines, so the digest
//! and its rendering must never change.

use std::io::{self, Read};

use sha2::{Digest, Sha256};

/// Length of a rendered content hash (256-bit digest, two hex chars per byte).
pub const CONTENT_HASH_LEN: usize = 64;

/// Content hash of the empty byte sequence.
pub const EMPTY_CONTENT_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const READ_CHUNK: usize = 64 * 1024;

/// SHA-256 content addressing for raw documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Lowercase hex digest of `data`. See [`content_hash`].
    #[must_use]
    pub fn hash(data: &[u8]) -> String {
        content_hash(data)
    }

    /// Streaming form of [`Self::hash`].
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `reader`.
    pub fn hash_reader(reader: impl Read) -> io::Result<String> {
        content_hash_reader(reader)
    }
}

/// Compute the content hash of `data`.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the content hash of everything `reader` yields.
///
/// Produces the same digest as [`content_hash`] over the same bytes without
/// buffering the whole document.
///
/// # Errors
///
/// Returns any I/O error raised by `reader`.
pub fn content_hash_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check that `value` looks like a content hash produced by this module.
///
/// Uppercase hex is rejected: it would hash-equal but key-differ.
#[must_use]
pub fn is_content_hash(value: &str) -> bool {
    value.len() == CONTENT_HASH_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
