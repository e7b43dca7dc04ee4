//! Utility functions for `ingest_store`.
//!
//! - [`hash`] - Content addressing (SHA-256 digests of document bytes)

pub mod hash;

pub use hash::{
    CONTENT_HASH_LEN, ContentHasher, EMPTY_CONTENT_HASH, content_hash, content_hash_reader,
    is_content_hash,
};
