//! Utility helpers: content hashing and output file storage.
pub mod files;

pub use files::OutputWriter;

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash encoded as lowercase hex.
pub fn compute_sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
