//! Content fingerprints for change detection.

use sha2::{Digest, Sha256};

/// Hash story content with SHA-256.
///
/// Returns the lowercase hex digest. Only used to detect changes between
/// generations, not to protect against tampering.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
