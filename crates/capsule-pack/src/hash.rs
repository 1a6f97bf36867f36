//! SHA-256 content digests.
//!
//! Every required input is identified by the digest of its bytes; readers
//! can re-digest records to detect corruption.

use capsule_common::error::{CapsuleError, Result};
use capsule_common::types::Digest;
use sha2::{Digest as _, Sha256};

/// Computes the SHA-256 digest of a byte slice.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> Digest {
    Digest::from_raw(&Sha256::digest(data))
}

/// Validates that `data` matches the expected digest.
///
/// # Errors
///
/// Returns `CapsuleError::HashMismatch` if the digests differ.
pub fn validate(resource: &str, data: &[u8], expected: &Digest) -> Result<()> {
    let actual = digest_bytes(data);
    if &actual != expected {
        return Err(CapsuleError::HashMismatch {
            resource: resource.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
