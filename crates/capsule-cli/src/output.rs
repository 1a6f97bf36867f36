//! Formatted output helpers for CLI commands.

use capsule_common::types::Digest;

/// Number of digest characters shown in listings.
pub const SHORT_DIGEST_LEN: usize = 12;

/// Formats a byte count into a human-readable string (e.g., "1.5 MiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Returns the leading characters of a digest for tabular output.
#[must_use]
pub fn short_digest(digest: &Digest) -> &str {
    let hex = digest.as_hex();
    hex.get(..SHORT_DIGEST_LEN).unwrap_or(hex)
}
