//! # capsule-pack
//!
//! The replay package: what an extraction run produces and what a replaying
//! analyzer consumes.
//!
//! Handles:
//! - **Unit**: Compilation descriptor, required inputs, and file records.
//! - **Hashing**: SHA-256 content digests and verification.
//! - **Codec**: Gzip-compressed, length-prefixed record streams (`.kindex`).
//! - **Tree**: Directory view over a descriptor's required inputs.
//! - **Store**: Content lookup by path and digest.
//! - **Export**: Tar snapshots of a package for inspection.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod codec;
pub mod export;
pub mod hash;
pub mod store;
pub mod tree;
pub mod unit;
