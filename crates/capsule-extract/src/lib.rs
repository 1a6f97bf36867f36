//! # capsule-extract
//!
//! Extraction engine that turns one compilation request into a replay
//! package.
//!
//! Handles:
//! - **Driver**: Runs the front-end through analysis and code generation in
//!   an invocation-local scratch directory.
//! - **Classify**: Maps every touched file to a virtual path and infers the
//!   minimal search path roots.
//! - **On-demand**: Forces one real touch per wildcard-imported package.
//! - **Accumulator**: First-write-wins content collection.
//! - **Unused**: Declared archive dependencies nothing was read from.
//! - **Assemble**: The final, canonically ordered descriptor.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod accumulator;
pub mod assemble;
pub mod classify;
pub mod driver;
pub mod extractor;
pub mod frontend;
pub mod on_demand;
pub mod request;
pub mod results;
pub mod unused;
pub mod uri;

pub use extractor::Extractor;
pub use request::{CompilationRequest, CompilationRequestBuilder};
