//! # rtcstats-compression
//!
//! Delta compression for periodic stats samples. Consecutive snapshots of a
//! peer connection's report collection mostly repeat themselves; only the
//! fields that changed since the previous sample are shipped.

pub mod compressor;
pub mod delta;

pub use compressor::DeltaCompressor;
pub use delta::{apply_delta, diff};
