//! LexGraph Store - Filesystem persistence for pipeline state and artifacts
//!
//! Provides:
//! - `JsonFingerprintStore`: the fingerprint mapping as one JSON file,
//!   written wholesale with temp→rename
//! - `FsArtifactStore`: normalized documents, graphs and reports under one
//!   output directory

mod atomic;
pub mod artifacts;
pub mod errors;
pub mod fingerprints;

// Re-export key types
pub use artifacts::FsArtifactStore;
pub use errors::Result;
pub use fingerprints::{JsonFingerprintStore, STORE_FILE_NAME};
