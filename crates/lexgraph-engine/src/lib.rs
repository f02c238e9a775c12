//! LexGraph Engine - Orchestration layer
//!
//! Drives documents through retrieval, normalization, validation,
//! fingerprinting, drift detection, conversion and query testing, and
//! coordinates the store and artifact sinks around them.

pub mod pipeline;
pub mod report;
pub mod retrieval;

pub use pipeline::{Pipeline, RunOptions};
pub use report::{DocumentOutcome, RunReport};
pub use retrieval::{retrieve_all, unpack, DocumentRequest, FileRetriever, Retriever};
