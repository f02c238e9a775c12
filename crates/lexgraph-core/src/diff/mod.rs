//! Drift detection.
//!
//! Classifies each document as NEW, UNCHANGED or CHANGED against the last
//! accepted fingerprint, and optionally explains a change structurally.
//!
//! ## Entry point
//!
//! ```ignore
//! use lexgraph_core::diff::{classify, render_human_summary, summarize};
//!
//! let mut result = classify(&store, doc.id(), &fingerprint)?;
//! if let Some(prior) = sink.prior_normalized(doc.id()) {
//!     result = result.with_summary(summarize(&prior, &doc));
//! }
//! println!("{}", render_human_summary(&[result]));
//! ```
//!
//! ## Guarantees
//!
//! - **Read-only**: classification never commits to the store; the pipeline
//!   commits only after every fatal stage has succeeded.
//! - **Comparable digests only**: fingerprints of different algorithms are
//!   rejected with `HashAlgorithmMismatch`, never compared.
//! - **Advisory summaries**: a summary that cannot be computed degrades to a
//!   note and never changes the classification.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{classify, compare_structures, summarize};
pub use human_summary::render_human_summary;
pub use model::{ChangeSummary, Classification, DiffResult, MetadataFieldChange};
