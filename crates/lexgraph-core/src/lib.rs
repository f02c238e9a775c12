//! LexGraph Core - pure document pipeline kernel
//!
//! This crate provides the domain logic of the statute pipeline:
//! - Document identity and encoding normalization
//! - Versioned content fingerprints and the fingerprint store boundary
//! - Drift classification with best-effort change summaries
//! - The shared structural grammar of source and translated statutes
//! - Conversion to an ELI legal graph with N-Triples and JSON-LD output
//! - A read-only structural query engine and its query battery
//!
//! Nothing here touches the filesystem or the network; persistence and
//! retrieval sit behind the [`fingerprint::FingerprintStore`] and
//! [`artifacts::ArtifactSink`] traits.

pub mod artifacts;
pub mod convert;
pub mod diff;
pub mod errors;
pub mod fingerprint;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod query;
pub mod structure;
pub mod validate;

// Re-export commonly used types
pub use artifacts::{ArtifactSink, InMemoryArtifacts};
pub use convert::Converter;
pub use diff::{classify, Classification, DiffResult};
pub use errors::{ErrorRecord, ExError, ExErrorKind, LexGraphError, Result};
pub use fingerprint::{Fingerprint, FingerprintRecord, FingerprintStore, HashAlgorithm, StoreWarning};
pub use graph::{GraphFormat, LegalGraph};
pub use model::{DocumentId, DocumentVariant, Language, NormalizedDocument, RawDocument};
pub use normalize::Normalizer;
pub use query::{QueryHarness, QueryReport};
pub use validate::{RequiredElementsValidator, SchemaValidator, ValidationVerdict};
