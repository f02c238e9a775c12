//! Content fingerprints and the fingerprint store boundary.
//!
//! A fingerprint is a versioned digest of normalized bytes. Fingerprints from
//! different algorithm versions are never compared; stores drop records of a
//! foreign algorithm at load time and report it as a warning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{LexGraphError, Result};
use crate::model::DocumentId;

/// Versioned hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// Lowercase hex SHA-256 over the normalized bytes
    Sha256V1,
}

impl HashAlgorithm {
    /// Algorithm used for every new fingerprint
    pub const CURRENT: HashAlgorithm = HashAlgorithm::Sha256V1;

    pub fn id(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256V1 => "sha256/v1",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HashAlgorithm {
    type Err = LexGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256/v1" => Ok(HashAlgorithm::Sha256V1),
            other => Err(LexGraphError::UnsupportedHashAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }
}

impl Serialize for HashAlgorithm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for HashAlgorithm {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Digest of one normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl Fingerprint {
    /// Compute the fingerprint of `bytes` with the current algorithm.
    pub fn compute(bytes: &[u8]) -> Self {
        Self::compute_with(HashAlgorithm::CURRENT, bytes)
    }

    pub fn compute_with(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        let hex = match algorithm {
            HashAlgorithm::Sha256V1 => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                hex::encode(hasher.finalize())
            }
        };
        Self { algorithm, hex }
    }

    /// Shortened digest for human-facing reports
    pub fn short(&self) -> &str {
        &self.hex[..self.hex.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Last accepted state of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub id: DocumentId,
    pub fingerprint: Fingerprint,
    pub recorded_at: DateTime<Utc>,
}

impl FingerprintRecord {
    pub fn new(id: DocumentId, fingerprint: Fingerprint) -> Self {
        Self {
            id,
            fingerprint,
            recorded_at: Utc::now(),
        }
    }
}

/// Non-fatal problems found while loading persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreWarning {
    /// Store unreadable or unparsable; every document is treated as new
    Corrupt { reason: String },
    /// Record hashed with another algorithm; dropped
    AlgorithmMismatch {
        doc_id: String,
        stored: String,
        expected: String,
    },
    /// Store written by an unknown format version; ignored wholesale
    UnsupportedFormatVersion { found: u32, supported: u32 },
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreWarning::Corrupt { reason } => {
                write!(f, "fingerprint store unreadable, treating all documents as new: {reason}")
            }
            StoreWarning::AlgorithmMismatch {
                doc_id,
                stored,
                expected,
            } => write!(
                f,
                "dropped prior fingerprint for {doc_id}: stored with {stored}, expected {expected}"
            ),
            StoreWarning::UnsupportedFormatVersion { found, supported } => write!(
                f,
                "fingerprint store format version {found} unsupported (expected {supported}); ignoring prior state"
            ),
        }
    }
}

/// Persistent mapping document identity → last accepted fingerprint.
///
/// `commit` only stages a replacement; nothing reaches durable storage until
/// `flush`, which writes the whole mapping at once.
pub trait FingerprintStore {
    /// Prior record for `id`, if one was loaded or committed.
    fn record_for(&self, id: &DocumentId) -> Option<FingerprintRecord>;

    /// Stage `fingerprint` as the accepted state of `id`, replacing any prior record.
    fn commit(&mut self, id: &DocumentId, fingerprint: Fingerprint);

    /// Persist all staged commits.
    ///
    /// # Errors
    /// Implementation-specific persistence failures.
    fn flush(&mut self) -> std::result::Result<(), crate::errors::ExError>;

    /// Warnings raised while loading prior state.
    fn warnings(&self) -> &[StoreWarning];
}

/// In-memory store, used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFingerprintStore {
    records: BTreeMap<DocumentId, FingerprintRecord>,
    staged: BTreeMap<DocumentId, FingerprintRecord>,
    warnings: Vec<StoreWarning>,
    flushes: usize,
}

impl InMemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if it had been loaded from durable state.
    pub fn with_record(mut self, record: FingerprintRecord) -> Self {
        self.records.insert(record.id.clone(), record);
        self
    }

    pub fn with_warning(mut self, warning: StoreWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Records as they would be persisted (flushed state only)
    pub fn persisted(&self) -> &BTreeMap<DocumentId, FingerprintRecord> {
        &self.records
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl FingerprintStore for InMemoryFingerprintStore {
    fn record_for(&self, id: &DocumentId) -> Option<FingerprintRecord> {
        self.staged
            .get(id)
            .or_else(|| self.records.get(id))
            .cloned()
    }

    fn commit(&mut self, id: &DocumentId, fingerprint: Fingerprint) {
        self.staged
            .insert(id.clone(), FingerprintRecord::new(id.clone(), fingerprint));
    }

    fn flush(&mut self) -> std::result::Result<(), crate::errors::ExError> {
        self.records.append(&mut self.staged);
        self.flushes += 1;
        Ok(())
    }

    fn warnings(&self) -> &[StoreWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;

    #[test]
    fn test_compute_is_deterministic() {
        let a = Fingerprint::compute(b"<Law/>\n");
        let b = Fingerprint::compute(b"<Law/>\n");
        assert_eq!(a, b);
        assert_eq!(a.hex.len(), 64);
        assert!(a.to_string().starts_with("sha256/v1:"));
    }

    #[test]
    fn test_compute_known_vector() {
        let fp = Fingerprint::compute(b"");
        assert_eq!(
            fp.hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_algorithm_parse_rejects_unknown() {
        assert!("md5/v1".parse::<HashAlgorithm>().is_err());
        assert_eq!(
            "sha256/v1".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256V1
        );
    }

    #[test]
    fn test_in_memory_commit_is_staged_until_flush() {
        let id = DocumentId::new("radio-act", Language::Ja);
        let mut store = InMemoryFingerprintStore::new();
        store.commit(&id, Fingerprint::compute(b"one"));

        assert!(store.persisted().is_empty());
        assert_eq!(store.staged_count(), 1);
        assert!(store.record_for(&id).is_some());

        store.flush().unwrap();
        assert_eq!(store.persisted().len(), 1);
        assert_eq!(store.staged_count(), 0);
    }

    #[test]
    fn test_commit_replaces_prior_record() {
        let id = DocumentId::new("radio-act", Language::En);
        let mut store = InMemoryFingerprintStore::new()
            .with_record(FingerprintRecord::new(id.clone(), Fingerprint::compute(b"old")));
        store.commit(&id, Fingerprint::compute(b"new"));
        store.flush().unwrap();

        let record = store.record_for(&id).unwrap();
        assert_eq!(record.fingerprint, Fingerprint::compute(b"new"));
        assert_eq!(store.persisted().len(), 1);
    }

    #[test]
    fn test_fingerprint_serializes_algorithm_id() {
        let json = serde_json::to_value(Fingerprint::compute(b"x")).unwrap();
        assert_eq!(json["algorithm"], "sha256/v1");
    }
}
