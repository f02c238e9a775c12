//! JSON-file fingerprint store.
//!
//! The whole mapping lives in one file, read at open and written wholesale
//! by `flush`:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "hash_algorithm": "sha256/v1",
//!   "records": {
//!     "radio-act:ja": { "hash": "…", "recorded_at": "2025-06-01T00:00:00Z" }
//!   }
//! }
//! ```
//!
//! Unreadable state never aborts a run: it degrades to "no prior record"
//! and is reported through [`FingerprintStore::warnings`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use lexgraph_core::fingerprint::{
    Fingerprint, FingerprintRecord, FingerprintStore, HashAlgorithm, StoreWarning,
};
use lexgraph_core::model::DocumentId;

use crate::atomic::atomic_write;
use crate::errors::{flush_failed, serialization_error, Result};

/// Store file layout version
pub const FORMAT_VERSION: u32 = 1;

/// Default file name inside the output directory
pub const STORE_FILE_NAME: &str = "fingerprints.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    hash_algorithm: String,
    #[serde(default)]
    records: BTreeMap<String, StoredRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    /// Per-record override of the file-level algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    algorithm: Option<String>,
    hash: String,
    recorded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct JsonFingerprintStore {
    path: PathBuf,
    records: BTreeMap<DocumentId, FingerprintRecord>,
    staged: BTreeMap<DocumentId, FingerprintRecord>,
    warnings: Vec<StoreWarning>,
}

impl JsonFingerprintStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut warnings = Vec::new();
        let records = match std::fs::read(&path) {
            Ok(bytes) => load(&bytes, &mut warnings),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warnings.push(StoreWarning::Corrupt {
                    reason: format!("{}: {}", path.display(), e),
                });
                BTreeMap::new()
            }
        };

        for warning in &warnings {
            warn!(store = %path.display(), "{warning}");
        }
        debug!(store = %path.display(), records = records.len(), "fingerprint store loaded");

        Self {
            path,
            records,
            staged: BTreeMap::new(),
            warnings,
        }
    }

    /// Open `fingerprints.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

fn to_file(records: &BTreeMap<DocumentId, FingerprintRecord>) -> StoreFile {
    let records = records
        .iter()
        .map(|(id, record)| {
            (
                id.to_string(),
                StoredRecord {
                    algorithm: None,
                    hash: record.fingerprint.hex.clone(),
                    recorded_at: record.recorded_at,
                },
            )
        })
        .collect();
    StoreFile {
        format_version: FORMAT_VERSION,
        hash_algorithm: HashAlgorithm::CURRENT.id().to_string(),
        records,
    }
}

fn load(bytes: &[u8], warnings: &mut Vec<StoreWarning>) -> BTreeMap<DocumentId, FingerprintRecord> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(StoreWarning::Corrupt {
                reason: e.to_string(),
            });
            return BTreeMap::new();
        }
    };

    let found = value
        .get("format_version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    if found != u64::from(FORMAT_VERSION) {
        warnings.push(StoreWarning::UnsupportedFormatVersion {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            supported: FORMAT_VERSION,
        });
        return BTreeMap::new();
    }

    let file: StoreFile = match serde_json::from_value(value) {
        Ok(f) => f,
        Err(e) => {
            warnings.push(StoreWarning::Corrupt {
                reason: e.to_string(),
            });
            return BTreeMap::new();
        }
    };

    let mut records = BTreeMap::new();
    for (key, stored) in file.records {
        let id: DocumentId = match key.parse() {
            Ok(id) => id,
            Err(e) => {
                warnings.push(StoreWarning::Corrupt {
                    reason: format!("record {key}: {e}"),
                });
                continue;
            }
        };
        let algorithm_id = stored.algorithm.as_deref().unwrap_or(&file.hash_algorithm);
        let algorithm = match algorithm_id.parse::<HashAlgorithm>() {
            Ok(a) if a == HashAlgorithm::CURRENT => a,
            _ => {
                warnings.push(StoreWarning::AlgorithmMismatch {
                    doc_id: id.to_string(),
                    stored: algorithm_id.to_string(),
                    expected: HashAlgorithm::CURRENT.id().to_string(),
                });
                continue;
            }
        };
        records.insert(
            id.clone(),
            FingerprintRecord {
                id,
                fingerprint: Fingerprint {
                    algorithm,
                    hex: stored.hash,
                },
                recorded_at: stored.recorded_at,
            },
        );
    }
    records
}

impl FingerprintStore for JsonFingerprintStore {
    fn record_for(&self, id: &DocumentId) -> Option<FingerprintRecord> {
        self.staged
            .get(id)
            .or_else(|| self.records.get(id))
            .cloned()
    }

    fn commit(&mut self, id: &DocumentId, fingerprint: Fingerprint) {
        debug!(doc_id = %id, fingerprint = %fingerprint, "fingerprint staged");
        self.staged
            .insert(id.clone(), FingerprintRecord::new(id.clone(), fingerprint));
    }

    /// Write every record, including staged ones, in one atomic replace.
    /// Nothing is written when nothing was staged.
    fn flush(&mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut merged = self.records.clone();
        merged.extend(self.staged.iter().map(|(k, v)| (k.clone(), v.clone())));

        let body = serde_json::to_string_pretty(&to_file(&merged))
            .map_err(|e| flush_failed(&self.path, serialization_error("serialize_fingerprints", e)))?;
        atomic_write(&self.path, body.as_bytes()).map_err(|e| flush_failed(&self.path, e))?;

        debug!(store = %self.path.display(), committed = self.staged.len(), "fingerprint store flushed");
        self.records = merged;
        self.staged.clear();
        Ok(())
    }

    fn warnings(&self) -> &[StoreWarning] {
        &self.warnings
    }
}
