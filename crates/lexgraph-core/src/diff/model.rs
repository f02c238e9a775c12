//! Diff output types.
//!
//! Collections are sorted `Vec`s so serialized reports are deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fingerprint::Fingerprint;
use crate::model::DocumentId;

/// Drift classification of one document against its last accepted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// No prior record exists
    New,
    /// Prior record exists with an equal fingerprint
    Unchanged,
    /// Prior record exists with a different fingerprint
    Changed,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::New => "NEW",
            Classification::Unchanged => "UNCHANGED",
            Classification::Changed => "CHANGED",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub id: DocumentId,
    pub classification: Classification,
    pub prior: Option<Fingerprint>,
    pub prior_recorded_at: Option<DateTime<Utc>>,
    pub current: Fingerprint,
    /// Advisory; never influences `classification`
    pub summary: Option<ChangeSummary>,
}

impl DiffResult {
    pub fn with_summary(mut self, summary: ChangeSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn is_changed(&self) -> bool {
        self.classification == Classification::Changed
    }
}

/// Before/after of one metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFieldChange {
    pub field: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Best-effort description of what changed between two versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub metadata_changes: Vec<MetadataFieldChange>,
    /// Structural paths present only in the current version
    pub added_articles: Vec<String>,
    /// Structural paths present only in the prior version
    pub removed_articles: Vec<String>,
    /// Paths present in both whose label, caption or text differ
    pub changed_articles: Vec<String>,
    /// Why a structural summary could not be produced
    pub note: Option<String>,
}

impl ChangeSummary {
    pub fn unavailable(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metadata_changes.is_empty()
            && self.added_articles.is_empty()
            && self.removed_articles.is_empty()
            && self.changed_articles.is_empty()
    }
}
