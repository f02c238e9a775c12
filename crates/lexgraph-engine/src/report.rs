//! Run report: what happened to each document in one batch pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lexgraph_core::diff::{Classification, DiffResult};
use lexgraph_core::errors::{ErrorRecord, ExError};
use lexgraph_core::fingerprint::{Fingerprint, StoreWarning};
use lexgraph_core::graph::GraphStats;
use lexgraph_core::model::DocumentId;
use lexgraph_core::query::QueryReport;
use lexgraph_core::validate::ValidationVerdict;
use lexgraph_core_types::RunId;

/// Outcome of one document's pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub id: DocumentId,
    pub source_encoding: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub validation: Option<ValidationVerdict>,
    pub diff: Option<DiffResult>,
    pub graph: Option<GraphStats>,
    pub queries: Option<QueryReport>,
    /// Every error raised for this document, fatal or not, in stage order
    pub errors: Vec<ErrorRecord>,
    /// Whether the fingerprint was staged for the store
    pub committed: bool,
}

impl DocumentOutcome {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            source_encoding: None,
            fingerprint: None,
            validation: None,
            diff: None,
            graph: None,
            queries: None,
            errors: Vec::new(),
            committed: false,
        }
    }

    pub fn record_error(&mut self, err: &ExError) {
        self.errors.push(ErrorRecord::from(err));
    }

    /// No stage failed with an error that stops the document.
    pub fn succeeded(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.kind.is_fatal_for_document())
    }

    pub fn classification(&self) -> Option<Classification> {
        self.diff.as_ref().map(|d| d.classification)
    }

    pub fn queries_passed(&self) -> bool {
        self.queries.as_ref().map_or(true, QueryReport::all_passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub documents: Vec<DocumentOutcome>,
    pub store_warnings: Vec<StoreWarning>,
    /// Translation links written for a source/translation pair
    pub links_written: bool,
    /// Run-level errors: store corruption (non-fatal), store flush and
    /// report writing failures
    pub errors: Vec<ErrorRecord>,
}

impl RunReport {
    pub fn document(&self, id: &DocumentId) -> Option<&DocumentOutcome> {
        self.documents.iter().find(|d| &d.id == id)
    }

    pub fn all_succeeded(&self) -> bool {
        !self.errors.iter().any(|e| e.kind.is_fatal_for_document())
            && self.documents.iter().all(DocumentOutcome::succeeded)
    }

    pub fn any_changed(&self) -> bool {
        self.documents
            .iter()
            .any(|d| d.classification() == Some(Classification::Changed))
    }

    pub fn all_queries_passed(&self) -> bool {
        self.documents.iter().all(DocumentOutcome::queries_passed)
    }

    /// Process exit code: 1 on any failure (or on change when requested).
    pub fn exit_code(&self, fail_on_change: bool) -> i32 {
        if !self.all_succeeded() || !self.all_queries_passed() || (fail_on_change && self.any_changed()) {
            1
        } else {
            0
        }
    }

    /// Diff results of this run, in document order.
    pub fn diff_results(&self) -> Vec<DiffResult> {
        self.documents.iter().filter_map(|d| d.diff.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgraph_core::errors::ExErrorKind;
    use lexgraph_core::model::Language;

    fn report(documents: Vec<DocumentOutcome>) -> RunReport {
        RunReport {
            run_id: RunId::from_string("run-1".to_string()),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            documents,
            store_warnings: Vec::new(),
            links_written: false,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_non_fatal_errors_keep_document_successful() {
        let mut outcome = DocumentOutcome::new(DocumentId::new("radio-act", Language::Ja));
        outcome.record_error(&ExError::new(ExErrorKind::Validation).with_message("missing LawNum"));
        assert!(outcome.succeeded());

        outcome.record_error(&ExError::new(ExErrorKind::StructuralMapping));
        assert!(!outcome.succeeded());
        assert_eq!(report(vec![outcome]).exit_code(false), 1);
    }

    #[test]
    fn test_store_corruption_alone_does_not_fail_the_run() {
        let mut report = report(vec![DocumentOutcome::new(DocumentId::new("radio-act", Language::Ja))]);
        report.errors.push(ErrorRecord::from(
            &ExError::new(ExErrorKind::StoreCorruption).with_message("unreadable"),
        ));
        assert!(report.all_succeeded());
        assert_eq!(report.exit_code(false), 0);

        report
            .errors
            .push(ErrorRecord::from(&ExError::new(ExErrorKind::Persistence)));
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_fail_on_change() {
        let mut outcome = DocumentOutcome::new(DocumentId::new("radio-act", Language::En));
        outcome.diff = Some(DiffResult {
            id: outcome.id.clone(),
            classification: Classification::Changed,
            prior: Some(Fingerprint::compute(b"a")),
            prior_recorded_at: None,
            current: Fingerprint::compute(b"b"),
            summary: None,
        });
        let report = report(vec![outcome]);
        assert_eq!(report.exit_code(false), 0);
        assert_eq!(report.exit_code(true), 1);
    }
}
