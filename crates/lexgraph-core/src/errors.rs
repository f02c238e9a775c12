use lexgraph_core_types::RunId;
use thiserror::Error;

/// Result type alias using LexGraphError
pub type Result<T> = std::result::Result<T, LexGraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the pipeline. Each kind maps to a stable error code that can be
/// used for programmatic handling, reports and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExErrorKind {
    // Document-scoped pipeline failures
    /// Remote or local retrieval failed; the document is unavailable this run
    Retrieval,
    /// No candidate encoding decoded the raw bytes cleanly
    Encoding,
    /// Schema validation verdict was negative (reported, not fatal)
    Validation,
    /// The document violates the structural grammar
    StructuralMapping,
    /// A structural query could not be parsed or evaluated
    QueryExecution,

    // Fingerprint state
    /// Persisted fingerprint state was unreadable (degrades to "no prior state")
    StoreCorruption,
    /// Two fingerprints computed by different algorithms were compared
    HashAlgorithmMismatch,

    // Input
    InvalidInput,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Timeout,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Retrieval => "ERR_RETRIEVAL",
            ExErrorKind::Encoding => "ERR_ENCODING",
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::StructuralMapping => "ERR_STRUCTURAL_MAPPING",
            ExErrorKind::QueryExecution => "ERR_QUERY_EXECUTION",
            ExErrorKind::StoreCorruption => "ERR_STORE_CORRUPTION",
            ExErrorKind::HashAlgorithmMismatch => "ERR_HASH_ALGORITHM_MISMATCH",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind stops the pipeline for its document.
    ///
    /// Validation verdicts, store corruption and query failures are reported
    /// but downstream stages keep running.
    pub fn is_fatal_for_document(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::Validation | ExErrorKind::StoreCorruption | ExErrorKind::QueryExecution
        )
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and enough context
/// (document, stage, position) to diagnose a failure from the report alone.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    doc_id: Option<String>,
    stage: Option<String>,
    position: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            doc_id: None,
            stage: None,
            position: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add document identity context
    pub fn with_doc_id(mut self, id: impl Into<String>) -> Self {
        self.doc_id = Some(id.into());
        self
    }

    /// Add pipeline stage context
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Add structural position context (path and/or line:column)
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Add run correlation context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the document identity context, if any
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    /// Get the pipeline stage context, if any
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// Get the structural position context, if any
    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(doc_id) = &self.doc_id {
            write!(f, " (document: {})", doc_id)?;
        }
        if let Some(stage) = &self.stage {
            write!(f, " (stage: {})", stage)?;
        }
        if let Some(position) = &self.position {
            write!(f, " (position: {})", position)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Serializable snapshot of an [`ExError`] for reports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorRecord {
    pub code: String,
    pub kind: ExErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub message: String,
}

impl From<&ExError> for ErrorRecord {
    fn from(err: &ExError) -> Self {
        Self {
            code: err.code().to_string(),
            kind: err.kind(),
            op: err.op.clone(),
            doc_id: err.doc_id.clone(),
            stage: err.stage.clone(),
            position: err.position.clone(),
            message: err.to_string(),
        }
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for LexGraph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexGraphError {
    /// Retrieval of the raw document failed
    #[error("Retrieval failed for {doc_id}: {reason}")]
    Retrieval { doc_id: String, reason: String },

    /// None of the candidate encodings decoded the raw bytes
    #[error("No candidate encoding decodes {doc_id} cleanly (tried: {tried})")]
    Encoding { doc_id: String, tried: String },

    /// A structural node appears where the grammar does not allow it
    #[error("Structural mapping failed for {doc_id} at {position}: {reason}")]
    StructuralMapping {
        doc_id: String,
        position: String,
        reason: String,
    },

    /// The document could not be parsed as XML at all
    #[error("Document {doc_id} is not well-formed XML: {reason}")]
    MalformedXml { doc_id: String, reason: String },

    /// A structural query is syntactically invalid
    #[error("Query '{query}' is malformed: {reason}")]
    MalformedQuery { query: String, reason: String },

    /// Fingerprints from different hash algorithms were compared
    #[error("Hash algorithm mismatch for {doc_id}: prior {prior}, current {current}")]
    HashAlgorithmMismatch {
        doc_id: String,
        prior: String,
        current: String,
    },

    /// Unknown hash algorithm identifier
    #[error("Unsupported hash algorithm: {algorithm}")]
    UnsupportedHashAlgorithm { algorithm: String },

    /// Document identity string did not parse
    #[error("Invalid document identity: {value}")]
    InvalidDocumentId { value: String },

    // ===== Serialization Errors =====
    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // ===== Internal Errors =====
    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<LexGraphError> for ExError {
    fn from(err: LexGraphError) -> Self {
        let message = err.to_string();
        match err {
            LexGraphError::Retrieval { doc_id, .. } => ExError::new(ExErrorKind::Retrieval)
                .with_doc_id(doc_id)
                .with_message(message),
            LexGraphError::Encoding { doc_id, .. } => ExError::new(ExErrorKind::Encoding)
                .with_doc_id(doc_id)
                .with_message(message),
            LexGraphError::StructuralMapping {
                doc_id, position, ..
            } => ExError::new(ExErrorKind::StructuralMapping)
                .with_doc_id(doc_id)
                .with_position(position)
                .with_message(message),
            LexGraphError::MalformedXml { doc_id, .. } => {
                ExError::new(ExErrorKind::StructuralMapping)
                    .with_doc_id(doc_id)
                    .with_message(message)
            }
            LexGraphError::MalformedQuery { .. } => {
                ExError::new(ExErrorKind::QueryExecution).with_message(message)
            }
            LexGraphError::HashAlgorithmMismatch { doc_id, .. } => {
                ExError::new(ExErrorKind::HashAlgorithmMismatch)
                    .with_doc_id(doc_id)
                    .with_message(message)
            }
            LexGraphError::UnsupportedHashAlgorithm { .. } => {
                ExError::new(ExErrorKind::HashAlgorithmMismatch).with_message(message)
            }
            LexGraphError::InvalidDocumentId { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            LexGraphError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            LexGraphError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for LexGraphError {
    fn from(err: serde_json::Error) -> Self {
        LexGraphError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ExErrorKind::Encoding.code(), "ERR_ENCODING");
        assert_eq!(
            ExErrorKind::StructuralMapping.code(),
            "ERR_STRUCTURAL_MAPPING"
        );
        assert_eq!(ExErrorKind::StoreCorruption.code(), "ERR_STORE_CORRUPTION");
    }

    #[test]
    fn test_fatality_per_kind() {
        assert!(ExErrorKind::Encoding.is_fatal_for_document());
        assert!(ExErrorKind::StructuralMapping.is_fatal_for_document());
        assert!(!ExErrorKind::Validation.is_fatal_for_document());
        assert!(!ExErrorKind::QueryExecution.is_fatal_for_document());
        assert!(!ExErrorKind::StoreCorruption.is_fatal_for_document());
    }

    #[test]
    fn test_structural_error_conversion_keeps_position() {
        let err = LexGraphError::StructuralMapping {
            doc_id: "radio-act:en".to_string(),
            position: "/Law/LawBody/MainProvision/Item[1]".to_string(),
            reason: "item outside paragraph".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::StructuralMapping);
        assert_eq!(ex.doc_id(), Some("radio-act:en"));
        assert_eq!(ex.position(), Some("/Law/LawBody/MainProvision/Item[1]"));
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::Encoding)
            .with_op("normalize")
            .with_doc_id("radio-act:ja")
            .with_stage("normalize")
            .with_message("no encoding matched");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_ENCODING] in operation 'normalize'"));
        assert!(rendered.contains("(document: radio-act:ja)"));
        assert!(rendered.contains("(stage: normalize)"));
    }

    #[test]
    fn test_error_record_from_ex_error() {
        let err = ExError::new(ExErrorKind::Retrieval)
            .with_doc_id("radio-act:en")
            .with_message("timeout");
        let record = ErrorRecord::from(&err);
        assert_eq!(record.code, "ERR_RETRIEVAL");
        assert_eq!(record.doc_id.as_deref(), Some("radio-act:en"));
    }
}
