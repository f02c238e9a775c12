//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Document identifiers
pub const FIELD_DOC_ID: &str = "doc_id";
pub const FIELD_STAGE: &str = "stage";

// Sizes
pub const FIELD_BYTES_LEN: &str = "bytes_len";
pub const FIELD_TRIPLE_COUNT: &str = "triple_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Pipeline stage names
pub const STAGE_RETRIEVE: &str = "retrieve";
pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_VALIDATE: &str = "validate";
pub const STAGE_FINGERPRINT: &str = "fingerprint";
pub const STAGE_DIFF: &str = "diff";
pub const STAGE_CONVERT: &str = "convert";
pub const STAGE_QUERY: &str = "query";
pub const STAGE_PERSIST: &str = "persist";
pub const STAGE_COMMIT: &str = "commit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_DOC_ID.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_stage_names_are_distinct() {
        let stages = [
            STAGE_RETRIEVE,
            STAGE_NORMALIZE,
            STAGE_VALIDATE,
            STAGE_FINGERPRINT,
            STAGE_DIFF,
            STAGE_CONVERT,
            STAGE_QUERY,
            STAGE_PERSIST,
            STAGE_COMMIT,
        ];
        let unique: std::collections::BTreeSet<_> = stages.iter().collect();
        assert_eq!(unique.len(), stages.len());
    }
}
