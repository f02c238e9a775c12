//! Drift classification and change summaries.
//!
//! [`classify`] is the contract: it reads the store and never writes it.
//! [`summarize`] is advisory and may be skipped entirely.

use std::collections::{BTreeMap, BTreeSet};

use crate::diff::model::{ChangeSummary, Classification, DiffResult, MetadataFieldChange};
use crate::errors::{ExError, LexGraphError};
use crate::fingerprint::{Fingerprint, FingerprintStore};
use crate::model::{DocumentId, NormalizedDocument};
use crate::structure::{self, DocumentStructure};
use lexgraph_core_types::schema::STAGE_DIFF;

/// Classify `current` against the store's prior record for `id`.
///
/// # Errors
///
/// - `HashAlgorithmMismatch`: the prior record was produced by a different
///   hash algorithm; the two digests are not comparable
pub fn classify(
    store: &dyn FingerprintStore,
    id: &DocumentId,
    current: &Fingerprint,
) -> Result<DiffResult, ExError> {
    let prior = store.record_for(id);

    let classification = match &prior {
        None => Classification::New,
        Some(record) if record.fingerprint.algorithm != current.algorithm => {
            return Err(ExError::from(LexGraphError::HashAlgorithmMismatch {
                doc_id: id.to_string(),
                prior: record.fingerprint.algorithm.to_string(),
                current: current.algorithm.to_string(),
            })
            .with_op("classify")
            .with_stage(STAGE_DIFF));
        }
        Some(record) if record.fingerprint.hex == current.hex => Classification::Unchanged,
        Some(_) => Classification::Changed,
    };

    Ok(DiffResult {
        id: id.clone(),
        classification,
        prior_recorded_at: prior.as_ref().map(|r| r.recorded_at),
        prior: prior.map(|r| r.fingerprint),
        current: current.clone(),
        summary: None,
    })
}

/// Structural change summary between the prior normalized text and `current`.
///
/// Never fails: if either side cannot be parsed, the summary carries a note.
pub fn summarize(prior_text: &str, current: &NormalizedDocument) -> ChangeSummary {
    let prior = match structure::parse_str(current.id(), prior_text) {
        Ok(s) => s,
        Err(e) => return ChangeSummary::unavailable(format!("prior version not parsable: {e}")),
    };
    let now = match structure::parse(current) {
        Ok(s) => s,
        Err(e) => return ChangeSummary::unavailable(format!("current version not parsable: {e}")),
    };
    compare_structures(&prior, &now)
}

pub fn compare_structures(prior: &DocumentStructure, current: &DocumentStructure) -> ChangeSummary {
    let metadata_changes = prior
        .metadata
        .fields()
        .into_iter()
        .zip(current.metadata.fields())
        .filter(|((_, before), (_, after))| before != after)
        .map(|((field, before), (_, after))| MetadataFieldChange {
            field: field.to_string(),
            before,
            after,
        })
        .collect();

    let fingerprint_articles = |s: &DocumentStructure| -> BTreeMap<String, (String, Option<String>, Option<String>)> {
        s.articles()
            .into_iter()
            .map(|(path, node)| (path, (node.label.clone(), node.title.clone(), node.text.clone())))
            .collect()
    };
    let before = fingerprint_articles(prior);
    let after = fingerprint_articles(current);

    let (added_articles, removed_articles) = set_delta(&before, &after);
    let changed_articles = before
        .iter()
        .filter_map(|(path, old)| match after.get(path) {
            Some(new) if new != old => Some(path.clone()),
            _ => None,
        })
        .collect();

    ChangeSummary {
        metadata_changes,
        added_articles,
        removed_articles,
        changed_articles,
        note: None,
    }
}

/// `(added, removed)`: keys only in `b`, keys only in `a`.
fn set_delta<V>(a: &BTreeMap<String, V>, b: &BTreeMap<String, V>) -> (Vec<String>, Vec<String>) {
    let keys_a: BTreeSet<&String> = a.keys().collect();
    let keys_b: BTreeSet<&String> = b.keys().collect();
    let added = keys_b.difference(&keys_a).map(|k| (*k).clone()).collect();
    let removed = keys_a.difference(&keys_b).map(|k| (*k).clone()).collect();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::fingerprint::{FingerprintRecord, InMemoryFingerprintStore};
    use crate::model::{Language, RawDocument};
    use crate::normalize::normalize;

    fn id() -> DocumentId {
        DocumentId::new("radio-act", Language::Ja)
    }

    #[test]
    fn test_new_without_prior_record() {
        let store = InMemoryFingerprintStore::new();
        let result = classify(&store, &id(), &Fingerprint::compute(b"a")).unwrap();
        assert_eq!(result.classification, Classification::New);
        assert!(result.prior.is_none());
    }

    #[test]
    fn test_unchanged_and_changed() {
        let store = InMemoryFingerprintStore::new()
            .with_record(FingerprintRecord::new(id(), Fingerprint::compute(b"a")));
        let same = classify(&store, &id(), &Fingerprint::compute(b"a")).unwrap();
        let different = classify(&store, &id(), &Fingerprint::compute(b"b")).unwrap();
        assert_eq!(same.classification, Classification::Unchanged);
        assert_eq!(different.classification, Classification::Changed);
        assert_eq!(different.prior, Some(Fingerprint::compute(b"a")));
    }

    #[test]
    fn test_classify_does_not_commit() {
        let store = InMemoryFingerprintStore::new();
        classify(&store, &id(), &Fingerprint::compute(b"a")).unwrap();
        assert!(store.record_for(&id()).is_none());
        assert_eq!(store.staged_count(), 0);
    }

    #[test]
    fn test_foreign_algorithm_record_is_rejected_when_deserialized() {
        let err = serde_json::from_value::<FingerprintRecord>(serde_json::json!({
            "id": "radio-act:ja",
            "fingerprint": { "algorithm": "blake3/v1", "hex": "00" },
            "recorded_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("blake3/v1"));
    }

    #[test]
    fn test_summary_lists_article_changes() {
        let prior = r#"<Law><LawNum>No. 1</LawNum><LawBody><LawTitle>旧</LawTitle><MainProvision>
<Article Num="1"><Paragraph Num="1"><ParagraphSentence><Sentence>a</Sentence></ParagraphSentence></Paragraph></Article>
<Article Num="2"><Paragraph Num="1"><ParagraphSentence><Sentence>b</Sentence></ParagraphSentence></Paragraph></Article>
</MainProvision></LawBody></Law>"#;
        let current = r#"<Law><LawNum>No. 1</LawNum><LawBody><LawTitle>新</LawTitle><MainProvision>
<Article Num="1"><Paragraph Num="1"><ParagraphSentence><Sentence>a2</Sentence></ParagraphSentence></Paragraph></Article>
</MainProvision></LawBody></Law>"#;
        let doc = normalize(&RawDocument::new(id(), current.as_bytes().to_vec())).unwrap();
        let summary = summarize(prior, &doc);

        assert_eq!(summary.changed_articles, vec!["article_1"]);
        assert_eq!(summary.removed_articles, vec!["article_2"]);
        assert!(summary.added_articles.is_empty());
        assert_eq!(summary.metadata_changes.len(), 1);
        assert_eq!(summary.metadata_changes[0].field, "title");
        assert!(summary.note.is_none());
    }

    #[test]
    fn test_summary_degrades_to_note() {
        let doc = normalize(&RawDocument::new(id(), b"<Law/>".to_vec())).unwrap();
        let summary = summarize("<not xml", &doc);
        assert!(summary.note.is_some());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_mismatch_error_kind() {
        let err = ExError::from(LexGraphError::HashAlgorithmMismatch {
            doc_id: "radio-act:ja".into(),
            prior: "sha1/v0".into(),
            current: "sha256/v1".into(),
        });
        assert_eq!(err.kind(), ExErrorKind::HashAlgorithmMismatch);
    }
}
