#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{en_id, ja_id, normalized, statute, translation};
use lexgraph_core::artifacts::{ArtifactSink, InMemoryArtifacts};
use lexgraph_core::diff::{classify, render_human_summary, summarize, Classification};
use lexgraph_core::fingerprint::{Fingerprint, FingerprintStore, InMemoryFingerprintStore};

/// One simulated run: classify every document, then commit and flush.
fn run(
    store: &mut InMemoryFingerprintStore,
    sink: &mut InMemoryArtifacts,
    docs: &[(lexgraph_core::model::DocumentId, String)],
) -> Vec<Classification> {
    let mut classes = Vec::new();
    for (id, xml) in docs {
        let doc = normalized(id.clone(), xml);
        let fingerprint = Fingerprint::compute(doc.bytes());
        let mut result = classify(store, id, &fingerprint).unwrap();
        if let Some(prior) = sink.prior_normalized(id) {
            result = result.with_summary(summarize(&prior, &doc));
        }
        sink.write_accepted(&doc).unwrap();
        store.commit(id, fingerprint);
        classes.push(result.classification);
    }
    store.flush().unwrap();
    classes
}

#[test]
fn test_new_then_unchanged_then_changed() {
    let mut store = InMemoryFingerprintStore::new();
    let mut sink = InMemoryArtifacts::new();
    let docs = vec![(ja_id(), statute(2, 1)), (en_id(), translation(2))];

    assert_eq!(
        run(&mut store, &mut sink, &docs),
        vec![Classification::New, Classification::New]
    );
    assert_eq!(
        run(&mut store, &mut sink, &docs),
        vec![Classification::Unchanged, Classification::Unchanged]
    );

    let altered = vec![
        (ja_id(), statute(2, 1)),
        (en_id(), translation(2).replace("Radio Act", "Radio Law")),
    ];
    assert_eq!(
        run(&mut store, &mut sink, &altered),
        vec![Classification::Unchanged, Classification::Changed]
    );
}

#[test]
fn test_line_ending_only_difference_is_unchanged() {
    let mut store = InMemoryFingerprintStore::new();
    let mut sink = InMemoryArtifacts::new();
    let lf = statute(1, 0);
    let crlf = lf.replace('\n', "\r\n");

    run(&mut store, &mut sink, &[(ja_id(), lf)]);
    assert_eq!(
        run(&mut store, &mut sink, &[(ja_id(), crlf)]),
        vec![Classification::Unchanged]
    );
}

#[test]
fn test_uncommitted_run_leaves_document_new() {
    let store = InMemoryFingerprintStore::new();
    let doc = normalized(ja_id(), &statute(1, 0));
    let fingerprint = Fingerprint::compute(doc.bytes());

    // Classified but never committed, as after a failed conversion.
    classify(&store, &ja_id(), &fingerprint).unwrap();
    let again = classify(&store, &ja_id(), &fingerprint).unwrap();
    assert_eq!(again.classification, Classification::New);
}

#[test]
fn test_changed_document_gets_article_summary() {
    let prior = normalized(ja_id(), &statute(2, 1));
    let current = normalized(ja_id(), &statute(3, 1));

    let summary = summarize(prior.as_str(), &current);
    assert_eq!(summary.added_articles, vec!["article_3"]);
    assert!(summary.removed_articles.is_empty());
    assert!(summary.changed_articles.is_empty());
    assert!(summary.metadata_changes.is_empty());

    let store = InMemoryFingerprintStore::new().with_record(
        lexgraph_core::fingerprint::FingerprintRecord::new(ja_id(), Fingerprint::compute(prior.bytes())),
    );
    let result = classify(&store, &ja_id(), &Fingerprint::compute(current.bytes()))
        .unwrap()
        .with_summary(summary);
    let markdown = render_human_summary(&[result]);
    assert!(markdown.contains("| radio-act:ja | CHANGED |"));
    assert!(markdown.contains("- **Added articles** (1): article_3"));
}
