//! Batch orchestration.
//!
//! ## Stage order (per document)
//! 1. Retrieve (all documents concurrently, before anything else)
//! 2. Normalize (fatal)
//! 3. Validate (reported, never fatal)
//! 4. Fingerprint
//! 5. Diff, if enabled (classify against the store; summary from the prior
//!    normalized artifact)
//! 6. Convert, if enabled (fatal), then the query battery, if enabled
//! 7. Persist artifacts (fatal)
//! 8. Stage the fingerprint commit, if diff is enabled
//!
//! Each document runs in its own failure domain: an error stops that
//! document only. A document that failed any fatal stage persists nothing
//! and commits nothing. The store is flushed once, after every document;
//! only after a successful flush are the committed documents written as the
//! accepted copies that later change summaries compare against.

use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

use lexgraph_core::artifacts::ArtifactSink;
use lexgraph_core::convert::Converter;
use lexgraph_core::diff::{self, ChangeSummary, Classification};
use lexgraph_core::errors::{ErrorRecord, ExError, ExErrorKind};
use lexgraph_core::fingerprint::{Fingerprint, FingerprintStore, StoreWarning};
use lexgraph_core::graph::{ontology, GraphFormat};
use lexgraph_core::model::{DocumentId, Language, NormalizedDocument, RawDocument};
use lexgraph_core::normalize::Normalizer;
use lexgraph_core::query::QueryHarness;
use lexgraph_core::structure::{self, DocumentStructure};
use lexgraph_core::validate::{RequiredElementsValidator, SchemaValidator, ValidationVerdict};
use lexgraph_core::{log_op_end, log_op_error, log_op_start};
use lexgraph_core_types::schema::{
    STAGE_COMMIT, STAGE_CONVERT, STAGE_DIFF, STAGE_FINGERPRINT, STAGE_NORMALIZE, STAGE_PERSIST,
    STAGE_QUERY, STAGE_VALIDATE,
};
use lexgraph_core_types::RunContext;

use crate::report::{DocumentOutcome, RunReport};
use crate::retrieval::{retrieve_all, DocumentRequest, Retriever};

/// Which optional stages run, and how graphs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub enable_diff: bool,
    pub enable_convert: bool,
    /// Only effective together with `enable_convert`
    pub enable_query_test: bool,
    pub graph_format: GraphFormat,
    pub base_iri: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            enable_diff: false,
            enable_convert: false,
            enable_query_test: false,
            graph_format: GraphFormat::default(),
            base_iri: ontology::DEFAULT_BASE_IRI.to_string(),
        }
    }
}

impl RunOptions {
    pub fn all_stages() -> Self {
        Self {
            enable_diff: true,
            enable_convert: true,
            enable_query_test: true,
            ..Self::default()
        }
    }
}

pub struct Pipeline {
    options: RunOptions,
    normalizer: Normalizer,
    validator: Box<dyn SchemaValidator>,
    converter: Converter,
    harness: QueryHarness,
}

impl Pipeline {
    pub fn new(options: RunOptions) -> Self {
        let converter = Converter::new(options.base_iri.clone());
        Self {
            options,
            normalizer: Normalizer::default(),
            validator: Box::new(RequiredElementsValidator),
            converter,
            harness: QueryHarness::default(),
        }
    }

    pub fn with_validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_harness(mut self, harness: QueryHarness) -> Self {
        self.harness = harness;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every request through the pipeline and write the run report.
    ///
    /// Never fails as a whole; every failure is recorded in the report.
    pub fn run(
        &self,
        ctx: &RunContext,
        requests: &[DocumentRequest],
        retriever: &dyn Retriever,
        store: &mut dyn FingerprintStore,
        sink: &mut dyn ArtifactSink,
    ) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();
        log_op_start!(
            "run",
            run_id = %ctx.run_id,
            origin = ctx.origin.as_deref().unwrap_or("-"),
            documents = requests.len()
        );

        let fetched = retrieve_all(retriever, requests);

        let mut errors: Vec<ErrorRecord> = store
            .warnings()
            .iter()
            .map(|w| ErrorRecord::from(&store_corruption(ctx, w)))
            .collect();

        let mut documents = Vec::with_capacity(requests.len());
        let mut structures = Vec::new();
        let mut staged = Vec::new();
        for (request, raw) in requests.iter().zip(fetched) {
            let (outcome, structure) =
                self.process_document(ctx, &request.id, raw, store, sink, &mut staged);
            documents.push(outcome);
            structures.extend(structure);
        }

        let links_written = self.write_links(&structures, sink, &mut errors);

        if self.options.enable_diff {
            match store.flush() {
                Ok(()) => self.write_accepted(&staged, sink, &mut errors),
                Err(e) => {
                    let e = e.with_run_id(ctx.run_id.clone());
                    log_op_error!("flush_fingerprints", e.clone(), duration_ms = 0u64, stage = STAGE_COMMIT);
                    errors.push(ErrorRecord::from(&e));
                    for outcome in &mut documents {
                        outcome.committed = false;
                    }
                }
            }
        }

        let mut report = RunReport {
            run_id: ctx.run_id.clone(),
            started_at,
            finished_at: Utc::now(),
            documents,
            store_warnings: store.warnings().to_vec(),
            links_written,
            errors,
        };
        self.write_run_reports(&mut report, sink);

        log_op_end!(
            "run",
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = %ctx.run_id,
            succeeded = report.all_succeeded()
        );
        report
    }

    fn process_document(
        &self,
        ctx: &RunContext,
        id: &DocumentId,
        raw: Result<RawDocument, ExError>,
        store: &mut dyn FingerprintStore,
        sink: &mut dyn ArtifactSink,
        staged: &mut Vec<NormalizedDocument>,
    ) -> (DocumentOutcome, Option<DocumentStructure>) {
        let mut outcome = DocumentOutcome::new(id.clone());

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                outcome.record_error(&e.with_run_id(ctx.run_id.clone()));
                return (outcome, None);
            }
        };

        let doc = match self.stage(ctx, id, STAGE_NORMALIZE, || {
            self.normalizer.normalize(&raw).map_err(ExError::from)
        }) {
            Ok(doc) => doc,
            Err(e) => {
                outcome.record_error(&e);
                return (outcome, None);
            }
        };
        outcome.source_encoding = Some(doc.source_encoding().to_string());

        let verdict = self.validator.validate(&doc);
        if !verdict.valid {
            let e = validation_error(ctx, id, &verdict);
            warn!(doc_id = %id, stage = STAGE_VALIDATE, problems = verdict.problems.len(), "{e}");
            outcome.record_error(&e);
        }
        outcome.validation = Some(verdict);

        let fingerprint = Fingerprint::compute(doc.bytes());
        info!(doc_id = %id, stage = STAGE_FINGERPRINT, fingerprint = %fingerprint, bytes_len = doc.len(), "fingerprint computed");
        outcome.fingerprint = Some(fingerprint.clone());

        if self.options.enable_diff {
            let classified = self.stage(ctx, id, STAGE_DIFF, || {
                diff::classify(&*store, id, &fingerprint)
            });
            match classified {
                Ok(result) => {
                    let result = if result.classification == Classification::Changed {
                        let summary = match sink.prior_normalized(id) {
                            Some(prior) => diff::summarize(&prior, &doc),
                            None => ChangeSummary::unavailable("prior normalized document not found"),
                        };
                        result.with_summary(summary)
                    } else {
                        result
                    };
                    info!(doc_id = %id, stage = STAGE_DIFF, classification = %result.classification, "document classified");
                    outcome.diff = Some(result);
                }
                Err(e) => {
                    outcome.record_error(&e);
                    return (outcome, None);
                }
            }
        }

        let mut converted = None;
        if self.options.enable_convert {
            let result = self.stage(ctx, id, STAGE_CONVERT, || {
                let structure = structure::parse(&doc).map_err(ExError::from)?;
                let graph = self.converter.convert_structure(&structure);
                Ok((structure, graph))
            });
            match result {
                Ok((structure, graph)) => {
                    outcome.graph = Some(graph.stats());
                    if self.options.enable_query_test {
                        let report = self.stage(ctx, id, STAGE_QUERY, || Ok(self.harness.run(&graph)));
                        if let Ok(report) = report {
                            for failed in report.outcomes.iter().filter(|o| o.error.is_some()) {
                                let e = ExError::new(ExErrorKind::QueryExecution)
                                    .with_op(failed.name.clone())
                                    .with_doc_id(id.to_string())
                                    .with_stage(STAGE_QUERY)
                                    .with_message(failed.error.clone().unwrap_or_default());
                                outcome.record_error(&e);
                            }
                            outcome.queries = Some(report);
                        }
                    }
                    converted = Some((structure, graph));
                }
                Err(e) => outcome.record_error(&e),
            }
        }

        if !outcome.succeeded() {
            return (outcome, None);
        }

        let format = self.options.graph_format;
        let stem = id.file_stem();
        let persisted = self.stage(ctx, id, STAGE_PERSIST, || {
            sink.write_normalized(&doc)?;
            if let Some((_, graph)) = &converted {
                sink.write_graph(id, format, graph)?;
            }
            if let Some(result) = &outcome.diff {
                sink.write_report(&format!("diff_{stem}.json"), &to_json(result)?)?;
            }
            if let Some(report) = &outcome.queries {
                sink.write_report(&format!("query_{stem}.json"), &to_json(report)?)?;
            }
            Ok(())
        });
        if let Err(e) = persisted {
            outcome.record_error(&e);
            return (outcome, None);
        }

        if self.options.enable_diff {
            log_op_start!(STAGE_COMMIT, run_id = %ctx.run_id, doc_id = %id, stage = STAGE_COMMIT);
            let start = Instant::now();
            store.commit(id, fingerprint);
            outcome.committed = true;
            staged.push(doc);
            log_op_end!(
                STAGE_COMMIT,
                duration_ms = start.elapsed().as_millis() as u64,
                doc_id = %id,
                stage = STAGE_COMMIT
            );
        }

        (outcome, converted.map(|(structure, _)| structure))
    }

    /// Keep the flushed documents as the baseline for later change summaries.
    fn write_accepted(
        &self,
        staged: &[NormalizedDocument],
        sink: &mut dyn ArtifactSink,
        errors: &mut Vec<ErrorRecord>,
    ) {
        for doc in staged {
            if let Err(e) = sink.write_accepted(doc) {
                let e = e
                    .with_op("write_accepted")
                    .with_doc_id(doc.id().to_string())
                    .with_stage(STAGE_COMMIT);
                warn!(doc_id = %doc.id(), "{e}");
                errors.push(ErrorRecord::from(&e));
            }
        }
    }

    /// Link every converted source document to its translation of the same name.
    fn write_links(
        &self,
        structures: &[DocumentStructure],
        sink: &mut dyn ArtifactSink,
        errors: &mut Vec<ErrorRecord>,
    ) -> bool {
        let mut written = false;
        for source in structures.iter().filter(|s| s.id.language() == Language::Ja) {
            let Some(translation) = structures
                .iter()
                .find(|t| t.id.language() == Language::En && t.id.name() == source.id.name())
            else {
                continue;
            };
            let links = self.converter.translation_links(source, translation);
            match sink.write_links(&source.id.slug(), self.options.graph_format, &links) {
                Ok(()) => {
                    info!(doc_id = %source.id, links = links.len(), "translation links written");
                    written = true;
                }
                Err(e) => {
                    let e = e.with_op("write_links").with_stage(STAGE_PERSIST);
                    warn!(doc_id = %source.id, "{e}");
                    errors.push(ErrorRecord::from(&e));
                }
            }
        }
        written
    }

    fn write_run_reports(&self, report: &mut RunReport, sink: &mut dyn ArtifactSink) {
        let mut failures = Vec::new();

        if self.options.enable_diff {
            let markdown = diff::render_human_summary(&report.diff_results());
            if let Err(e) = sink.write_report("drift.md", &markdown) {
                failures.push(e);
            }
        }

        match to_json(&*report).and_then(|body| sink.write_report("run.json", &body)) {
            Ok(()) => {}
            Err(e) => failures.push(e),
        }

        for e in failures {
            let e = e.with_op("write_report").with_stage(STAGE_PERSIST);
            warn!(run_id = %report.run_id, "{e}");
            report.errors.push(ErrorRecord::from(&e));
        }
    }

    /// Run one stage with canonical start/end/error events.
    fn stage<T>(
        &self,
        ctx: &RunContext,
        id: &DocumentId,
        stage: &'static str,
        f: impl FnOnce() -> Result<T, ExError>,
    ) -> Result<T, ExError> {
        log_op_start!(stage, run_id = %ctx.run_id, doc_id = %id, stage = stage);
        let start = Instant::now();

        match f() {
            Ok(value) => {
                log_op_end!(
                    stage,
                    duration_ms = start.elapsed().as_millis() as u64,
                    doc_id = %id,
                    stage = stage
                );
                Ok(value)
            }
            Err(e) => {
                let e = if e.op().is_none() { e.with_op(stage) } else { e };
                let e = e
                    .with_doc_id(id.to_string())
                    .with_stage(stage)
                    .with_run_id(ctx.run_id.clone());
                log_op_error!(
                    stage,
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    doc_id = %id,
                    stage = stage
                );
                Err(e)
            }
        }
    }
}

fn validation_error(ctx: &RunContext, id: &DocumentId, verdict: &ValidationVerdict) -> ExError {
    let problems = verdict
        .problems
        .iter()
        .map(|p| format!("{}:{}: {}", p.line, p.column, p.message))
        .collect::<Vec<_>>()
        .join("; ");
    let mut e = ExError::new(ExErrorKind::Validation)
        .with_op("validate")
        .with_doc_id(id.to_string())
        .with_stage(STAGE_VALIDATE)
        .with_run_id(ctx.run_id.clone())
        .with_message(problems);
    if let Some(first) = verdict.problems.first() {
        e = e.with_position(format!("line {}, column {}", first.line, first.column));
    }
    e
}

fn store_corruption(ctx: &RunContext, warning: &StoreWarning) -> ExError {
    let e = ExError::new(ExErrorKind::StoreCorruption)
        .with_op("load_fingerprints")
        .with_stage(STAGE_DIFF)
        .with_run_id(ctx.run_id.clone())
        .with_message(warning.to_string());
    match warning {
        StoreWarning::AlgorithmMismatch { doc_id, .. } => e.with_doc_id(doc_id.clone()),
        _ => e,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ExError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("serialize_report")
            .with_message(e.to_string())
    })
}
