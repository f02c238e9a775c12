//! Structural query battery with per-query pass/fail reporting.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::graph::LegalGraph;
use crate::query::eval::{execute, QueryResult};

/// What a query must return to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    Ask(bool),
    AtLeast(usize),
    Exactly(usize),
}

impl Expectation {
    fn accepts(&self, result: &QueryResult) -> bool {
        match (self, result) {
            (Expectation::Ask(expected), QueryResult::Boolean(actual)) => expected == actual,
            (Expectation::AtLeast(n), other) => other.count() >= *n,
            (Expectation::Exactly(n), other) => other.count() == *n,
            (Expectation::Ask(_), QueryResult::Solutions(_)) => false,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Ask(b) => write!(f, "ASK = {b}"),
            Expectation::AtLeast(n) => write!(f, ">= {n}"),
            Expectation::Exactly(n) => write!(f, "== {n}"),
        }
    }
}

/// A named query and its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralQuery {
    pub name: String,
    pub sparql: String,
    pub expectation: Expectation,
}

impl StructuralQuery {
    pub fn new(name: impl Into<String>, sparql: impl Into<String>, expectation: Expectation) -> Self {
        Self {
            name: name.into(),
            sparql: sparql.into(),
            expectation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub name: String,
    pub passed: bool,
    pub expected: String,
    /// Result count, absent when the query could not run
    pub found: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReport {
    pub outcomes: Vec<QueryOutcome>,
}

impl QueryReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn outcome(&self, name: &str) -> Option<&QueryOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Runs a fixed list of queries; a failing or broken query never stops the rest.
#[derive(Debug, Clone)]
pub struct QueryHarness {
    queries: Vec<StructuralQuery>,
}

impl Default for QueryHarness {
    fn default() -> Self {
        Self::new(default_battery())
    }
}

impl QueryHarness {
    pub fn new(queries: Vec<StructuralQuery>) -> Self {
        Self { queries }
    }

    pub fn queries(&self) -> &[StructuralQuery] {
        &self.queries
    }

    pub fn run(&self, graph: &LegalGraph) -> QueryReport {
        let outcomes = self
            .queries
            .iter()
            .map(|query| {
                let expected = query.expectation.to_string();
                match execute(graph, &query.sparql) {
                    Ok(result) => {
                        let passed = query.expectation.accepts(&result);
                        debug!(query = %query.name, passed, found = result.count(), "structural query");
                        QueryOutcome {
                            name: query.name.clone(),
                            passed,
                            expected,
                            found: Some(result.count()),
                            error: None,
                        }
                    }
                    Err(err) => {
                        warn!(query = %query.name, error = %err, "structural query failed to execute");
                        QueryOutcome {
                            name: query.name.clone(),
                            passed: false,
                            expected,
                            found: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect();
        QueryReport { outcomes }
    }
}

/// The standard structural battery run after every conversion.
pub fn default_battery() -> Vec<StructuralQuery> {
    vec![
        StructuralQuery::new(
            "has_document_root",
            "ASK { ?doc a eli:LegalResource }",
            Expectation::Ask(true),
        ),
        StructuralQuery::new(
            "document_has_title_and_language",
            "SELECT ?doc WHERE { ?doc a eli:LegalResource . ?doc eli:title ?title . ?doc eli:language ?lang }",
            Expectation::AtLeast(1),
        ),
        StructuralQuery::new(
            "has_at_least_one_article",
            r#"SELECT ?article WHERE { ?article eli:division_type "article" }"#,
            Expectation::AtLeast(1),
        ),
        StructuralQuery::new(
            "every_article_has_number",
            r#"SELECT ?article WHERE {
                ?article eli:division_type "article" .
                FILTER NOT EXISTS { ?article eli:number ?number }
            }"#,
            Expectation::Exactly(0),
        ),
        StructuralQuery::new(
            "every_item_inside_paragraph",
            r#"SELECT ?item WHERE {
                ?item eli:division_type "item" .
                FILTER NOT EXISTS { ?parent eli:has_part ?item . ?parent eli:division_type "paragraph" }
                FILTER NOT EXISTS { ?parent eli:has_part ?item . ?parent eli:division_type "item" }
            }"#,
            Expectation::Exactly(0),
        ),
        StructuralQuery::new(
            "validity_is_period",
            r#"SELECT ?doc ?valid WHERE {
                ?doc eli:valid ?valid .
                FILTER (!CONTAINS(?valid, "/"))
            }"#,
            Expectation::Exactly(0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ontology, Literal};

    #[test]
    fn test_empty_graph_fails_root_and_article_queries() {
        let report = QueryHarness::default().run(&LegalGraph::new("http://x/doc"));
        assert_eq!(report.outcomes.len(), 6);
        assert!(!report.outcome("has_document_root").unwrap().passed);
        assert!(!report.outcome("has_at_least_one_article").unwrap().passed);
        assert!(report.outcome("every_article_has_number").unwrap().passed);
    }

    #[test]
    fn test_malformed_query_is_reported_not_fatal() {
        let harness = QueryHarness::new(vec![
            StructuralQuery::new("broken", "SELECT {", Expectation::AtLeast(1)),
            StructuralQuery::new("root", "ASK { ?d a eli:LegalResource }", Expectation::Ask(true)),
        ]);
        let mut graph = LegalGraph::new("http://x/doc");
        graph.add_iri("http://x/doc", ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);

        let report = harness.run(&graph);
        let broken = report.outcome("broken").unwrap();
        assert!(!broken.passed);
        assert!(broken.found.is_none());
        assert!(broken.error.is_some());
        assert!(report.outcome("root").unwrap().passed);
        assert_eq!((report.passed(), report.failed()), (1, 1));
    }

    #[test]
    fn test_failure_reports_found_versus_expected() {
        let mut graph = LegalGraph::new("http://x/doc");
        graph.add_literal("http://x/doc", ontology::ELI_VALID, Literal::plain("1950-05-02"));
        let report = QueryHarness::default().run(&graph);
        let outcome = report.outcome("validity_is_period").unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.found, Some(1));
        assert_eq!(outcome.expected, "== 0");
    }
}
