//! Legal graph: a set of subject–predicate–object statements.
//!
//! Statements live in a `BTreeSet`, so iteration order (and therefore every
//! serialization) is a pure function of the statement set.

pub mod jsonld;
pub mod ntriples;
pub mod ontology;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Literal value with optional language tag or datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }
}

/// Object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    /// Lexical value: the IRI itself or the literal's value.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::Literal(lit) => &lit.value,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ntriples::format_term(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

/// One converted document (or a link set between two documents).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalGraph {
    root: String,
    triples: BTreeSet<Triple>,
}

impl LegalGraph {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            triples: BTreeSet::new(),
        }
    }

    /// IRI of the document root resource
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn add_iri(&mut self, subject: &str, predicate: &str, object: &str) {
        self.insert(Triple::new(subject, predicate, Term::iri(object)));
    }

    pub fn add_literal(&mut self, subject: &str, predicate: &str, literal: Literal) {
        self.insert(Triple::new(subject, predicate, Term::Literal(literal)));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Objects of every `(subject, predicate, ?)` statement.
    pub fn objects<'a>(&'a self, subject: &'a str, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects typed with `class`.
    pub fn subjects_of_type(&self, class: &str) -> Vec<&str> {
        self.triples
            .iter()
            .filter(|t| t.predicate == ontology::RDF_TYPE && t.object.as_iri() == Some(class))
            .map(|t| t.subject.as_str())
            .collect()
    }

    pub fn subject_count(&self) -> usize {
        self.triples
            .iter()
            .map(|t| t.subject.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn to_ntriples(&self) -> String {
        ntriples::serialize(self)
    }

    /// # Errors
    /// `Serialization` if the JSON document cannot be rendered.
    pub fn to_jsonld(&self) -> crate::errors::Result<String> {
        jsonld::serialize(self)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            triples: self.len(),
            subjects: self.subject_count(),
            articles: self
                .triples
                .iter()
                .filter(|t| {
                    t.predicate == ontology::ELI_DIVISION_TYPE
                        && t.object.lexical() == "article"
                })
                .count(),
        }
    }
}

/// Size summary reported per converted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub triples: usize,
    pub subjects: usize,
    pub articles: usize,
}

/// On-disk serialization of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    NTriples,
    JsonLd,
}

impl GraphFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            GraphFormat::NTriples => "nt",
            GraphFormat::JsonLd => "jsonld",
        }
    }

    /// # Errors
    /// See [`LegalGraph::to_jsonld`].
    pub fn render(&self, graph: &LegalGraph) -> crate::errors::Result<String> {
        match self {
            GraphFormat::NTriples => Ok(graph.to_ntriples()),
            GraphFormat::JsonLd => graph.to_jsonld(),
        }
    }
}

impl std::str::FromStr for GraphFormat {
    type Err = crate::errors::LexGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nt" | "ntriples" | "n-triples" => Ok(GraphFormat::NTriples),
            "jsonld" | "json-ld" => Ok(GraphFormat::JsonLd),
            other => Err(crate::errors::LexGraphError::Serialization {
                message: format!("unknown graph format '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_statements_collapse() {
        let mut graph = LegalGraph::new("http://x/doc");
        assert!(graph.insert(Triple::new("http://x/doc", ontology::ELI_TITLE, Term::Literal(Literal::lang("t", "en")))));
        assert!(!graph.insert(Triple::new("http://x/doc", ontology::ELI_TITLE, Term::Literal(Literal::lang("t", "en")))));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_subjects_of_type() {
        let mut graph = LegalGraph::new("http://x/doc");
        graph.add_iri("http://x/doc", ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);
        graph.add_iri("http://x/doc/article_1", ontology::RDF_TYPE, ontology::ELI_SUBDIVISION);
        assert_eq!(graph.subjects_of_type(ontology::ELI_LEGAL_RESOURCE), vec!["http://x/doc"]);
        assert_eq!(graph.subject_count(), 2);
    }

    #[test]
    fn test_graph_format_parse() {
        assert_eq!("nt".parse::<GraphFormat>().unwrap(), GraphFormat::NTriples);
        assert_eq!("JSON-LD".parse::<GraphFormat>().unwrap(), GraphFormat::JsonLd);
        assert!("turtle".parse::<GraphFormat>().is_err());
    }
}
