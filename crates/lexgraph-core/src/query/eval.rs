//! Basic-graph-pattern evaluation over a [`LegalGraph`].

use std::collections::{BTreeMap, HashMap};

use crate::errors::{LexGraphError, Result};
use crate::graph::{LegalGraph, Term, Triple};
use crate::query::parser::{parse_query, Filter, GroupPattern, PatternTerm, Projection, Query, TriplePattern};

/// Variable name → bound term
pub type Solution = BTreeMap<String, Term>;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Boolean(bool),
    Solutions(Vec<Solution>),
}

impl QueryResult {
    /// Number of results: solutions for SELECT, 1/0 for ASK.
    pub fn count(&self) -> usize {
        match self {
            QueryResult::Boolean(b) => usize::from(*b),
            QueryResult::Solutions(rows) => rows.len(),
        }
    }
}

/// Parse and run `text` against `graph`.
///
/// # Errors
/// `MalformedQuery` for text outside the supported subset.
pub fn execute(graph: &LegalGraph, text: &str) -> Result<QueryResult> {
    let query = parse_query(text)?;
    evaluate(graph, &query)
}

/// Run a parsed query.
///
/// # Errors
/// `MalformedQuery` when a projected variable never occurs in the pattern.
pub fn evaluate(graph: &LegalGraph, query: &Query) -> Result<QueryResult> {
    let index = GraphIndex::new(graph);
    match query {
        Query::Ask { pattern } => Ok(QueryResult::Boolean(
            !index.solve(pattern, vec![Solution::new()]).is_empty(),
        )),
        Query::Select {
            projection,
            pattern,
        } => {
            let solutions = index.solve(pattern, vec![Solution::new()]);
            let rows = match projection {
                Projection::All => solutions,
                Projection::Vars(vars) => {
                    for var in vars {
                        if !mentions(pattern, var) {
                            return Err(LexGraphError::MalformedQuery {
                                query: format!("SELECT ?{var}"),
                                reason: format!("projected variable ?{var} does not occur in the pattern"),
                            });
                        }
                    }
                    solutions
                        .into_iter()
                        .map(|row| {
                            row.into_iter()
                                .filter(|(name, _)| vars.contains(name))
                                .collect()
                        })
                        .collect()
                }
            };
            Ok(QueryResult::Solutions(rows))
        }
    }
}

fn mentions(pattern: &GroupPattern, var: &str) -> bool {
    let is_var = |t: &PatternTerm| matches!(t, PatternTerm::Var(v) if v == var);
    pattern
        .triples
        .iter()
        .any(|t| is_var(&t.subject) || is_var(&t.predicate) || is_var(&t.object))
}

/// Statement lookup by subject, predicate and object.
struct GraphIndex<'g> {
    all: Vec<&'g Triple>,
    by_subject: HashMap<&'g str, Vec<&'g Triple>>,
    by_predicate: HashMap<&'g str, Vec<&'g Triple>>,
    by_object: HashMap<&'g Term, Vec<&'g Triple>>,
}

impl<'g> GraphIndex<'g> {
    fn new(graph: &'g LegalGraph) -> Self {
        let mut index = Self {
            all: Vec::with_capacity(graph.len()),
            by_subject: HashMap::new(),
            by_predicate: HashMap::new(),
            by_object: HashMap::new(),
        };
        for triple in graph.triples() {
            index.all.push(triple);
            index.by_subject.entry(triple.subject.as_str()).or_default().push(triple);
            index.by_predicate.entry(triple.predicate.as_str()).or_default().push(triple);
            index.by_object.entry(&triple.object).or_default().push(triple);
        }
        index
    }

    /// Extend every seed solution through the group's patterns, then filter.
    fn solve(&self, group: &GroupPattern, seeds: Vec<Solution>) -> Vec<Solution> {
        let mut solutions = seeds;
        for pattern in &group.triples {
            solutions = solutions
                .iter()
                .flat_map(|solution| self.extend(pattern, solution))
                .collect();
            if solutions.is_empty() {
                return solutions;
            }
        }
        solutions
            .into_iter()
            .filter(|solution| group.filters.iter().all(|f| self.keep(f, solution)))
            .collect()
    }

    fn keep(&self, filter: &Filter, solution: &Solution) -> bool {
        match filter {
            Filter::NotExists(inner) => self.solve(inner, vec![solution.clone()]).is_empty(),
            Filter::Contains {
                var,
                needle,
                negated,
            } => match solution.get(var) {
                // An unbound variable is an evaluation error, which eliminates the row.
                None => false,
                Some(term) => term.lexical().contains(needle.as_str()) != *negated,
            },
        }
    }

    fn extend(&self, pattern: &TriplePattern, solution: &Solution) -> Vec<Solution> {
        let subject = resolve(&pattern.subject, solution);
        let predicate = resolve(&pattern.predicate, solution);
        let object = resolve(&pattern.object, solution);

        let mut candidates: &[&Triple] = &self.all;
        if let Some(Term::Iri(s)) = &subject {
            candidates = shortest(candidates, self.by_subject.get(s.as_str()));
        }
        if let Some(Term::Iri(p)) = &predicate {
            candidates = shortest(candidates, self.by_predicate.get(p.as_str()));
        }
        if let Some(o) = &object {
            candidates = shortest(candidates, self.by_object.get(o));
        }

        candidates
            .iter()
            .filter_map(|triple| {
                let mut next = solution.clone();
                bind(&pattern.subject, &Term::Iri(triple.subject.clone()), &mut next)?;
                bind(&pattern.predicate, &Term::Iri(triple.predicate.clone()), &mut next)?;
                bind(&pattern.object, &triple.object, &mut next)?;
                Some(next)
            })
            .collect()
    }
}

fn shortest<'a, 'g>(current: &'a [&'g Triple], other: Option<&'a Vec<&'g Triple>>) -> &'a [&'g Triple] {
    match other {
        None => &[],
        Some(list) if list.len() < current.len() => list,
        Some(_) => current,
    }
}

/// Constant term, or the current binding of a variable.
fn resolve(term: &PatternTerm, solution: &Solution) -> Option<Term> {
    match term {
        PatternTerm::Var(v) => solution.get(v).cloned(),
        PatternTerm::Iri(iri) => Some(Term::Iri(iri.clone())),
        PatternTerm::Literal(lit) => Some(Term::Literal(lit.clone())),
    }
}

/// Unify `pattern` with `value`, recording new variable bindings.
fn bind(pattern: &PatternTerm, value: &Term, solution: &mut Solution) -> Option<()> {
    match pattern {
        PatternTerm::Var(v) => match solution.get(v) {
            Some(bound) if bound != value => None,
            Some(_) => Some(()),
            None => {
                solution.insert(v.clone(), value.clone());
                Some(())
            }
        },
        PatternTerm::Iri(iri) => (value.as_iri() == Some(iri.as_str())).then_some(()),
        PatternTerm::Literal(lit) => matches!(value, Term::Literal(l) if l == lit).then_some(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ontology, Literal};

    fn graph() -> LegalGraph {
        let mut g = LegalGraph::new("http://x/doc");
        g.add_iri("http://x/doc", ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);
        g.add_literal("http://x/doc", ontology::ELI_VALID, Literal::plain("1950-05-02/9999-12-31"));
        for (article, numbered) in [("http://x/doc/article_1", true), ("http://x/doc/article_2", false)] {
            g.add_iri("http://x/doc", ontology::ELI_HAS_PART, article);
            g.add_literal(article, ontology::ELI_DIVISION_TYPE, Literal::plain("article"));
            if numbered {
                g.add_literal(article, ontology::ELI_NUMBER, Literal::lang("Article 1", "en"));
            }
        }
        g
    }

    #[test]
    fn test_ask() {
        assert_eq!(
            execute(&graph(), "ASK { ?d a eli:LegalResource }").unwrap(),
            QueryResult::Boolean(true)
        );
        assert_eq!(
            execute(&graph(), "ASK { ?d a eli:LegalResourceSubdivision }").unwrap(),
            QueryResult::Boolean(false)
        );
    }

    #[test]
    fn test_join_on_shared_variable() {
        let result = execute(
            &graph(),
            r#"SELECT ?a WHERE { ?doc eli:has_part ?a . ?a eli:division_type "article" }"#,
        )
        .unwrap();
        assert_eq!(result.count(), 2);
    }

    #[test]
    fn test_not_exists() {
        let result = execute(
            &graph(),
            r#"SELECT ?a WHERE { ?a eli:division_type "article" . FILTER NOT EXISTS { ?a eli:number ?n } }"#,
        )
        .unwrap();
        let QueryResult::Solutions(rows) = result else {
            panic!("expected solutions");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], Term::iri("http://x/doc/article_2"));
    }

    #[test]
    fn test_contains_filter() {
        let hits = |q: &str| execute(&graph(), q).unwrap().count();
        assert_eq!(hits(r#"SELECT ?v { ?d eli:valid ?v . FILTER(CONTAINS(?v, "/")) }"#), 1);
        assert_eq!(hits(r#"SELECT ?v { ?d eli:valid ?v . FILTER(!CONTAINS(?v, "/")) }"#), 0);
    }

    #[test]
    fn test_language_tagged_literal_match() {
        let q = r#"SELECT ?a { ?a eli:number "Article 1"@en }"#;
        assert_eq!(execute(&graph(), q).unwrap().count(), 1);
        let untagged = r#"SELECT ?a { ?a eli:number "Article 1" }"#;
        assert_eq!(execute(&graph(), untagged).unwrap().count(), 0);
    }

    #[test]
    fn test_projection_of_unknown_variable_is_an_error() {
        let err = execute(&graph(), "SELECT ?missing { ?s ?p ?o }").unwrap_err();
        assert!(matches!(err, LexGraphError::MalformedQuery { .. }));
    }

    #[test]
    fn test_select_star_keeps_all_bindings() {
        let QueryResult::Solutions(rows) =
            execute(&graph(), "SELECT * { ?d a eli:LegalResource . ?d eli:valid ?v }").unwrap()
        else {
            panic!("expected solutions");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("d") && rows[0].contains_key("v"));
    }
}
