//! N-Triples serialization, one statement per line in sorted order.

use crate::graph::{LegalGraph, Literal, Term};

pub fn serialize(graph: &LegalGraph) -> String {
    let mut out = String::new();
    for triple in graph.triples() {
        out.push('<');
        out.push_str(&escape_iri(&triple.subject));
        out.push_str("> <");
        out.push_str(&escape_iri(&triple.predicate));
        out.push_str("> ");
        out.push_str(&format_term(&triple.object));
        out.push_str(" .\n");
    }
    out
}

pub fn format_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{}>", escape_iri(iri)),
        Term::Literal(lit) => format_literal(lit),
    }
}

fn format_literal(lit: &Literal) -> String {
    let quoted = format!("\"{}\"", escape_literal(&lit.value));
    match (&lit.language, &lit.datatype) {
        (Some(lang), _) => format!("{quoted}@{lang}"),
        (None, Some(datatype)) => format!("{quoted}^^<{}>", escape_iri(datatype)),
        (None, None) => quoted,
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Characters N-Triples forbids inside `<…>` are written as `\u` escapes.
fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\u{00}'..='\u{20}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ontology, Triple};

    #[test]
    fn test_serializes_sorted_lines() {
        let mut graph = LegalGraph::new("http://x/b");
        graph.add_literal("http://x/b", ontology::ELI_TITLE, Literal::lang("電波法", "ja"));
        graph.add_iri("http://x/a", ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);
        let text = serialize(&graph);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("<http://x/a>"));
        assert_eq!(
            lines[1],
            "<http://x/b> <http://data.europa.eu/eli/ontology#title> \"電波法\"@ja ."
        );
    }

    #[test]
    fn test_escapes_literals_and_typed_values() {
        let term = Term::Literal(Literal::plain("a \"quoted\"\nline"));
        assert_eq!(format_term(&term), "\"a \\\"quoted\\\"\\nline\"");
        let typed = Term::Literal(Literal::typed("3", ontology::XSD_INTEGER));
        assert_eq!(
            format_term(&typed),
            "\"3\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn test_escapes_iri_spaces() {
        let mut graph = LegalGraph::new("x");
        graph.insert(Triple::new("http://x/a b", ontology::RDF_TYPE, Term::iri("http://x/c")));
        assert!(serialize(&graph).starts_with("<http://x/a\\u0020b>"));
    }
}
