//! Compact JSON-LD serialization: `@context` plus a flat `@graph` sorted by `@id`.

use serde_json::{json, Map, Value};

use crate::errors::Result;
use crate::graph::{ontology, LegalGraph, Term};

pub fn serialize(graph: &LegalGraph) -> Result<String> {
    let mut context = Map::new();
    for (prefix, ns) in ontology::PREFIXES {
        context.insert((*prefix).to_string(), Value::String((*ns).to_string()));
    }

    // Statements are sorted by subject, so each node's statements are contiguous.
    let mut nodes: Vec<Value> = Vec::new();
    let mut current: Option<(String, Map<String, Value>)> = None;
    for triple in graph.triples() {
        if current.as_ref().map(|(s, _)| s != &triple.subject).unwrap_or(true) {
            if let Some((_, node)) = current.take() {
                nodes.push(Value::Object(node));
            }
            let mut node = Map::new();
            node.insert("@id".to_string(), Value::String(triple.subject.clone()));
            current = Some((triple.subject.clone(), node));
        }
        if let Some((_, node)) = current.as_mut() {
            let (key, value) = if triple.predicate == ontology::RDF_TYPE {
                (
                    "@type".to_string(),
                    Value::String(compact_or_full(triple.object.lexical())),
                )
            } else {
                (compact_or_full(&triple.predicate), term_value(&triple.object))
            };
            match node.entry(key).or_insert_with(|| Value::Array(Vec::new())) {
                Value::Array(values) => values.push(value),
                other => *other = Value::Array(vec![value]),
            }
        }
    }
    if let Some((_, node)) = current {
        nodes.push(Value::Object(node));
    }

    let document = json!({
        "@context": Value::Object(context),
        "@graph": nodes,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

fn compact_or_full(iri: &str) -> String {
    ontology::compact(iri).unwrap_or_else(|| iri.to_string())
}

fn term_value(term: &Term) -> Value {
    match term {
        Term::Iri(iri) => json!({ "@id": iri }),
        Term::Literal(lit) => {
            let mut value = Map::new();
            value.insert("@value".to_string(), Value::String(lit.value.clone()));
            if let Some(lang) = &lit.language {
                value.insert("@language".to_string(), Value::String(lang.clone()));
            } else if let Some(datatype) = &lit.datatype {
                value.insert("@type".to_string(), Value::String(compact_or_full(datatype)));
            }
            Value::Object(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Literal;

    fn sample() -> LegalGraph {
        let mut graph = LegalGraph::new("http://x/doc");
        graph.add_iri("http://x/doc", ontology::RDF_TYPE, ontology::ELI_LEGAL_RESOURCE);
        graph.add_literal("http://x/doc", ontology::ELI_TITLE, Literal::lang("Radio Act", "en"));
        graph.add_iri("http://x/doc", ontology::ELI_HAS_PART, "http://x/doc/article_1");
        graph.add_iri("http://x/doc/article_1", ontology::RDF_TYPE, ontology::ELI_SUBDIVISION);
        graph.add_literal(
            "http://x/doc/article_1",
            ontology::JLAW_POSITION,
            Literal::typed("1", ontology::XSD_INTEGER),
        );
        graph
    }

    #[test]
    fn test_nodes_sorted_by_id_with_compact_keys() {
        let text = serialize(&sample()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let nodes = value["@graph"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@id"], "http://x/doc");
        assert_eq!(nodes[0]["@type"][0], "eli:LegalResource");
        assert_eq!(nodes[0]["eli:title"][0]["@language"], "en");
        assert_eq!(nodes[0]["eli:has_part"][0]["@id"], "http://x/doc/article_1");
        assert_eq!(nodes[1]["jlaw:position"][0]["@type"], "xsd:integer");
        assert_eq!(value["@context"]["eli"], ontology::ELI_NS);
    }

    #[test]
    fn test_serialization_is_byte_stable() {
        assert_eq!(serialize(&sample()).unwrap(), serialize(&sample()).unwrap());
    }
}
