//! Vocabulary IRIs: ELI plus the project namespace for ordering and links.

use crate::model::Language;

pub const ELI_NS: &str = "http://data.europa.eu/eli/ontology#";
pub const JLAW_NS: &str = "http://data.japan.go.jp/law/ontology#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Base under which document resources are minted
pub const DEFAULT_BASE_IRI: &str = "http://data.japan.go.jp/law";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const ELI_LEGAL_RESOURCE: &str = "http://data.europa.eu/eli/ontology#LegalResource";
pub const ELI_SUBDIVISION: &str = "http://data.europa.eu/eli/ontology#LegalResourceSubdivision";
pub const ELI_TITLE: &str = "http://data.europa.eu/eli/ontology#title";
pub const ELI_NUMBER: &str = "http://data.europa.eu/eli/ontology#number";
pub const ELI_LANGUAGE: &str = "http://data.europa.eu/eli/ontology#language";
pub const ELI_TYPE_DOCUMENT: &str = "http://data.europa.eu/eli/ontology#type_document";
pub const ELI_DATE_DOCUMENT: &str = "http://data.europa.eu/eli/ontology#date_document";
pub const ELI_VALID: &str = "http://data.europa.eu/eli/ontology#valid";
pub const ELI_HAS_PART: &str = "http://data.europa.eu/eli/ontology#has_part";
pub const ELI_IS_PART_OF: &str = "http://data.europa.eu/eli/ontology#is_part_of";
pub const ELI_DIVISION_TYPE: &str = "http://data.europa.eu/eli/ontology#division_type";
pub const ELI_CONTENT: &str = "http://data.europa.eu/eli/ontology#content";

pub const JLAW_POSITION: &str = "http://data.japan.go.jp/law/ontology#position";
pub const JLAW_HAS_TRANSLATION: &str = "http://data.japan.go.jp/law/ontology#hasTranslation";

pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// Open-ended end of a validity period
pub const VALIDITY_OPEN_END: &str = "9999-12-31";

/// Prefixes used for compact IRIs in JSON-LD and query text.
pub const PREFIXES: &[(&str, &str)] = &[
    ("eli", ELI_NS),
    ("jlaw", JLAW_NS),
    ("rdf", RDF_NS),
    ("xsd", XSD_NS),
];

/// EU publications-office language authority IRI.
pub fn language_iri(language: Language) -> String {
    let code = match language {
        Language::Ja => "JPN",
        Language::En => "ENG",
    };
    format!("http://publications.europa.eu/resource/authority/language/{code}")
}

/// `eli:title` style compact form, if the IRI falls in a known namespace.
pub fn compact(iri: &str) -> Option<String> {
    PREFIXES.iter().find_map(|(prefix, ns)| {
        iri.strip_prefix(ns)
            .filter(|local| !local.is_empty())
            .map(|local| format!("{prefix}:{local}"))
    })
}
