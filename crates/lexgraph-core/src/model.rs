//! Document identity and the raw/normalized document forms.

use crate::errors::LexGraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of one of the two parallel inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Source-language statute (Japanese)
    Ja,
    /// Translated statute (English)
    En,
}

impl Language {
    /// BCP 47 tag used on literals and in identities
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    /// The document variant this language plays in the pair
    pub fn variant(&self) -> DocumentVariant {
        match self {
            Language::Ja => DocumentVariant::SourceStatute,
            Language::En => DocumentVariant::TranslatedStatute,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = LexGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ja" | "jpn" | "japanese" => Ok(Language::Ja),
            "en" | "eng" | "english" => Ok(Language::En),
            _ => Err(LexGraphError::InvalidDocumentId {
                value: s.to_string(),
            }),
        }
    }
}

/// The two document variants sharing one structural grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentVariant {
    SourceStatute,
    TranslatedStatute,
}

/// Identity of a logical document: logical name plus language.
///
/// Rendered as `name:lang` (e.g. `radio-act:ja`); this string is the key in
/// the fingerprint store and the stem of every artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    name: String,
    language: Language,
}

impl DocumentId {
    pub fn new(name: impl Into<String>, language: Language) -> Self {
        Self {
            name: name.into(),
            language,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn variant(&self) -> DocumentVariant {
        self.language.variant()
    }

    /// Logical name restricted to `[A-Za-z0-9_-]`, safe for paths and IRIs
    pub fn slug(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }

    /// File-system safe stem, e.g. `radio-act_ja`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.slug(), self.language.tag())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.language.tag())
    }
}

impl FromStr for DocumentId {
    type Err = LexGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, lang) = s
            .rsplit_once(':')
            .ok_or_else(|| LexGraphError::InvalidDocumentId {
                value: s.to_string(),
            })?;
        if name.is_empty() {
            return Err(LexGraphError::InvalidDocumentId {
                value: s.to_string(),
            });
        }
        Ok(Self::new(name, lang.parse()?))
    }
}

impl TryFrom<String> for DocumentId {
    type Error = LexGraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_string()
    }
}

/// Retrieved bytes before normalization.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: DocumentId,
    pub bytes: Vec<u8>,
    /// Encoding label announced by the source (HTTP header, config), if any
    pub declared_encoding: Option<String>,
}

impl RawDocument {
    pub fn new(id: DocumentId, bytes: Vec<u8>) -> Self {
        Self {
            id,
            bytes,
            declared_encoding: None,
        }
    }

    pub fn with_declared_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = Some(label.into());
        self
    }
}

/// Canonical UTF-8, LF-only, BOM-free document.
///
/// Only the normalizer constructs these, so holders can rely on the
/// invariant without re-checking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    id: DocumentId,
    source_encoding: String,
    text: String,
}

impl NormalizedDocument {
    pub(crate) fn new(id: DocumentId, source_encoding: impl Into<String>, text: String) -> Self {
        Self {
            id,
            source_encoding: source_encoding.into(),
            text,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Name of the encoding the raw bytes were decoded from
    pub fn source_encoding(&self) -> &str {
        &self.source_encoding
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_round_trip_through_string() {
        let id = DocumentId::new("radio-act", Language::Ja);
        assert_eq!(id.to_string(), "radio-act:ja");
        let parsed: DocumentId = "radio-act:ja".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_document_id_rejects_unknown_language() {
        assert!("radio-act:fr".parse::<DocumentId>().is_err());
        assert!("radio-act".parse::<DocumentId>().is_err());
        assert!(":ja".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_file_stem_is_filesystem_safe() {
        let id = DocumentId::new("radio act/1950", Language::En);
        assert_eq!(id.file_stem(), "radio-act-1950_en");
    }

    #[test]
    fn test_language_maps_to_variant() {
        assert_eq!(Language::Ja.variant(), DocumentVariant::SourceStatute);
        assert_eq!(Language::En.variant(), DocumentVariant::TranslatedStatute);
    }

    #[test]
    fn test_document_id_serializes_as_string() {
        let id = DocumentId::new("radio-act", Language::En);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"radio-act:en\"");
    }
}
