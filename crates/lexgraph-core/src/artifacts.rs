//! Output artifact boundary.
//!
//! The pipeline writes every artifact through an [`ArtifactSink`]; the
//! filesystem implementation lives in the store crate.

use std::collections::BTreeMap;

use crate::errors::ExError;
use crate::graph::{GraphFormat, LegalGraph};
use crate::model::{DocumentId, NormalizedDocument};

pub trait ArtifactSink {
    /// Normalized text whose fingerprint was last accepted, if any.
    fn prior_normalized(&self, id: &DocumentId) -> Option<String>;

    /// # Errors
    /// Persistence failures.
    fn write_normalized(&mut self, doc: &NormalizedDocument) -> Result<(), ExError>;

    /// Keep `doc` as the accepted copy read back by [`Self::prior_normalized`].
    ///
    /// Written only once the document's fingerprint reached the store.
    ///
    /// # Errors
    /// Persistence failures.
    fn write_accepted(&mut self, doc: &NormalizedDocument) -> Result<(), ExError>;

    /// # Errors
    /// Serialization or persistence failures.
    fn write_graph(&mut self, id: &DocumentId, format: GraphFormat, graph: &LegalGraph) -> Result<(), ExError>;

    /// Translation links between the two documents named `name`.
    ///
    /// # Errors
    /// Serialization or persistence failures.
    fn write_links(&mut self, name: &str, format: GraphFormat, graph: &LegalGraph) -> Result<(), ExError>;

    /// Write a named report (`diff_radio-act_ja.json`, `run.json`, …).
    ///
    /// # Errors
    /// Persistence failures.
    fn write_report(&mut self, file_name: &str, contents: &str) -> Result<(), ExError>;
}

/// Keeps artifacts in memory, keyed by their relative path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifacts {
    files: BTreeMap<String, String>,
}

impl InMemoryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Relative path of a document's normalized text
    pub fn normalized_path(id: &DocumentId) -> String {
        format!("{}.xml", id.file_stem())
    }

    /// Relative path of the accepted copy
    pub fn accepted_path(id: &DocumentId) -> String {
        format!("accepted/{}.xml", id.file_stem())
    }
}

impl ArtifactSink for InMemoryArtifacts {
    fn prior_normalized(&self, id: &DocumentId) -> Option<String> {
        self.files.get(&Self::accepted_path(id)).cloned()
    }

    fn write_normalized(&mut self, doc: &NormalizedDocument) -> Result<(), ExError> {
        self.files
            .insert(Self::normalized_path(doc.id()), doc.as_str().to_string());
        Ok(())
    }

    fn write_accepted(&mut self, doc: &NormalizedDocument) -> Result<(), ExError> {
        self.files
            .insert(Self::accepted_path(doc.id()), doc.as_str().to_string());
        Ok(())
    }

    fn write_graph(&mut self, id: &DocumentId, format: GraphFormat, graph: &LegalGraph) -> Result<(), ExError> {
        let body = format.render(graph).map_err(ExError::from)?;
        self.files
            .insert(format!("{}.{}", id.file_stem(), format.extension()), body);
        Ok(())
    }

    fn write_links(&mut self, name: &str, format: GraphFormat, graph: &LegalGraph) -> Result<(), ExError> {
        let body = format.render(graph).map_err(ExError::from)?;
        self.files
            .insert(format!("{}_links.{}", name, format.extension()), body);
        Ok(())
    }

    fn write_report(&mut self, file_name: &str, contents: &str) -> Result<(), ExError> {
        self.files
            .insert(format!("reports/{file_name}"), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, RawDocument};
    use crate::normalize::normalize;

    #[test]
    fn test_prior_normalized_reads_only_the_accepted_copy() {
        let id = DocumentId::new("radio-act", Language::Ja);
        let doc = normalize(&RawDocument::new(id.clone(), b"<Law/>\r\n".to_vec())).unwrap();
        let mut sink = InMemoryArtifacts::new();
        sink.write_normalized(&doc).unwrap();
        assert!(sink.prior_normalized(&id).is_none());

        sink.write_accepted(&doc).unwrap();
        assert_eq!(sink.prior_normalized(&id).as_deref(), Some("<Law/>\n"));
        assert_eq!(
            sink.paths().collect::<Vec<_>>(),
            vec!["accepted/radio-act_ja.xml", "radio-act_ja.xml"]
        );
    }
}
