//! Output directory layout.
//!
//! ```text
//! <out>/radio-act_ja.xml            normalized document
//! <out>/accepted/radio-act_ja.xml   copy matching the stored fingerprint
//! <out>/radio-act_ja.nt             graph (or .jsonld)
//! <out>/radio-act_links.nt          translation links
//! <out>/reports/diff_radio-act_ja.json
//! <out>/reports/query_radio-act_ja.json
//! <out>/reports/run.json
//! ```

use std::path::{Path, PathBuf};
use tracing::debug;

use lexgraph_core::artifacts::ArtifactSink;
use lexgraph_core::errors::ExError;
use lexgraph_core::graph::{GraphFormat, LegalGraph};
use lexgraph_core::model::{DocumentId, NormalizedDocument};

use crate::atomic::atomic_write;
use crate::errors::Result;

/// Report subdirectory name
pub const REPORTS_DIR: &str = "reports";

/// Accepted-copy subdirectory name
pub const ACCEPTED_DIR: &str = "accepted";

#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn normalized_path(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("{}.xml", id.file_stem()))
    }

    pub fn accepted_path(&self, id: &DocumentId) -> PathBuf {
        self.root
            .join(ACCEPTED_DIR)
            .join(format!("{}.xml", id.file_stem()))
    }

    pub fn graph_path(&self, id: &DocumentId, format: GraphFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", id.file_stem(), format.extension()))
    }

    pub fn links_path(&self, name: &str, format: GraphFormat) -> PathBuf {
        self.root
            .join(format!("{}_links.{}", name, format.extension()))
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.root.join(REPORTS_DIR).join(file_name)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        atomic_write(path, contents)?;
        debug!(path = %path.display(), bytes_len = contents.len(), "artifact written");
        Ok(())
    }
}

impl ArtifactSink for FsArtifactStore {
    fn prior_normalized(&self, id: &DocumentId) -> Option<String> {
        std::fs::read_to_string(self.accepted_path(id)).ok()
    }

    fn write_normalized(&mut self, doc: &NormalizedDocument) -> Result<()> {
        self.write(&self.normalized_path(doc.id()), doc.bytes())
    }

    fn write_accepted(&mut self, doc: &NormalizedDocument) -> Result<()> {
        self.write(&self.accepted_path(doc.id()), doc.bytes())
    }

    fn write_graph(&mut self, id: &DocumentId, format: GraphFormat, graph: &LegalGraph) -> Result<()> {
        let body = format.render(graph).map_err(ExError::from)?;
        self.write(&self.graph_path(id, format), body.as_bytes())
    }

    fn write_links(&mut self, name: &str, format: GraphFormat, graph: &LegalGraph) -> Result<()> {
        let body = format.render(graph).map_err(ExError::from)?;
        self.write(&self.links_path(name, format), body.as_bytes())
    }

    fn write_report(&mut self, file_name: &str, contents: &str) -> Result<()> {
        self.write(&self.report_path(file_name), contents.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgraph_core::model::{Language, RawDocument};
    use lexgraph_core::normalize::normalize;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let id = DocumentId::new("radio-act", Language::En);

        assert_eq!(store.normalized_path(&id), dir.path().join("radio-act_en.xml"));
        assert_eq!(
            store.accepted_path(&id),
            dir.path().join("accepted").join("radio-act_en.xml")
        );
        assert_eq!(
            store.graph_path(&id, GraphFormat::JsonLd),
            dir.path().join("radio-act_en.jsonld")
        );
        assert_eq!(
            store.report_path("run.json"),
            dir.path().join("reports").join("run.json")
        );
    }

    #[test]
    fn test_prior_normalized_reads_accepted_copy() {
        let dir = TempDir::new().unwrap();
        let mut store = FsArtifactStore::new(dir.path());
        let id = DocumentId::new("radio-act", Language::Ja);
        let doc = normalize(&RawDocument::new(id.clone(), b"<Law/>\r\n".to_vec())).unwrap();

        store.write_normalized(&doc).unwrap();
        assert!(store.prior_normalized(&id).is_none());

        store.write_accepted(&doc).unwrap();
        assert_eq!(store.prior_normalized(&id).as_deref(), Some("<Law/>\n"));
    }
}
